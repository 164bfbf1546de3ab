//! Integration test: seed a data directory, start the server on a free port, drive the API over HTTP.
//! The server task is left running when each test ends.

use inbox::config::Config;
use inbox::server::{self, BAD_BODY, SERVER_ERROR};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

struct TestServer {
    _dir: tempfile::TempDir,
    data: PathBuf,
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn thread_file(&self, platform: &str, sender: &str) -> PathBuf {
        self.data
            .join("Platforms")
            .join(platform)
            .join(format!("{}.json", sender))
    }
}

async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("config.json");
    let paths = inbox::init::init_data_dir(&config_path).expect("seed data dir");

    let port = free_port();
    let mut config = Config::default();
    config.server.port = port;
    config.server.bind = "127.0.0.1".to_string();

    tokio::spawn(async move {
        let _ = server::run_server(config, config_path).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    let health = format!("{}/health", base);
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&health).send().await {
            Ok(resp) if resp.status().is_success() => {
                let json: Value = resp.json().await.expect("parse JSON");
                assert_eq!(json["runtime"], "running");
                assert_eq!(json["port"].as_u64(), Some(port as u64));
                return TestServer {
                    _dir: dir,
                    data: paths.root,
                    base,
                    client,
                };
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "GET {} did not return 200 within 5s; last error: {:?}",
        health, last_err
    );
}

async fn get_json(s: &TestServer, path: &str) -> (reqwest::StatusCode, Value) {
    let resp = s.client.get(s.url(path)).send().await.expect("request");
    let status = resp.status();
    (status, resp.json().await.expect("JSON body"))
}

#[tokio::test]
async fn lists_seeded_platforms() {
    let s = start_server().await;
    let (status, body) = get_json(&s, "/getPlatforms").await;
    assert!(status.is_success());
    assert_eq!(
        body,
        json!({ "success": true, "platforms": ["Discord", "Instagram", "WhatsApp"] })
    );
}

#[tokio::test]
async fn summaries_for_all_and_for_one_platform() {
    let s = start_server().await;
    let (_, all) = get_json(&s, "/getMessages").await;
    assert_eq!(all["success"], true);
    let names: Vec<_> = all["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["platform"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Discord", "Instagram", "WhatsApp"]);

    let (_, one) = get_json(&s, "/getMessages?platform=Instagram").await;
    let data = one["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["icon"], "images/instagram.png");
    assert_eq!(data[0]["api"], "https://graph.instagram.com");
    let messages = data[0]["messages"].as_array().unwrap();
    assert_eq!(messages[0]["sender"], "Best Friend");
    assert_eq!(
        messages[0]["displayMessages"].as_str().unwrap().chars().count(),
        50
    );
    assert_eq!(
        messages[1],
        json!({ "sender": "Mom", "displayMessages": "Hello there, how are you doing today" })
    );
}

#[tokio::test]
async fn unknown_platform_is_a_uniform_server_error() {
    let s = start_server().await;
    let (status, body) = get_json(&s, "/getMessages?platform=Myspace").await;
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "statusText": SERVER_ERROR }));

    let (status, body) = get_json(&s, "/getMessageContent/Instagram/Nobody").await;
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn add_message_then_read_thread() {
    let s = start_server().await;
    let (_, before) = get_json(&s, "/getMessageContent/Instagram/Mom").await;
    let before = before["all_messages"].as_array().unwrap().clone();

    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Mom"))
        .json(&json!({ "message": "On my way" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "success");

    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Mom"))
        .form(&[("message", "Be there at 6")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.text().await.unwrap(), "success");

    let (_, after) = get_json(&s, "/getMessageContent/Instagram/Mom").await;
    let after = after["all_messages"].as_array().unwrap();
    assert_eq!(after.len(), before.len() + 2);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after[before.len()], json!({ "Me": "On my way" }));
    assert_eq!(after[before.len() + 1], json!({ "Me": "Be there at 6" }));

    let (_, summary) = get_json(&s, "/getMessages?platform=Instagram").await;
    assert_eq!(
        summary["data"][0]["messages"][1]["displayMessages"],
        "Hello there, how are you doing today"
    );
}

#[tokio::test]
async fn add_message_to_missing_conversation_writes_nothing() {
    let s = start_server().await;
    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Stranger"))
        .json(&json!({ "message": "hi?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), SERVER_ERROR);
    assert!(!s.thread_file("Instagram", "Stranger").exists());

    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Mom"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn undecodable_bodies_are_plain_text_bad_requests() {
    let s = start_server().await;
    let before = std::fs::read_to_string(s.thread_file("Instagram", "Mom")).unwrap();

    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Mom"))
        .json(&json!({ "message": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let content_type = resp.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(resp.text().await.unwrap(), BAD_BODY);

    let resp = s
        .client
        .post(s.url("/addMessage/Instagram/Mom"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), BAD_BODY);

    let resp = s
        .client
        .post(s.url("/contactUs"))
        .json(&json!({ "name": ["Ana"], "email": "ana@x.test", "questions": "?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), BAD_BODY);

    let after = std::fs::read_to_string(s.thread_file("Instagram", "Mom")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn concurrent_posts_keep_every_message() {
    let s = start_server().await;
    let mut handles = Vec::new();
    for i in 0..20 {
        let client = s.client.clone();
        let url = s.url("/addMessage/WhatsApp/Dad");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "message": format!("reply {}", i) }))
                .send()
                .await
                .and_then(|r| r.error_for_status())
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }
    let (_, body) = get_json(&s, "/getMessageContent/WhatsApp/Dad").await;
    let messages = body["all_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 21);
    for i in 0..20 {
        assert!(messages.contains(&json!({ "Me": format!("reply {}", i) })));
    }
}

#[tokio::test]
async fn questions_contact_form_and_static_page() {
    let s = start_server().await;
    let (_, q) = get_json(&s, "/getQAndA").await;
    assert_eq!(q["success"], true);
    assert!(q["questions"].as_object().unwrap().len() >= 1);

    let resp = s
        .client
        .post(s.url("/contactUs"))
        .form(&[("name", "Ana"), ("email", "ana@x.test")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.text().await.unwrap(),
        "All fields are required. Please try again."
    );

    let form = reqwest::multipart::Form::new()
        .text("name", "Ana")
        .text("email", "ana@x.test")
        .text("questions", "Do you support Signal?");
    let resp = s
        .client
        .post(s.url("/contactUs"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "Form was successfully submitted!");
    let log = std::fs::read_to_string(s.data.join("contact-form-info.json")).unwrap();
    assert_eq!(
        log,
        "{\"name\":\"Ana\",\"email\":\"ana@x.test\",\"questions\":\"Do you support Signal?\"}\n"
    );

    let page = s.client.get(s.url("/")).send().await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("<h1>Inbox</h1>"));
}
