//! HTTP API and static asset server.
//!
//! JSON endpoints answer `{ "success": true, ... }` or a 500 with
//! `{ "success": false, "statusText": ... }`; the posting endpoints answer in plain text.

mod protocol;
mod routes;

pub use protocol::{ApiErrorBody, FormOrJson, BAD_BODY, SERVER_ERROR};
pub use routes::{router, run_server, ServerState};
