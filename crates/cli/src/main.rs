use clap::{Parser, Subcommand};
use inbox::store::{FsStore, ThreadStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "inbox")]
#[command(about = "Inbox CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the config file and seed the data directory (sample platforms, Q&A, static page). Existing data is kept.
    Init {
        /// Config file path (default: INBOX_CONFIG_PATH or ~/.inbox/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the HTTP server.
    Serve {
        /// Config file path (default: INBOX_CONFIG_PATH or ~/.inbox/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default: PORT env, then config, then 8000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print platform summaries (icon, API URL, conversation previews) as JSON.
    Platforms {
        /// Config file path (default: INBOX_CONFIG_PATH or ~/.inbox/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Only this platform.
        #[arg(long, value_name = "ID")]
        platform: Option<String>,
    },

    /// Print one conversation thread as JSON.
    Thread {
        /// Config file path (default: INBOX_CONFIG_PATH or ~/.inbox/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        #[arg(long, value_name = "ID")]
        platform: String,

        #[arg(long, value_name = "ID")]
        sender: String,
    },

    /// Append an outgoing message to an existing conversation.
    Send {
        /// Config file path (default: INBOX_CONFIG_PATH or ~/.inbox/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        #[arg(long, value_name = "ID")]
        platform: String,

        #[arg(long, value_name = "ID")]
        sender: String,

        /// Message body.
        message: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("inbox {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Serve { config, port }) => run_serve(config, port).await,
        Some(Commands::Platforms { config, platform }) => run_platforms(config, platform).await,
        Some(Commands::Thread {
            config,
            platform,
            sender,
        }) => run_thread(config, platform, sender).await,
        Some(Commands::Send {
            config,
            platform,
            sender,
            message,
        }) => run_send(config, platform, sender, message).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(inbox::config::default_config_path);
    let paths = inbox::init::init_data_dir(&path)?;
    println!("initialized inbox data at {}", paths.root.display());
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = inbox::config::load_config(config_path)?;
    config.server.port = port.unwrap_or_else(|| inbox::config::resolve_port(&config));
    log::info!(
        "starting inbox server on {}:{}",
        config.server.bind,
        config.server.port
    );
    inbox::server::run_server(config, path).await
}

/// Open the filesystem store for the configured data root.
fn open_store(config_path: Option<PathBuf>) -> anyhow::Result<Arc<dyn ThreadStore>> {
    let (config, path) = inbox::config::load_config(config_path)?;
    let paths = inbox::config::resolve_data_paths(&config, &path);
    inbox::init::require_initialized(&paths)?;
    Ok(Arc::new(FsStore::new(paths.platforms)))
}

async fn run_platforms(
    config_path: Option<PathBuf>,
    platform: Option<String>,
) -> anyhow::Result<()> {
    let store = open_store(config_path)?;
    let summaries =
        inbox::aggregate::collect_summaries(store.as_ref(), platform.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

async fn run_thread(
    config_path: Option<PathBuf>,
    platform: String,
    sender: String,
) -> anyhow::Result<()> {
    let store = open_store(config_path)?;
    let thread = store.read_thread(&platform, &sender).await?;
    println!("{}", serde_json::to_string_pretty(&thread)?);
    Ok(())
}

async fn run_send(
    config_path: Option<PathBuf>,
    platform: String,
    sender: String,
    message: String,
) -> anyhow::Result<()> {
    let store = open_store(config_path)?;
    let ingest = inbox::ingest::MessageIngest::new(store);
    let thread = ingest.append_message(&platform, &sender, &message).await?;
    println!(
        "appended to {}/{} ({} messages)",
        platform,
        sender,
        thread.len()
    );
    Ok(())
}
