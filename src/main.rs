use clap::Parser;
use erica::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "erica", about = "Terminal client for the Erica chat assistant")]
struct Args {
    /// Base URL of the chat server (serves /chat and /reset)
    #[arg(short, long)]
    server: Option<String>,

    /// Name shown on the assistant's messages
    #[arg(short, long)]
    agent: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to erica.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("erica.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            log::error!("Failed to load config: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e));
        }
    };
    let resolved = config::resolve(&file_config, args.server.as_deref(), args.agent.as_deref());

    log::info!(
        "Erica starting up: server={}, agent={}",
        resolved.server_url,
        resolved.agent_name
    );

    erica::tui::run(resolved)
}
