use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use medicalbot::chat::{self, AppState};
use medicalbot::config::ChatSettings;
use medicalbot::llm::OpenAiClient;
use medicalbot::logging;

/// MedicalBot chat server
#[derive(Parser, Debug)]
#[command(name = "medicalbot", version)]
struct Args {
    #[arg(long, env = "CHAT_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "CHAT_PORT", default_value_t = 5000)]
    port: u16,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let settings = ChatSettings::from_env();
    tracing::info!(
        "OPENAI_API_KEY present: {}",
        settings.openai_api_key.is_some()
    );

    let llm = Arc::new(OpenAiClient::from_settings(&settings));
    let app = chat::router(AppState::new(llm));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
