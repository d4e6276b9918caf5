//! Copydesk server binary
//!
//! Run with: cargo run -p copydesk --bin copydesk-server
//! Set COPYDESK_CONFIG to a TOML file to override the defaults.

use copydesk::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copydesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         Copydesk                          ║
║        Marketing Copy with Retrieval over Past Work       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?} ({})", config.llm.backend, config.llm.base_url);
    tracing::info!("  - Chat model: {}", config.llm.chat_model);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Outputs: {}", config.storage.outputs_dir.display());
    tracing::info!("  - Duplicate policy: {:?}", config.storage.duplicate_policy);

    let base_url = config.llm.base_url.clone();
    let server = RagServer::new(config).await?;

    // The server still starts; /ready reports 503 until the backends answer
    tracing::info!("Checking backends at {}...", base_url);
    if !server.state().check_backends().await {
        tracing::warn!("Backends not available at {}", base_url);
        tracing::warn!("Generation and retrieval requests will fail until they are reachable");
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Ready: http://{}/ready", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/content        - Generate an SEO article");
    println!("  POST /api/marketing-post - Generate a social post");
    println!("  POST /api/embeddings     - Embed an artifact by topic");
    println!("  POST /api/rag            - Ask questions");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
