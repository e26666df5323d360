use std::sync::Arc;

use anyhow::Context;
use lumina::{
    store::{FileStore, KeyValueStore},
    ArticleStore, Config, DraftAssistant,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load().context("failed to load configuration")?;

    tracing::info!("Starting lumina");
    tracing::info!("Web server will listen on: {}", config.web_addr());
    tracing::info!("Articles are stored in: {}", config.data_dir);

    let backend: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
    let store = Arc::new(ArticleStore::open(backend).await);
    let assistant =
        Arc::new(DraftAssistant::from_config(&config).context("failed to set up draft assistant")?);

    let app_state = lumina::web::AppState::new(store, assistant);

    lumina::web::serve(config.web_addr(), app_state)
        .await
        .context("web server stopped")?;

    tracing::info!("lumina stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lumina=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
