use std::sync::Arc;

use clap::Parser;
use gpt_cache_gateway::{
    AppState, Tables, build_router,
    config::Args,
    generation::OpenAiGenerator,
    logging::init_logging,
    store::{KeyValueStore, MemoryStore, RedisStore},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // parse cli arguments
    let args = Args::parse();
    init_logging(&args.log_level, args.log_format);

    let store: Arc<dyn KeyValueStore> = match &args.redis_url {
        Some(url) => Arc::new(RedisStore::connect(url).await?),
        None => {
            tracing::warn!("REDIS_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if args.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY not set, generation calls will be rejected upstream");
    }
    let generator = OpenAiGenerator::with_base_url(
        &args.openai_api_key,
        &args.openai_base_url,
        args.upstream_timeout(),
    )?
    .with_temperature(args.temperature);

    if args.purge_secret.is_none() {
        tracing::warn!("PURGE_SECRET not set, purge requests will be refused");
    }

    // creating shared state
    let state = Arc::new(AppState::new(
        store,
        Arc::new(generator),
        Tables::from(&args),
        args.model.clone(),
        args.purge_secret.clone(),
    ));

    let app = build_router(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway running on http://{}", addr);
    tracing::info!("Default model: {}", args.model);
    axum::serve(listener, app).await?;
    Ok(())
}
