use axum::extract::DefaultBodyLimit;
use bagrut_bio::{
    config::{get_config, init_config},
    middleware::cors::cors_layer,
    routes,
    services::question_bank::QuestionBank,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let config = get_config()?;

    let bank = QuestionBank::load(config.question_bank_path.as_deref()).await?;
    info!(
        questions = bank.len(),
        categories = bank.categories().len(),
        "Question bank loaded"
    );

    let app_state = AppState::new(config, bank)?;
    let mut app = routes::router(app_state);

    if let Some(dir) = &config.static_dir {
        info!("Serving static assets from: {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .layer(cors_layer(config.cors_origin.as_deref())?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
