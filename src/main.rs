use mimalloc::MiMalloc;
use signbook::db::{self, AttendanceStorage};
use signbook::router::{AdminAuth, SignbookState, signbook_router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &signbook::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        port = cfg.port,
        pool_size = cfg.pool_size,
        loglevel = %cfg.loglevel,
        "starting signbook"
    );

    let pool = db::connect(&cfg.database_url, cfg.pool_size).await?;
    let storage = AttendanceStorage::new(pool);
    storage.init_schema().await?;

    let state = SignbookState::new(
        storage,
        AdminAuth {
            username: cfg.admin_username.clone(),
            password: cfg.admin_password.clone(),
            token: cfg.session_token.clone(),
        },
    );
    let app = signbook_router(state);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
