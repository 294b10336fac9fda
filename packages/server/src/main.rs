use std::net::SocketAddr;
use std::sync::Arc;

use common::mail::{HttpMailer, Mailer, NullMailer};
use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::seed;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::seed_role_permissions(&db).await?;
    seed::seed_admin_user(&db, &config).await?;
    seed::ensure_indexes(&db).await?;

    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(
            HttpMailer::new(
                config.mail.endpoint.clone(),
                config.mail.api_key.clone(),
                config.mail.sender.clone(),
            )
            .map_err(|e| anyhow::anyhow!("invalid mail configuration: {e}"))?,
        )
    } else {
        info!("Mail delivery disabled; invitation credentials are returned in responses");
        Arc::new(NullMailer)
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        config: Arc::new(config),
        mailer,
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
