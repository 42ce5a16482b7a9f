use anyhow::Context;
use db::DBService;
use secrecy::ExposeSecret;
use server::{AppState, app, config::Config};
use services::services::auth::Authenticator;
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};
use utils::{jwt::TokenIssuer, sentry::sentry_layer};

const DEFAULT_LOG_FILTER: &str = "info,server=debug,services=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    let _sentry = utils::sentry::init(config.sentry_dsn.as_deref());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(sentry_layer())
        .init();

    let db = DBService::new(&config.database_url)
        .await
        .context("failed to open database")?;

    let tokens = TokenIssuer::new(
        config.jwt_secret_bytes(),
        config.admin_token_ttl,
        config.customer_token_ttl,
    );
    let auth = Authenticator::new(db.pool.clone(), tokens, config.bcrypt_cost);

    if let Some(bootstrap) = &config.admin_bootstrap {
        auth.ensure_admin(&bootstrap.email, bootstrap.password.expose_secret())
            .await
            .context("failed to bootstrap admin account")?;
    }

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        admin_token_ttl_hours = config.admin_token_ttl.num_hours(),
        customer_token_ttl_hours = config.customer_token_ttl.num_hours(),
        "Construction portal listening"
    );

    axum::serve(listener, app(AppState::new(db, auth)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
