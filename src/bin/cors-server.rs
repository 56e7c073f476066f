use clap::Parser;
use color_eyre::eyre::WrapErr;
use cors_headers::{
    config::{Config, Options},
    middleware::CorsLayer,
    services,
};
use hyper::server::Server;
use std::{env, fs};
use tower::{make::Shared, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::{info, log::LevelFilter};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(LevelFilter::Info);
    if let Ok(filters) = env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    color_eyre::install()?;
    let opts = Options::parse();

    // Load the config
    let cfg_path = opts.cfg;
    let cfg_file = fs::read_to_string(&cfg_path)
        .wrap_err_with(|| format!("Failed to open config file '{}'", cfg_path.display()))?;
    let cfg: Config = toml::from_str(&cfg_file)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", cfg_path.display()))?;

    let policy = cfg.cors.policy();
    info!("CORS policy: {:?}", policy);

    let service = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new(policy))
        .service(services::public(cfg.data.public()));

    // Finally, run the server
    let addr = cfg.general.addr();
    let server = Server::try_bind(&addr)
        .wrap_err_with(|| format!("Failed to bind to {}", addr))?
        .serve(Shared::new(service));
    info!("Serving '{}' on http://{}", cfg.data.public().display(), addr);

    server
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    Ok(())
}
