mod auth;
mod config;
mod dates;
mod forms;
mod json_field;
mod web;

use config::{load as config_load, validate as config_validate};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config_load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = config_validate(&config) {
        eprintln!("Configuration error: {err}");
        std::process::exit(1);
    }

    info!(
        auth_config = ?config.auth.sanitized_for_log(),
        port = config.server.port,
        "Effective configuration loaded"
    );

    let guard = match auth::Guard::new(&config.auth) {
        Ok(guard) => guard,
        Err(err) => {
            error!(error = %err, "Failed to build route guard");
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Ctrl-C received, shutting down gracefully");
        running_signal.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    info!("storefront starting");

    let port = config.server.port;
    let web_handle = std::thread::Builder::new()
        .name("web-server".into())
        .spawn(move || web::start(port, guard, running))
        .expect("Failed to spawn web server thread");

    match web_handle.join() {
        Ok(Ok(())) => info!("storefront stopped"),
        Ok(Err(err)) => {
            error!(error = %format!("{err:#}"), "Web server failed");
            std::process::exit(1);
        }
        Err(err) => {
            error!("Web server thread panicked: {:?}", err);
            std::process::exit(1);
        }
    }
}
