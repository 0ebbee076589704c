pub mod helpers;
pub mod pipelines;
pub mod routes;
pub mod types;

use axum::Router;
use latency_harness::config::HarnessConfig;
use latency_harness::orchestrator::Simulator;
use log::{error, info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

/// Blank values count as unset.
fn env_setting(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_api_bind_addr() -> String {
    env_setting("API_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string())
}

fn resolve_api_port() -> u16 {
    env_setting("API_PORT")
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000)
}

fn resolve_simulate_on_start() -> bool {
    env_setting("API_SIMULATE_ON_START")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let log_level = latency_core::resolve_log_level("API_LOG_LEVEL");
    let log_file = latency_core::resolve_log_file("API_LOG_FILE", Some("api.log"));
    latency_core::initialize_logger(log_level, log_file.as_deref())?;

    info!(
        "API starting (level={}, logfile={})",
        log_level,
        log_file.as_deref().unwrap_or("none")
    );

    let config = HarnessConfig::from_env();
    for backend in latency_harness::catalog::Backend::ALL {
        if let Some(var) = backend.url_env_var() {
            if !config.remote_urls.contains_key(&backend) {
                warn!("{} is not set; {} runs will fail", var, backend);
            }
        }
    }

    // Opening the store recreates the result log table.
    let simulator = Arc::new(Simulator::from_config(&config)?);
    info!("Result log ready at {}", config.database_path.display());

    if resolve_simulate_on_start() {
        let simulator = Arc::clone(&simulator);
        tokio::spawn(async move {
            if let Err(err) = pipelines::run_simulations(simulator).await {
                error!("Startup simulation run failed: {}", err);
            }
        });
    }

    // Concurrent triggers queue on the simulator's run lock.
    let app = Router::new()
        .merge(routes::report_routes())
        .merge(routes::trigger_routes())
        .with_state(simulator);

    let bind_address = format!("{}:{}", resolve_api_bind_addr(), resolve_api_port());
    info!("Listening on {}", bind_address);

    let tls_cert = env_setting("API_TLS_CERT");
    let tls_key = env_setting("API_TLS_KEY");

    match (tls_cert, tls_key) {
        (Some(cert_path), Some(key_path)) => {
            info!("HTTPS enabled (cert={}, key={})", cert_path, key_path);
            let tls_config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
                    .await
                    .map_err(|e| format!("Failed to load TLS cert/key: {e}"))?;
            let addr: SocketAddr = bind_address
                .parse()
                .map_err(|e| format!("Invalid bind address: {e}"))?;
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                .await?;
        }
        _ => {
            warn!("API is running without TLS; set API_TLS_CERT and API_TLS_KEY to enable HTTPS");
            let listener = tokio::net::TcpListener::bind(&bind_address).await?;
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;
        }
    }

    info!("Server shutdown");
    Ok(())
}
