use std::process;

use log::error;
use studio_scheduler::config::StudioConfig;
use studio_scheduler::server;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::var("STUDIO_CONFIG").unwrap_or_else(|_| "studio.toml".to_string());
    let config = match StudioConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load {}: {}", path, e);
            process::exit(1);
        }
    };

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {}", e);
        process::exit(1);
    }
}
