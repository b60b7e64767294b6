//! Demo service: two modules, `db` and `api`, running until Ctrl-C or `SIGTERM`.
//!
//! ```bash
//! RUST_LOG=info cargo run -- start
//! ```

use service_lifecycle::framework::{Env, ModuleConfig, SimpleModule};
use service_lifecycle::lifecycle::{setup_tracing, Service};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let command = std::env::args().nth(1).unwrap_or_else(|| "start".to_string());
    let service = Service::from_env().map_err(|e| e.to_string())?;
    info!(env = %service.env(), %command, "Booting demo service");

    let db = SimpleModule::new("db", |env: Env| {
        let url = match env {
            Env::Production => "postgres://db.internal/app",
            _ => "sqlite::memory:",
        };
        Ok(ModuleConfig::new()
            .on_start(move || info!(url, "Database pool ready"))
            .on_stop(|| info!("Database pool closed")))
    });

    let api = SimpleModule::new("api", |_env: Env| {
        Ok(ModuleConfig::new()
            .on_start(|| info!(port = 8080, "API listening"))
            .on_stop(|| info!("API drained")))
    });

    let result = service.register(db).register(api).run_command(&command).await;
    if let Err(e) = &result {
        error!(error = %e, "Service exited with an error");
    }
    result.map_err(|e| e.to_string())
}
