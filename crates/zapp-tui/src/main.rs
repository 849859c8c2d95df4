mod action;
mod app;
mod groups;
mod keys;
mod search;
mod session;
mod slots;
mod theme;
mod ui;
mod widgets;

#[cfg(test)]
mod testgw;

use std::sync::Arc;

use zapp_proto::config::Config;
use zapp_proto::gateway::HttpGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = zapp_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("zapp.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; suppress noisy connection-level DEBUG from
    // HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("zapp log: {}", log_path.display());

    tracing::info!("zapp starting…");

    let config = Config::load().unwrap_or_default();
    let gateway = Arc::new(HttpGateway::new(
        &config.backend.base_url,
        config.request_timeout(),
    )?);

    let (app, rx) = app::App::new(gateway, config);
    app.run(rx).await
}
