//! Binary entrypoint for the agentry API server.
use agentry_api::run;
use agentry_workflows::LegalConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional YAML config; defaults apply when unset or unreadable.
    let config = match std::env::var("AGENTRY_CONFIG") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(yaml) => LegalConfig::from_yaml(&yaml).unwrap_or_else(|e| {
                tracing::warn!(%path, error = %e, "invalid config file, using defaults");
                LegalConfig::default()
            }),
            Err(e) => {
                tracing::warn!(%path, error = %e, "unreadable config file, using defaults");
                LegalConfig::default()
            }
        },
        Err(_) => LegalConfig::default(),
    };

    // Default listen address can be overridden with AGENTRY_ADDR
    let addr = std::env::var("AGENTRY_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    run(&addr, config).await;
}
