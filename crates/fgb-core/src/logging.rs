use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the bot.
pub fn init(service_name: &str) -> Result<()> {
    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,fgb_core=info,fgb_fshare=info,fgb_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))
}

/// First few characters of a secret, for log lines.
pub fn redact(secret: &str) -> String {
    let head: String = secret.chars().take(6).collect();
    if head.len() < secret.len() {
        format!("{head}…")
    } else {
        "…".to_string()
    }
}
