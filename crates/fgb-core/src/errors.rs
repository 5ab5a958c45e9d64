/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single link resolution failed.
///
/// The `Display` text is what the end user sees, so keep it short.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("❌ Invalid Fshare URL!")]
    InvalidUrl,

    #[error("❌ Login failed!")]
    LoginFailed,

    #[error("❌ Failed to get download link!")]
    LinkUnavailable,
}
