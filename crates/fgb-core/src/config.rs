use std::{env, fmt, fs, path::Path, path::PathBuf};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_ARIA2_RPC_URL: &str = "http://localhost:6800/jsonrpc";
pub const DEFAULT_SAVE_DIR: &str = "D:/Getlink";
pub const DEFAULT_FSHARE_API_BASE: &str = "https://api.fshare.vn/api";
pub const DEFAULT_FSHARE_FILE_BASE: &str = "https://www.fshare.vn/file";
/// User agent registered together with the Fshare app key.
pub const DEFAULT_FSHARE_USER_AGENT: &str = "TESTGFS-M6ULNU";

/// Fshare account credentials, held for the process lifetime.
#[derive(Clone)]
pub struct FshareCredentials {
    pub email: String,
    pub password: String,
    pub app_key: String,
}

impl fmt::Debug for FshareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FshareCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Typed configuration, loaded once at startup and read-only afterwards.
#[derive(Clone)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub authorized_user: UserId,

    // Fshare
    pub fshare: FshareCredentials,
    pub fshare_api_base: String,
    pub fshare_file_base: String,
    pub fshare_user_agent: String,
    pub custom_storage_url: Option<String>,

    // Download queue (aria2); not used when resolving links.
    pub aria2_rpc_url: String,
    pub aria2_secret: Option<String>,
    pub save_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("authorized_user", &self.authorized_user)
            .field("fshare", &self.fshare)
            .field("fshare_api_base", &self.fshare_api_base)
            .field("fshare_file_base", &self.fshare_file_base)
            .field("fshare_user_agent", &self.fshare_user_agent)
            .field("custom_storage_url", &self.custom_storage_url)
            .field("aria2_rpc_url", &self.aria2_rpc_url)
            .field("aria2_secret", &self.aria2_secret.as_ref().map(|_| "<redacted>"))
            .field("save_dir", &self.save_dir)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, after merging `./.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required env vars
        let telegram_bot_token = required(get("BOT_TOKEN"), "BOT_TOKEN")?;
        let authorized_raw = required(get("AUTHORIZED_USER_ID"), "AUTHORIZED_USER_ID")?;
        let email = required(get("FSHARE_USERNAME"), "FSHARE_USERNAME")?;
        let password = required(get("FSHARE_PASSWORD"), "FSHARE_PASSWORD")?;
        let app_key = required(get("API_KEY"), "API_KEY")?;

        let authorized_user = authorized_raw
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| Error::Config("AUTHORIZED_USER_ID must be an integer".to_string()))?;

        // Fshare endpoints
        let fshare_api_base = get("FSHARE_API_BASE")
            .unwrap_or_else(|| DEFAULT_FSHARE_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let fshare_file_base = get("FSHARE_FILE_BASE")
            .unwrap_or_else(|| DEFAULT_FSHARE_FILE_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let fshare_user_agent =
            get("FSHARE_USER_AGENT").unwrap_or_else(|| DEFAULT_FSHARE_USER_AGENT.to_string());
        let custom_storage_url = get("CUSTOM_STORAGE_URL");

        // Download queue
        let aria2_rpc_url =
            get("ARIA2_RPC_URL").unwrap_or_else(|| DEFAULT_ARIA2_RPC_URL.to_string());
        let aria2_secret = get("ARIA2_SECRET");
        let save_dir = PathBuf::from(get("SAVE_DIR").unwrap_or_else(|| DEFAULT_SAVE_DIR.to_string()));

        Ok(Self {
            telegram_bot_token,
            authorized_user,
            fshare: FshareCredentials {
                email,
                password,
                app_key,
            },
            fshare_api_base,
            fshare_file_base,
            fshare_user_agent,
            custom_storage_url,
            aria2_rpc_url,
            aria2_secret,
            save_dir,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value.ok_or_else(|| Error::Config(format!("Missing required environment variable: {key}")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
