//! Fshare share-URL → direct download link resolution.
//!
//! Every call logs in again; no session is cached between resolutions.

use std::sync::OnceLock;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    config::{Config, FshareCredentials},
    domain::ResolvedLink,
    errors::ResolutionError,
    logging::redact,
    Result,
};

type Resolution<T> = std::result::Result<T, ResolutionError>;

/// Embedded `code` value the login endpoint uses for success.
const LOGIN_OK_CODE: i64 = 200;

// ============== Wire types ==============

/// Body of `POST /user/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub user_email: String,
    pub password: String,
    pub app_key: String,
}

/// Body of `POST /session/download`.
#[derive(Clone, Serialize)]
pub struct DownloadRequest {
    pub token: String,
    pub url: String,
    pub password: String,
    pub zipflag: u8,
}

/// Raw HTTP outcome; interpretation is left to the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostReply {
    pub status: u16,
    pub body: String,
}

impl HostReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    code: Option<i64>,
    token: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadReply {
    location: Option<String>,
}

/// Credentials returned by a successful login. Lives for one resolution only.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub token: String,
    pub session_id: String,
}

impl AuthSession {
    pub fn cookie(&self) -> String {
        format!("session_id={}", self.session_id)
    }
}

// ============== Ports ==============

/// Transport to the content host's REST API.
#[async_trait]
pub trait HostTransport: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<HostReply>;

    async fn session_download(&self, req: &DownloadRequest, cookie: &str) -> Result<HostReply>;
}

/// Anything that can turn a raw share URL into a direct link.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, raw_url: &str) -> Resolution<ResolvedLink>;
}

// ============== File reference ==============

/// The alphanumeric id in a `.../file/<id>` share URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub id: String,
}

impl FileReference {
    pub fn parse(raw: &str) -> Option<Self> {
        static FILE_RE: OnceLock<Regex> = OnceLock::new();
        let re = FILE_RE.get_or_init(|| Regex::new(r"/file/([A-Za-z0-9]+)").expect("valid regex"));
        let caps = re.captures(raw)?;
        Some(Self {
            id: caps[1].to_string(),
        })
    }

    /// Canonical share URL under `file_base` (no trailing slash).
    pub fn share_url(&self, file_base: &str) -> String {
        format!("{file_base}/{}", self.id)
    }
}

/// Last path segment of `location`, percent-decoded, spaces → `_`.
///
/// Characters that would be re-interpreted on a second pass (`/ ? # %`)
/// also become `_`, so the output maps to itself.
pub fn derive_filename(location: &str) -> String {
    let last = location.rsplit('/').next().unwrap_or(location);
    let last = last.split(|c: char| c == '?' || c == '#').next().unwrap_or(last);
    percent_decode_str(last)
        .decode_utf8_lossy()
        .replace(|c: char| matches!(c, ' ' | '/' | '?' | '#' | '%'), "_")
}

// ============== Resolver ==============

pub struct FshareResolver<T> {
    transport: T,
    credentials: FshareCredentials,
    file_base: String,
}

impl<T: HostTransport> FshareResolver<T> {
    pub fn new(transport: T, credentials: FshareCredentials, file_base: impl Into<String>) -> Self {
        Self {
            transport,
            credentials,
            file_base: file_base.into(),
        }
    }

    pub fn from_config(transport: T, cfg: &Config) -> Self {
        Self::new(transport, cfg.fshare.clone(), cfg.fshare_file_base.clone())
    }

    async fn login(&self) -> Resolution<AuthSession> {
        info!("Logging into Fshare...");
        let req = LoginRequest {
            user_email: self.credentials.email.clone(),
            password: self.credentials.password.clone(),
            app_key: self.credentials.app_key.clone(),
        };

        let reply = match self.transport.login(&req).await {
            Ok(r) => r,
            Err(e) => {
                error!("❌ Fshare login failed: {e}");
                return Err(ResolutionError::LoginFailed);
            }
        };

        if !reply.is_ok() {
            error!("❌ Fshare login failed: HTTP {}", reply.status);
            return Err(ResolutionError::LoginFailed);
        }

        let parsed: LoginReply = match serde_json::from_str(&reply.body) {
            Ok(p) => p,
            Err(e) => {
                error!("❌ Fshare login failed: unreadable response: {e}");
                return Err(ResolutionError::LoginFailed);
            }
        };

        if parsed.code != Some(LOGIN_OK_CODE) {
            error!("❌ Fshare login failed: code {:?}", parsed.code);
            return Err(ResolutionError::LoginFailed);
        }

        let token = parsed.token.filter(|t| !t.is_empty());
        let session_id = parsed.session_id.filter(|s| !s.is_empty());
        let (Some(token), Some(session_id)) = (token, session_id) else {
            error!("❌ Fshare login failed: token or session id missing");
            return Err(ResolutionError::LoginFailed);
        };

        info!(
            "✅ Fshare login successful! token={} session={}",
            redact(&token),
            redact(&session_id)
        );
        Ok(AuthSession { token, session_id })
    }

    async fn request_location(
        &self,
        session: &AuthSession,
        file: &FileReference,
    ) -> Resolution<String> {
        let req = DownloadRequest {
            token: session.token.clone(),
            url: file.share_url(&self.file_base),
            password: String::new(),
            zipflag: 0,
        };

        let reply = match self.transport.session_download(&req, &session.cookie()).await {
            Ok(r) => r,
            Err(e) => {
                error!("❌ Failed to fetch download link from Fshare: {e}");
                return Err(ResolutionError::LinkUnavailable);
            }
        };

        info!("Response status code: {}", reply.status);
        info!("Response content: {}", reply.body);

        let location = if reply.is_ok() {
            serde_json::from_str::<DownloadReply>(&reply.body)
                .ok()
                .and_then(|r| r.location)
                .filter(|l| !l.is_empty())
        } else {
            None
        };

        location.ok_or_else(|| {
            error!("❌ Failed to fetch download link from Fshare!");
            ResolutionError::LinkUnavailable
        })
    }
}

#[async_trait]
impl<T: HostTransport> LinkResolver for FshareResolver<T> {
    async fn resolve(&self, raw_url: &str) -> Resolution<ResolvedLink> {
        info!("Fetching Fshare download link for: {raw_url}");

        let Some(file) = FileReference::parse(raw_url) else {
            error!("❌ Invalid Fshare URL!");
            return Err(ResolutionError::InvalidUrl);
        };
        info!("Extracted file ID: {}", file.id);

        let session = self.login().await?;
        let url = self.request_location(&session, &file).await?;
        let filename = derive_filename(&url);

        info!("✅ Fetched direct link: {url}");
        info!("Extracted filename: {filename}");
        Ok(ResolvedLink { url, filename })
    }
}
