//! Fshare adapter (REST transport).
//!
//! Implements the `fgb-core` HostTransport port over reqwest. Status codes and
//! bodies are passed back untouched; the core resolver interprets them.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use tracing::debug;

use fgb_core::{
    config::Config,
    errors::Error,
    resolver::{DownloadRequest, HostReply, HostTransport, LoginRequest},
    Result,
};

#[derive(Clone, Debug)]
pub struct FshareHttp {
    api_base: String,
    user_agent: String,
    http: reqwest::Client,
}

impl FshareHttp {
    pub fn new(api_base: impl Into<String>, user_agent: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::External(format!("fshare client build error: {e}")))?;
        Ok(Self::with_client(api_base, user_agent, http))
    }

    pub fn with_client(
        api_base: impl Into<String>,
        user_agent: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            http,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.fshare_api_base.clone(), cfg.fshare_user_agent.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    async fn read_reply(resp: reqwest::Response) -> Result<HostReply> {
        let status = resp.status().as_u16();
        debug!("fshare {} -> {status}", resp.url());
        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("fshare response error: {e}")))?;
        Ok(HostReply { status, body })
    }
}

#[async_trait]
impl HostTransport for FshareHttp {
    async fn login(&self, req: &LoginRequest) -> Result<HostReply> {
        let resp = self
            .http
            .post(self.endpoint("user/login"))
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .json(req)
            .send()
            .await
            .map_err(|e| Error::External(format!("fshare login request error: {e}")))?;

        Self::read_reply(resp).await
    }

    async fn session_download(&self, req: &DownloadRequest, cookie: &str) -> Result<HostReply> {
        let resp = self
            .http
            .post(self.endpoint("session/download"))
            .header(COOKIE, cookie)
            .header(USER_AGENT, &self.user_agent)
            .json(req)
            .send()
            .await
            .map_err(|e| Error::External(format!("fshare download request error: {e}")))?;

        Self::read_reply(resp).await
    }
}
