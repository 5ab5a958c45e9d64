use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use fgb_core::{
    config::Config, messaging::port::MessagingPort, resolver::LinkResolver,
    security::AuthorizationGate,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub gate: AuthorizationGate,
    pub resolver: Arc<dyn LinkResolver>,
    pub messenger: Arc<dyn MessagingPort>,
}

impl AppState {
    pub fn new(
        cfg: Arc<Config>,
        resolver: Arc<dyn LinkResolver>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            gate: AuthorizationGate::new(cfg.authorized_user),
            cfg,
            resolver,
            messenger,
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, resolver: Arc<dyn LinkResolver>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => info!("🤖 Telegram bot is starting: @{}", me.username()),
        Err(e) => warn!("Could not fetch bot identity: {e}"),
    }
    info!("Authorized user: {}", cfg.authorized_user.0);
    info!("Fshare account: {}", cfg.fshare.email);
    info!("aria2 RPC: {} (save dir {})", cfg.aria2_rpc_url, cfg.save_dir.display());
    if let Some(url) = &cfg.custom_storage_url {
        info!("Custom storage URL: {url}");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(cfg, resolver, messenger));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
