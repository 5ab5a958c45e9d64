use std::sync::Arc;

use fgb_core::{
    config::Config,
    resolver::{FshareResolver, LinkResolver},
};
use fgb_fshare::FshareHttp;

#[tokio::main]
async fn main() -> Result<(), fgb_core::Error> {
    fgb_core::logging::init("fgb")?;

    let cfg = Arc::new(Config::load()?);

    let transport = FshareHttp::from_config(&cfg)?;
    let resolver: Arc<dyn LinkResolver> = Arc::new(FshareResolver::from_config(transport, &cfg));

    let result = fgb_telegram::router::run_polling(cfg, resolver).await;
    tracing::info!("Bot stopped");

    result.map_err(|e| fgb_core::Error::External(format!("telegram bot failed: {e}")))
}
