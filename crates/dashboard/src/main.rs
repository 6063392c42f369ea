//! Headless results dashboard.
//!
//! Usage: `dashboard <page-url> [--watch]`
//!
//! Loads the results of every builder for the state encoded in the page URL's
//! fragment and logs a summary once everything has arrived. With `--watch`
//! the process keeps running and re-renders on every delivery.

use anyhow::{Error, anyhow};
use log::info;
use page_sync::{MemoryLocation, SyncConfig, SyncEngine, event_channel, run};
use std::env;
use tokio::runtime::Builder;

mod loader;
mod page;

use loader::FetchLoader;
use page::SummaryPage;

pub fn main() -> Result<(), Error> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let href = args
        .next()
        .ok_or_else(|| anyhow!("usage: dashboard <page-url> [--watch]"))?;
    let watch = args.any(|arg| arg == "--watch");

    let config = SyncConfig::from_env();
    let tables = config.builder_tables()?;
    let location = MemoryLocation::new(&href)?;
    let page_url = location.url().clone();

    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let (sender, receiver) = event_channel();
        let loader = FetchLoader::new(page_url, sender.clone());
        let page = SummaryPage::new((!watch).then(|| sender.clone()));
        drop(sender);

        let mut engine = SyncEngine::new(location, loader, page, tables);
        engine.start()?;
        run(&mut engine, receiver, config.poll_interval()).await;
        info!("dashboard: rendered {} times", engine.page().renders());
        Ok::<(), Error>(())
    })
}
