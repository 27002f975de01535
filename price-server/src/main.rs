//! Точка входа `price-server`.
//!
//! Жизненный цикл:
//! - парсинг CLI, HTTP клиент для Яндекс.Диска и НБ РБ
//! - первая сборка прайса (скачать или взять из кэша); без неё сервер не стартует
//! - фоновый исполнитель `/update`
//! - TCP accept loop: одна команда на соединение
//! - корректная остановка по `Ctrl+C`

mod cache;
mod cli;
mod commands;
mod config;
mod fetcher;
mod http;
mod manager;
mod rates;
mod refresher;
mod tcp;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use crate::cache::RawCache;
use crate::commands::{CommandContext, ServerContext};
use crate::fetcher::YandexDiskFetcher;
use crate::manager::CatalogManager;
use crate::rates::NbrbRateSource;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();
    info!(
        "Starting price-server: tcp={}, cache={:?}, http_timeout={}s",
        args.tcp_bind, args.cache_file, args.http_timeout
    );

    let http_timeout = Duration::from_secs(args.http_timeout);
    let client = http::build_client(http_timeout)?;
    let rates = NbrbRateSource::new(client.clone(), args.rates_api.clone());
    let source = YandexDiskFetcher::new(client, args.disk_api.clone(), args.public_link.clone());

    let manager = CatalogManager::bootstrap(
        Box::new(source),
        Box::new(rates),
        RawCache::new(&args.cache_file),
    )
    .context("initial catalog build failed")?;
    let manager = Arc::new(manager);

    let (refresh, worker) = refresher::spawn_refresh_worker(manager.clone(), shutdown.clone());

    let ctx: Arc<dyn CommandContext + Send + Sync> = Arc::new(ServerContext {
        manager,
        refresh,
        refresh_wait: config::refresh_wait(http_timeout),
    });

    let served = tcp::run_tcp_listener(args.tcp_bind, ctx, shutdown.clone());

    // listener мог упасть сам, останавливаем и исполнителя
    shutdown.store(true, Ordering::Relaxed);
    if let Err(panic) = worker.join() {
        warn!("refresh worker panicked: {:?}", panic);
    }

    served
}
