use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config;

/// Price Server - отвечает ценами из прайса на Яндекс.Диске с пересчётом по курсам НБ РБ.
///
/// Протокол: одна строка-команда на TCP соединение (`/start`, `/update`,
/// `/rate` или текст запроса), в ответ — текст, после чего соединение закрывается.
#[derive(Parser, Debug, Clone)]
#[command(name = "price-server", version, about)]
pub(crate) struct Args {
    /// TCP bind address, например 0.0.0.0:5555
    #[arg(long, default_value = config::TCP_BIND_ADDR)]
    pub(crate) tcp_bind: SocketAddr,

    /// Публичная ссылка на прайс (xlsx или csv) на Яндекс.Диске
    #[arg(long, default_value = config::CATALOG_PUBLIC_LINK)]
    pub(crate) public_link: String,

    /// Endpoint Яндекс.Диска для получения прямой ссылки
    #[arg(long, default_value = config::DISK_RESOLVE_URL)]
    pub(crate) disk_api: String,

    /// База API курсов НБ РБ
    #[arg(long, default_value = config::NBRB_RATES_URL)]
    pub(crate) rates_api: String,

    /// Файл, куда кладётся последний удачно скачанный прайс.
    /// Если Яндекс.Диск недоступен, прайс берётся отсюда.
    #[arg(long, default_value = config::CACHE_FILE)]
    pub(crate) cache_file: PathBuf,

    /// Таймаут HTTP запросов, секунды
    #[arg(long, default_value_t = config::HTTP_TIMEOUT_S,
          value_parser = clap::value_parser!(u64).range(1..=300))]
    pub(crate) http_timeout: u64,
}
