use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Result, bail};
use clap::Parser;

/// Price Client - запросы к price-server по TCP.
///
/// Каждая команда уходит отдельным соединением: одна строка туда, текст обратно.
/// Без `--query` читает команды со stdin построчно.
#[derive(Parser, Debug, Clone)]
#[command(name = "price-client", version, about)]
pub(crate) struct Args {
    /// TCP адрес price-server, например 127.0.0.1:5555 или host.example.com:5555
    #[arg(long)]
    pub(crate) server: String,

    /// Одна команда или поисковый запрос: "/rate", "/update", "чехол iphone"
    #[arg(long)]
    pub(crate) query: Option<String>,
}

impl Args {
    /// Проверяет, что server выглядит как HOST:PORT
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }
        if self.query.as_deref().is_some_and(|q| q.trim().is_empty()) {
            bail!("--query is empty");
        }
        Ok(())
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        })
    }
}
