//! Точка входа `price-client`.
//!
//! Жизненный цикл:
//! - парсинг CLI
//! - `--query`: одна команда, ответ в stdout, выход
//! - иначе: команды со stdin построчно, каждая отдельным TCP соединением

mod cli;
mod tcp;

use std::io::{BufRead, Write};
use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use price_core::protocol::parse_command;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let args = cli::Args::parse();
    args.validate()?;

    let server = args
        .server_socket_addr()
        .with_context(|| format!("resolve --server {}", args.server))?;
    info!("Starting price-client: server_tcp={server}");

    match &args.query {
        Some(q) => run_once(server, q),
        None => run_repl(server),
    }
}

fn run_once(server: SocketAddr, line: &str) -> anyhow::Result<()> {
    // команду проверяем локально, чтобы не тратить соединение на мусор
    let cmd = parse_command(line)?;
    let reply = tcp::send_command(server, &cmd)?;
    println!("{reply}");
    Ok(())
}

fn run_repl(server: SocketAddr) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        writeln!(stdout, "{}", answer(server, &line))?;
        stdout.flush()?;
    }

    Ok(())
}

// то, что увидит пользователь в интерактивном режиме: ответ сервера или причина отказа
fn answer(server: SocketAddr, line: &str) -> String {
    let cmd = match parse_command(line) {
        Ok(cmd) => cmd,
        Err(e) => return format!("⚠️ {e}"),
    };

    match tcp::send_command(server, &cmd) {
        Ok(reply) => format!("{reply}\n"),
        Err(e) => {
            warn!("request failed: {e}");
            format!("❌ {e}")
        }
    }
}
