use price_core::Command;
use price_core::protocol::format_command_line;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use thiserror::Error;

const TCP_READ_TIMEOUT_S: u64 = 5;
const TCP_WRITE_TIMEOUT_S: u64 = 5;
// сервер отвечает на /update только после пересборки прайса (до 70 с по умолчанию)
const UPDATE_READ_TIMEOUT_S: u64 = 90;

#[derive(Debug, Error)]
pub(crate) enum ReplyError {
    #[error("server closed connection without response")]
    Empty,

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Отправить одну команду и прочитать ответ целиком (сервер закрывает соединение сам)
pub(crate) fn send_command(server_tcp_addr: SocketAddr, cmd: &Command) -> Result<String, ReplyError> {
    let mut stream = TcpStream::connect(server_tcp_addr)?;

    let read_timeout = match cmd {
        Command::Update => UPDATE_READ_TIMEOUT_S,
        _ => TCP_READ_TIMEOUT_S,
    };

    stream.set_nodelay(true).ok();
    stream
        .set_read_timeout(Some(Duration::from_secs(read_timeout)))
        .ok();
    stream
        .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
        .ok();

    stream.write_all(format_command_line(cmd).as_bytes())?;
    stream.flush()?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    parse_reply(&buf)
}

fn parse_reply(buf: &[u8]) -> Result<String, ReplyError> {
    let text = String::from_utf8_lossy(buf);
    let text = text.trim_end_matches(&['\r', '\n'][..]);

    if text.is_empty() {
        return Err(ReplyError::Empty);
    }
    if let Some(rest) = text.strip_prefix("ERR ") {
        return Err(ReplyError::Server(rest.trim().to_string()));
    }
    Ok(text.to_string())
}
