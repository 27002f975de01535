use crate::commands::{CommandContext, dispatch};
use crate::config::ClientId;
use anyhow::Context;
use log::{debug, info, warn};
use price_core::protocol::parse_command;
use price_core::Command;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::AtomicU64, atomic::Ordering};
use std::thread;
use std::time::Duration;

const TCP_READ_TIMEOUT_S: u64 = 5;
const TCP_WRITE_TIMEOUT_S: u64 = 5;

// accept loop: одно соединение = одна команда = один поток
pub(crate) fn run_tcp_listener(
    tcp_addr: SocketAddr,
    ctx: Arc<dyn CommandContext + Send + Sync>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener =
        TcpListener::bind(tcp_addr).with_context(|| format!("bind TCP listener {}", tcp_addr))?;
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;
    info!("listening on {tcp_addr}");

    let next_client_id = AtomicU64::new(1);
    let mut session_handles = Vec::new();

    loop {
        reap_finished_sessions(&mut session_handles);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                stream
                    .set_nonblocking(false)
                    .context("stream.set_nonblocking(false)")?;

                stream.set_nodelay(true).ok();
                stream
                    .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT_S)))
                    .ok();
                stream
                    .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
                    .ok();

                let cid = next_client_id.fetch_add(1, Ordering::Relaxed);
                debug!("client {cid} connected from {addr}");

                let ctx = ctx.clone();
                let h = thread::spawn(move || {
                    if let Err(e) = handle_conn(stream, cid, ctx.as_ref()) {
                        warn!("handle_conn error for client {cid}: {e}");
                    }
                });
                session_handles.push(h);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(Duration::from_millis(50));
            }
        }
    }

    for h in session_handles {
        if let Err(panic) = h.join() {
            warn!("session thread panicked: {:?}", panic);
        }
    }

    Ok(())
}

fn reap_finished_sessions(handles: &mut Vec<thread::JoinHandle<()>>) {
    let mut i = 0;
    while i < handles.len() {
        if handles[i].is_finished() {
            let h = handles.swap_remove(i);
            if let Err(panic) = h.join() {
                warn!("session thread panicked: {:?}", panic);
            }
        } else {
            i += 1;
        }
    }
}

fn extract_command(stream: &mut TcpStream) -> anyhow::Result<Command> {
    let mut line = String::new();

    {
        let mut reader = BufReader::new(stream);
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            anyhow::bail!("client closed connection");
        }
    }

    Ok(parse_command(&line)?)
}

fn handle_conn(
    mut stream: TcpStream,
    cid: ClientId,
    ctx: &(dyn CommandContext + Send + Sync),
) -> anyhow::Result<()> {
    // парсинг команды
    let cmd = match extract_command(&mut stream) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!("ERR {e}\n");
            let _ = stream.write_all(msg.as_bytes());
            return Ok(());
        }
    };
    debug!("client {cid}: {cmd:?}");

    let mut reply = dispatch(&cmd, ctx);
    if !reply.ends_with('\n') {
        reply.push('\n');
    }

    stream.write_all(reply.as_bytes())?;
    stream.flush()?;
    stream.shutdown(std::net::Shutdown::Both).ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresher::RefreshOutcome;
    use price_core::{CatalogSnapshot, ExchangeRates, RateSource, load_catalog};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};

    fn connect_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();

        (client, server)
    }

    fn read_reply(mut client: TcpStream) -> String {
        client
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();
        let mut buf = Vec::new();
        let _ = client.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    }

    struct Offline;
    impl RateSource for Offline {
        fn fetch_rates(&self) -> ExchangeRates {
            ExchangeRates::fallback()
        }
    }

    struct StaticContext(Arc<CatalogSnapshot>);
    impl CommandContext for StaticContext {
        fn snapshot(&self) -> Arc<CatalogSnapshot> {
            self.0.clone()
        }
        fn request_refresh(&self) -> Option<RefreshOutcome> {
            None
        }
    }

    fn ctx() -> StaticContext {
        let csv = "Код,Номенклатура,Цена\nA1,Чехол,1000\n";
        StaticContext(Arc::new(load_catalog(csv.as_bytes(), &Offline).unwrap()))
    }

    #[test]
    fn handle_conn_writes_err_on_unknown_command() {
        let (mut client, server) = connect_pair();
        client.write_all(b"/GARBAGE\n").unwrap();

        handle_conn(server, 1, &ctx()).unwrap();

        let reply = read_reply(client);
        assert!(
            reply.starts_with("ERR "),
            "expected ERR reply, got: {reply:?}"
        );
        assert!(
            reply.ends_with('\n'),
            "reply must end with newline: {reply:?}"
        );
    }

    #[test]
    fn handle_conn_answers_search() {
        let (mut client, server) = connect_pair();
        client.write_all("чехол\n".as_bytes()).unwrap();

        handle_conn(server, 1, &ctx()).unwrap();

        let reply = read_reply(client);
        assert!(reply.contains("Код: A1"), "{reply}");
        assert!(reply.contains("35.00 BYN"), "{reply}");
        assert!(reply.ends_with('\n'));
    }

    #[test]
    fn handle_conn_answers_update_failure_as_plain_text() {
        let (mut client, server) = connect_pair();
        client.write_all(b"/update\n").unwrap();

        handle_conn(server, 1, &ctx()).unwrap();

        assert_eq!(
            read_reply(client),
            format!("{}\n", crate::commands::REFRESH_FAILED)
        );
    }

    #[test]
    fn handle_conn_writes_err_on_eof_before_command() {
        let (client, server) = connect_pair();
        drop(client); // клиент сразу закрыл соединение => EOF

        // просто проверяем, что не паникует и корректно завершается
        handle_conn(server, 1, &ctx()).unwrap();
    }

    #[test]
    fn listener_serves_and_stops_on_shutdown() {
        // свободный порт: bind на :0 и сразу отпускаем
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));

        let ctx: Arc<dyn CommandContext + Send + Sync> = Arc::new(ctx());
        let sd = shutdown.clone();
        let h = thread::spawn(move || run_tcp_listener(addr, ctx, sd));

        // ждём, пока listener поднимется
        let mut client = None;
        for _ in 0..50 {
            if let Ok(c) = TcpStream::connect(addr) {
                client = Some(c);
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        let mut client = client.expect("listener did not start");
        client.write_all(b"/start\n").unwrap();
        assert!(read_reply(client).starts_with("Привет!"));

        shutdown.store(true, Ordering::Relaxed);
        h.join().unwrap().unwrap();
    }
}
