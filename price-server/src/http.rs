use anyhow::Context;
use std::time::Duration;

const USER_AGENT: &str = concat!("price-server/", env!("CARGO_PKG_VERSION"));

/// Общий HTTP клиент для курсов и Яндекс.Диска.
///
/// Таймаут обязателен: зависший запрос не должен подвешивать обновление прайса.
pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("build HTTP client")
}

/// Маленький HTTP сервер на loopback для тестов: отдаёт заранее заданные ответы по пути.
#[cfg(test)]
pub(crate) mod stub {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[derive(Clone)]
    pub(crate) struct Route {
        pub(crate) path: &'static str,
        pub(crate) status: u16,
        pub(crate) body: Vec<u8>,
    }

    impl Route {
        pub(crate) fn ok(path: &'static str, body: impl Into<Vec<u8>>) -> Self {
            Self {
                path,
                status: 200,
                body: body.into(),
            }
        }

        pub(crate) fn status(path: &'static str, status: u16) -> Self {
            Self {
                path,
                status,
                body: Vec::new(),
            }
        }
    }

    pub(crate) struct Stub {
        pub(crate) base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl Stub {
        /// Все запрошенные request-target (путь + query) по порядку
        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    pub(crate) fn serve(routes: Vec<Route>) -> Stub {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        // поток живёт до конца тестового процесса
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };

                let target = {
                    let mut reader = BufReader::new(&mut stream);
                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).is_err() {
                        continue;
                    }
                    // дочитываем заголовки до пустой строки
                    loop {
                        let mut line = String::new();
                        match reader.read_line(&mut line) {
                            Ok(0) | Err(_) => break,
                            Ok(_) if line == "\r\n" || line == "\n" => break,
                            Ok(_) => {}
                        }
                    }
                    request_line
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string()
                };
                let path = target.split('?').next().unwrap_or("/").to_string();
                seen.lock().unwrap().push(target);

                let (status, body) = routes
                    .iter()
                    .find(|r| r.path == path)
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, Vec::new()));

                let head = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Stub { base_url, requests }
    }

    /// Клиент для походов в заглушку: без системного прокси из окружения
    pub(crate) fn client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap()
    }

    /// Адрес, на котором гарантированно никто не слушает
    pub(crate) fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}
