use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

/// Ошибки скачивания прайса
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    /// Сеть/таймаут
    #[error("{stage}: network error: {source}")]
    Network {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Хост ответил не-2xx
    #[error("{stage}: HTTP {status}")]
    Status {
        stage: &'static str,
        status: reqwest::StatusCode,
    },

    /// В ответе на resolve нет ссылки
    #[error("resolve: bad response: {0}")]
    BadResolve(String),
}

/// Откуда берутся сырые байты прайса
pub(crate) trait CatalogSource: Send + Sync {
    fn fetch_catalog_bytes(&self) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct DownloadLink {
    href: String,
}

/// Скачивает прайс по публичной ссылке Яндекс.Диска:
/// сначала получает прямую ссылку, затем сам файл.
pub(crate) struct YandexDiskFetcher {
    client: reqwest::blocking::Client,
    resolve_url: String,
    public_link: String,
}

impl YandexDiskFetcher {
    pub(crate) fn new(
        client: reqwest::blocking::Client,
        resolve_url: impl Into<String>,
        public_link: impl Into<String>,
    ) -> Self {
        Self {
            client,
            resolve_url: resolve_url.into(),
            public_link: public_link.into(),
        }
    }

    fn resolve(&self) -> Result<String, FetchError> {
        let stage = "resolve";
        let resp = self
            .client
            .get(&self.resolve_url)
            .query(&[("public_key", self.public_link.as_str())])
            .send()
            .map_err(|source| FetchError::Network { stage, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { stage, status });
        }

        let link: DownloadLink = resp
            .json()
            .map_err(|e| FetchError::BadResolve(e.to_string()))?;

        if link.href.trim().is_empty() {
            return Err(FetchError::BadResolve("empty href".into()));
        }

        Ok(link.href)
    }

    fn download(&self, href: &str) -> Result<Vec<u8>, FetchError> {
        let stage = "download";
        let resp = self
            .client
            .get(href)
            .send()
            .map_err(|source| FetchError::Network { stage, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { stage, status });
        }

        let bytes = resp
            .bytes()
            .map_err(|source| FetchError::Network { stage, source })?;

        Ok(bytes.to_vec())
    }
}

impl CatalogSource for YandexDiskFetcher {
    fn fetch_catalog_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let href = self.resolve()?;
        debug!("catalog download link resolved: {href}");

        let bytes = self.download(&href)?;
        info!("catalog downloaded: {} bytes", bytes.len());

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::{Route, client, dead_url, serve};

    const LINK: &str = "https://disk.yandex.ru/i/abc";

    fn fetcher(resolve_url: String) -> YandexDiskFetcher {
        YandexDiskFetcher::new(
            client(),
            resolve_url,
            LINK,
        )
    }

    #[test]
    fn resolves_link_then_downloads_bytes() {
        let files = serve(vec![Route::ok("/price.xlsx", "Код,Номенклатура,Цена\n")]);
        let href = format!(r#"{{"href":"{}/price.xlsx","method":"GET"}}"#, files.base_url);
        let api = serve(vec![Route::ok("/resolve", href)]);

        let bytes = fetcher(format!("{}/resolve", api.base_url))
            .fetch_catalog_bytes()
            .unwrap();

        assert_eq!(bytes, "Код,Номенклатура,Цена\n".as_bytes());

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert!(
            requests[0].starts_with("/resolve?public_key="),
            "unexpected request: {}",
            requests[0]
        );
        assert_eq!(files.requests(), vec!["/price.xlsx".to_string()]);
    }

    #[test]
    fn resolve_failure_is_an_error() {
        let api = serve(vec![Route::status("/resolve", 404)]);
        let err = fetcher(format!("{}/resolve", api.base_url))
            .fetch_catalog_bytes()
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { stage: "resolve", .. }));
    }

    #[test]
    fn download_failure_is_an_error() {
        let files = serve(vec![Route::status("/price.xlsx", 500)]);
        let href = format!(r#"{{"href":"{}/price.xlsx"}}"#, files.base_url);
        let api = serve(vec![Route::ok("/resolve", href)]);

        let err = fetcher(format!("{}/resolve", api.base_url))
            .fetch_catalog_bytes()
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { stage: "download", .. }));
    }

    #[test]
    fn resolve_without_href_is_an_error() {
        let api = serve(vec![Route::ok("/resolve", r#"{"error":"DiskNotFoundError"}"#)]);
        let err = fetcher(format!("{}/resolve", api.base_url))
            .fetch_catalog_bytes()
            .unwrap_err();

        assert!(matches!(err, FetchError::BadResolve(_)));
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        let err = fetcher(format!("{}/resolve", dead_url()))
            .fetch_catalog_bytes()
            .unwrap_err();

        assert!(matches!(err, FetchError::Network { stage: "resolve", .. }));
    }
}
