use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, RwLock};

use log::{info, warn};
use price_core::{CatalogSnapshot, ExchangeRates, ParseError, RateSource, load_catalog};
use thiserror::Error;

use crate::cache::RawCache;
use crate::fetcher::{CatalogSource, FetchError};

#[derive(Debug, Error)]
pub(crate) enum RefreshError {
    /// Ни свежего файла, ни копии на диске
    #[error("no catalog data: download failed ({fetch}); cache unavailable ({cache})")]
    Unavailable {
        fetch: FetchError,
        #[source]
        cache: io::Error,
    },

    /// Файл получен, но таблица битая
    #[error("catalog is malformed: {0}")]
    Parse(#[from] ParseError),

    /// Таблица разобралась, но ни одной полной позиции в ней нет
    #[error("catalog has no complete rows ({0:?})")]
    Empty(CatalogOrigin),
}

/// Откуда взят прайс для нового среза
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CatalogOrigin {
    Downloaded,
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RefreshSummary {
    pub(crate) rows: usize,
    pub(crate) origin: CatalogOrigin,
    pub(crate) rates: ExchangeRates,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} origin={:?} rates=[{}]",
            self.rows, self.origin, self.rates
        )
    }
}

/// Владелец текущего среза прайса.
///
/// Читатели берут `Arc` на срез под read-lock'ом (только копия указателя),
/// поэтому никогда не ждут сборку нового среза. `refresh()` собирает срез
/// целиком без блокировок и лишь затем подменяет указатель; параллельные
/// `refresh()` выстраиваются в очередь на `refresh_lock`.
pub(crate) struct CatalogManager {
    current: RwLock<Arc<CatalogSnapshot>>,
    refresh_lock: Mutex<()>,
    source: Box<dyn CatalogSource>,
    rates: Box<dyn RateSource + Send + Sync>,
    cache: RawCache,
}

impl CatalogManager {
    /// Собирает первый срез. Ошибка здесь фатальна: без прайса сервер не стартует.
    pub(crate) fn bootstrap(
        source: Box<dyn CatalogSource>,
        rates: Box<dyn RateSource + Send + Sync>,
        cache: RawCache,
    ) -> Result<Self, RefreshError> {
        let (snapshot, summary) = build_snapshot(source.as_ref(), rates.as_ref(), &cache)?;
        info!("initial catalog ready: {summary}");

        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            refresh_lock: Mutex::new(()),
            source,
            rates,
            cache,
        })
    }

    /// Последний удачно собранный срез
    pub(crate) fn current_snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = match self.current.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(), // продолжаем, несмотря на poison
        };
        Arc::clone(&guard)
    }

    /// Скачать -> разобрать -> подменить срез. При ошибке текущий срез не трогается.
    pub(crate) fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        let _serial = match self.refresh_lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        let (snapshot, summary) =
            build_snapshot(self.source.as_ref(), self.rates.as_ref(), &self.cache)?;

        let snapshot = Arc::new(snapshot);
        {
            let mut current = match self.current.write() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            *current = snapshot;
        }

        info!("catalog refreshed: {summary}");
        Ok(summary)
    }
}

fn build_snapshot(
    source: &dyn CatalogSource,
    rates: &(dyn RateSource + Send + Sync),
    cache: &RawCache,
) -> Result<(CatalogSnapshot, RefreshSummary), RefreshError> {
    let (snapshot, origin) = match source.fetch_catalog_bytes() {
        Ok(bytes) => {
            let snapshot = load_catalog(&bytes, rates)?;
            if snapshot.is_empty() {
                return Err(RefreshError::Empty(CatalogOrigin::Downloaded));
            }
            // в кэш кладём только то, что разобралось
            if let Err(e) = cache.store(&bytes) {
                warn!("failed to store catalog cache {:?}: {e}", cache.path());
            }
            (snapshot, CatalogOrigin::Downloaded)
        }
        Err(fetch) => {
            warn!(
                "catalog download failed: {fetch}; falling back to {:?}",
                cache.path()
            );
            let bytes = cache
                .load()
                .map_err(|cache| RefreshError::Unavailable { fetch, cache })?;
            let snapshot = load_catalog(&bytes, rates)?;
            if snapshot.is_empty() {
                return Err(RefreshError::Empty(CatalogOrigin::Cached));
            }
            (snapshot, CatalogOrigin::Cached)
        }
    };

    let summary = RefreshSummary {
        rows: snapshot.len(),
        origin,
        rates: *snapshot.rates(),
    };
    Ok((snapshot, summary))
}
