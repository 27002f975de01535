use std::time::Duration;

pub(crate) const TCP_BIND_ADDR: &str = "0.0.0.0:5555";

/// Публичная ссылка на прайс на Яндекс.Диске
pub(crate) const CATALOG_PUBLIC_LINK: &str = "https://disk.yandex.ru/i/lSuHvo09BlUOqA";

/// Endpoint, который превращает публичную ссылку в прямую ссылку на скачивание
pub(crate) const DISK_RESOLVE_URL: &str =
    "https://cloud-api.yandex.net/v1/disk/public/resources/download";

/// База API курсов НБ РБ: дальше идёт `/USD?parammode=2`
pub(crate) const NBRB_RATES_URL: &str = "https://www.nbrb.by/api/exrates/rates";

/// Последний удачно скачанный прайс
pub(crate) const CACHE_FILE: &str = "price.xlsx";

/// Таймаут на любой HTTP запрос (курсы, Яндекс.Диск)
pub(crate) const HTTP_TIMEOUT_S: u64 = 15;

/// HTTP запросов в худшем случае на одно обновление:
/// курсы USD и RUB, resolve ссылки, скачивание файла
pub(crate) const HTTP_CALLS_PER_REFRESH: u32 = 4;

/// Запас сверх сетевых таймаутов на разбор таблицы и пересчёт
pub(crate) const REFRESH_WAIT_MARGIN: Duration = Duration::from_secs(10);

/// Тик фоновых циклов: как часто проверяем флаг shutdown
pub(crate) const WORKER_TICK: Duration = Duration::from_millis(200);

pub(crate) type ClientId = u64;

/// Сколько сессия ждёт результата обновления прайса: дольше, чем могут
/// длиться все HTTP запросы обновления подряд
pub(crate) fn refresh_wait(http_timeout: Duration) -> Duration {
    http_timeout * HTTP_CALLS_PER_REFRESH + REFRESH_WAIT_MARGIN
}
