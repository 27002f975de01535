use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::error::ParseError;
use crate::table::{RawRow, read_table};
use crate::translit::{to_cyrillic, to_latin};
use crate::types::{CatalogRow, CatalogSnapshot, ExchangeRates, RateSource};

/// Собирает новый срез прайса из сырых байт.
///
/// Порядок: разбор таблицы -> отбрасывание неполных строк -> нормализация
/// и транслитерация -> запрос курсов -> пересчёт цен. Курсы запрашиваются
/// только если таблица разобралась: битый файл не тратит запрос к НБ РБ.
pub fn load_catalog(
    bytes: &[u8],
    rate_source: &dyn RateSource,
) -> Result<CatalogSnapshot, ParseError> {
    let raw = read_table(bytes)?;
    let total = raw.len();

    let complete: Vec<(String, String, Decimal)> =
        raw.into_iter().filter_map(complete_row).collect();

    let dropped = total - complete.len();
    if dropped > 0 {
        debug!("dropped {dropped} incomplete rows of {total}");
    }

    let rates = rate_source.fetch_rates();
    let rows = complete
        .into_iter()
        .map(|(code, name, price)| build_row(code, name, price, &rates))
        .collect::<Vec<_>>();

    info!("catalog loaded: {} rows, rates: {rates}", rows.len());

    Ok(CatalogSnapshot::new(rows, rates, Utc::now()))
}

// строка попадает в прайс только целиком: код, название и цена
fn complete_row(row: RawRow) -> Option<(String, String, Decimal)> {
    let code = normalize(row.code?)?;
    let name = normalize(row.name?)?;
    Some((code, name, row.price?))
}

fn normalize(s: String) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn build_row(
    code: String,
    name: String,
    price_rub: Decimal,
    rates: &ExchangeRates,
) -> CatalogRow {
    let (price_byn, price_usd) = rates.convert(price_rub);
    CatalogRow {
        name_cyrillic: to_cyrillic(&name),
        name_latin: to_latin(&name),
        code,
        name,
        price_rub,
        price_byn,
        price_usd,
    }
}
