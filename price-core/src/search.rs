use crate::constants::MIN_QUERY_CHARS;
use crate::types::{CatalogRow, CatalogSnapshot};

/// Заранее приведённые к нижнему регистру поля одной строки
#[derive(Debug)]
struct IndexEntry {
    name: String,
    name_cyrillic: String,
    name_latin: String,
}

/// Индекс для подстрочного поиска, строится один раз вместе со срезом.
///
/// `entries[i]` соответствует `rows[i]` среза.
#[derive(Debug)]
pub(crate) struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    pub(crate) fn build(rows: &[CatalogRow]) -> Self {
        let entries = rows
            .iter()
            .map(|r| IndexEntry {
                name: r.name.to_lowercase(),
                name_cyrillic: r.name_cyrillic.to_lowercase(),
                name_latin: r.name_latin.to_lowercase(),
            })
            .collect();
        Self { entries }
    }
}

/// Результат поиска
#[derive(Debug, PartialEq)]
pub enum SearchResult<'a> {
    /// Совпадения в порядке прайса
    Found(Vec<&'a CatalogRow>),
    NotFound,
    /// Пустой или слишком короткий запрос: ничего не ищем
    QueryTooShort,
}

/// Ищет запрос подстрокой в названии (и его транслитерациях) без учёта
/// регистра и в коде с учётом регистра.
pub fn search<'a>(snapshot: &'a CatalogSnapshot, query: &str) -> SearchResult<'a> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return SearchResult::QueryTooShort;
    }

    let lowered = query.to_lowercase();
    let index = snapshot.index();

    let found: Vec<&CatalogRow> = snapshot
        .rows()
        .iter()
        .zip(index.entries.iter())
        .filter(|(row, e)| {
            e.name.contains(&lowered)
                || e.name_cyrillic.contains(&lowered)
                || e.name_latin.contains(&lowered)
                || row.code.contains(query)
        })
        .map(|(row, _)| row)
        .collect();

    if found.is_empty() {
        SearchResult::NotFound
    } else {
        SearchResult::Found(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translit::{to_cyrillic, to_latin};
    use crate::types::ExchangeRates;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn row(code: &str, name: &str) -> CatalogRow {
        CatalogRow {
            code: code.to_string(),
            name: name.to_string(),
            price_rub: dec!(100),
            name_cyrillic: to_cyrillic(name),
            name_latin: to_latin(name),
            price_byn: dec!(3.5),
            price_usd: dec!(1.09),
        }
    }

    fn snapshot(rows: Vec<CatalogRow>) -> CatalogSnapshot {
        CatalogSnapshot::new(rows, ExchangeRates::fallback(), Utc::now())
    }

    fn codes(result: SearchResult<'_>) -> Vec<String> {
        match result {
            SearchResult::Found(rows) => rows.iter().map(|r| r.code.clone()).collect(),
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let s = snapshot(vec![row("1", "Чехол Samsung"), row("2", "Кабель USB")]);
        assert_eq!(codes(search(&s, "ЧЕХОЛ")), vec!["1"]);
        assert_eq!(codes(search(&s, "usb")), vec!["2"]);
    }

    #[test]
    fn matches_through_transliteration_both_ways() {
        let s = snapshot(vec![row("1", "Самсунг A55"), row("2", "Xiaomi Redmi")]);

        // латиницей по кириллическому названию
        assert_eq!(codes(search(&s, "samsung")), vec!["1"]);
        // кириллицей по латинскому названию
        assert_eq!(codes(search(&s, "редми")), vec!["2"]);
    }

    #[test]
    fn code_match_is_case_sensitive() {
        let s = snapshot(vec![row("ABC123", "Зарядка")]);

        assert_eq!(search(&s, "abc"), SearchResult::NotFound);
        assert_eq!(codes(search(&s, "ABC")), vec!["ABC123"]);
        assert_eq!(codes(search(&s, "C12")), vec!["ABC123"]);
    }

    #[test]
    fn keeps_catalog_order_and_duplicates() {
        let s = snapshot(vec![
            row("7", "Стекло защитное"),
            row("5", "Кабель"),
            row("7", "Стекло матовое"),
        ]);

        assert_eq!(codes(search(&s, "стекло")), vec!["7", "7"]);
        assert_eq!(codes(search(&s, "Стекло")), vec!["7", "7"]);
    }

    #[test]
    fn empty_and_short_queries_match_nothing() {
        let s = snapshot(vec![row("1", "Кабель")]);

        assert_eq!(search(&s, ""), SearchResult::QueryTooShort);
        assert_eq!(search(&s, "   "), SearchResult::QueryTooShort);
        assert_eq!(search(&s, " к "), SearchResult::QueryTooShort);
    }

    #[test]
    fn query_is_trimmed() {
        let s = snapshot(vec![row("1", "Кабель")]);
        assert_eq!(codes(search(&s, "  кабель \n")), vec!["1"]);
    }

    #[test]
    fn no_match_is_not_found() {
        let s = snapshot(vec![row("1", "Кабель")]);
        assert_eq!(search(&s, "наушники"), SearchResult::NotFound);
    }
}
