//! # price-core
//!
//! Доменные типы и чистая логика прайс-сервиса: разбор прайса,
//! пересчёт цен по курсам НБ РБ и поиск по позициям.
//!
//! Этот крейт содержит:
//!
//! - [`table`] — чтение xlsx/CSV прайса в "сырые" строки
//! - [`loader`] — сборка неизменяемого среза прайса [`CatalogSnapshot`]
//! - [`search`] — подстрочный поиск по коду, названию и его транслитерациям
//! - [`translit`] — транслитерация латиница <-> кириллица
//! - [`protocol`] — парсинг и форматирование текстовых команд
//! - [`types`] — доменные типы
//! - [`error`] — типы ошибок, которые возвращают компоненты `price-core`
//!
//! ## Быстрый пример: загрузка и поиск
//!
//! ```rust
//! use price_core::{ExchangeRates, RateSource, SearchResult, load_catalog, search};
//! use rust_decimal::Decimal;
//!
//! struct Offline;
//!
//! impl RateSource for Offline {
//!     fn fetch_rates(&self) -> ExchangeRates {
//!         ExchangeRates::fallback()
//!     }
//! }
//!
//! let csv = "Код,Номенклатура,Цена\nA1,Самсунг Galaxy,1000\n";
//! let snapshot = load_catalog(csv.as_bytes(), &Offline).unwrap();
//!
//! match search(&snapshot, "samsung") {
//!     SearchResult::Found(rows) => {
//!         assert_eq!(rows[0].code, "A1");
//!         assert_eq!(rows[0].price_byn, Decimal::new(35, 0));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! ## Пример: команды
//!
//! ```rust
//! use price_core::protocol::{parse_command, Command};
//!
//! assert_eq!(parse_command("/rate").unwrap(), Command::Rate);
//! assert_eq!(
//!     parse_command("чехол").unwrap(),
//!     Command::Search("чехол".to_string())
//! );
//! ```
//!
//! ## Дизайн
//!
//! `price-core` не ходит в сеть и не держит состояние: HTTP, кэш файла и
//! подмена среза живут в `price-server`. Курсы приходят через трейт
//! [`RateSource`], поэтому загрузчик тестируется без сети.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Текстовый протокол команд (`/start`, `/update`, `/rate`, запрос).
pub mod protocol;

/// Чтение табличных данных прайса.
pub mod table;

/// Сборка среза прайса.
pub mod loader;

/// Поиск по срезу.
pub mod search;

/// Транслитерация названий.
pub mod translit;

/// Доменные типы (позиция, курсы, срез).
pub mod types;

/// Ошибки `price-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{FALLBACK_BYN_PER_RUB, FALLBACK_BYN_PER_USD, MIN_QUERY_CHARS};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::{ParseError, PriceCoreError, ProtocolError, RateError};
pub use crate::loader::load_catalog;
pub use crate::protocol::Command;
pub use crate::search::{SearchResult, search};
pub use crate::types::{CatalogRow, CatalogSnapshot, ExchangeRates, RateOrigin, RateSource};
