//! Текстовые ответы на команды. Всё, что видит пользователь, собирается здесь:
//! сырые ошибки наружу не уходят.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use price_core::{CatalogRow, CatalogSnapshot, Command, RateOrigin, SearchResult, search};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::manager::{CatalogManager, CatalogOrigin};
use crate::refresher::{RefreshOutcome, RefreshQueue};

pub(crate) const NOT_FOUND: &str = "Товар не найден 😔";
pub(crate) const REFRESH_FAILED: &str = "❌ Не удалось обновить цены. Работаю со старым прайсом.";

/// Всё, что нужно для ответа на команду
pub(crate) trait CommandContext {
    fn snapshot(&self) -> Arc<CatalogSnapshot>;
    fn request_refresh(&self) -> Option<RefreshOutcome>;
}

pub(crate) struct ServerContext {
    pub(crate) manager: Arc<CatalogManager>,
    pub(crate) refresh: RefreshQueue,
    pub(crate) refresh_wait: Duration,
}

impl CommandContext for ServerContext {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.manager.current_snapshot()
    }

    fn request_refresh(&self) -> Option<RefreshOutcome> {
        self.refresh.request(self.refresh_wait)
    }
}

pub(crate) fn dispatch(cmd: &Command, ctx: &dyn CommandContext) -> String {
    match cmd {
        Command::Start => greet(),
        Command::Update => refresh_reply(ctx.request_refresh()),
        Command::Rate => rates_summary(&ctx.snapshot()),
        Command::Search(text) => search_reply(&ctx.snapshot(), text),
    }
}

pub(crate) fn greet() -> String {
    "Привет! Напиши название товара, номенклатуру или код — я покажу цену 📱\n\n\
     Также доступны команды:\n\
     /update - обновить цены с Яндекс.Диска\n\
     /rate - показать текущие курсы валют"
        .to_string()
}

pub(crate) fn refresh_reply(outcome: Option<RefreshOutcome>) -> String {
    match outcome {
        Some(RefreshOutcome::Updated(summary)) => {
            let mut out = format!("✅ Цены и курсы обновлены! Позиций: {}", summary.rows);
            if summary.origin == CatalogOrigin::Cached {
                out.push_str("\n⚠️ Яндекс.Диск недоступен, прайс взят из сохранённой копии");
            }
            if summary.rates.origin() == RateOrigin::Fallback {
                out.push_str("\n⚠️ Курсы НБ РБ недоступны, использованы резервные");
            }
            out
        }
        Some(RefreshOutcome::Failed(_)) | None => REFRESH_FAILED.to_string(),
    }
}

pub(crate) fn rates_summary(snapshot: &CatalogSnapshot) -> String {
    let rates = snapshot.rates();
    let mut out = String::from("💱 Текущие курсы НБ РБ:\n");
    let _ = writeln!(out, "💵 1 USD = {} BYN", rates.byn_per_usd().normalize());
    let _ = writeln!(out, "🇷🇺 1 RUB = {} BYN", fixed(rates.byn_per_rub(), 4));
    let _ = write!(out, "🔀 1 USD = {} RUB", fixed(rates.rub_per_usd(), 2));
    if rates.origin() == RateOrigin::Fallback {
        out.push_str("\n⚠️ Курсы НБ РБ недоступны, показаны резервные");
    }
    let _ = write!(
        out,
        "\n🕒 Прайс обновлён: {} UTC",
        snapshot.built_at().format("%d.%m.%Y %H:%M")
    );
    out
}

pub(crate) fn search_reply(snapshot: &CatalogSnapshot, query: &str) -> String {
    match search(snapshot, query) {
        SearchResult::Found(rows) => rows
            .iter()
            .map(|r| format_row(r))
            .collect::<Vec<_>>()
            .join("\n\n"),
        SearchResult::NotFound => NOT_FOUND.to_string(),
        SearchResult::QueryTooShort => format!(
            "Запрос слишком короткий: нужно хотя бы {} символа",
            price_core::MIN_QUERY_CHARS
        ),
    }
}

fn format_row(row: &CatalogRow) -> String {
    format!(
        "📦 {}\n🔢 Код: {}\n🇷🇺 Цена: {} RUB\n🇧🇾 Цена: {} BYN\n💵 Цена: {} USD",
        row.name,
        row.code,
        row.price_rub.normalize(),
        fixed(row.price_byn, 2),
        fixed(row.price_usd, 2),
    )
}

// округляем сами, форматтер только добивает нулями: 0.035 -> "0.0350"
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}
