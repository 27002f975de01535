use rust_decimal::Decimal;

/// Резервный курс: сколько BYN за 1 USD (ориентир по НБ РБ, порядок величины 2024-2025)
pub const FALLBACK_BYN_PER_USD: Decimal = Decimal::from_parts(32, 0, 0, false, 1);

/// Резервный курс: сколько BYN за 1 RUB (НБ РБ котирует ~3.5 BYN за 100 RUB)
pub const FALLBACK_BYN_PER_RUB: Decimal = Decimal::from_parts(35, 0, 0, false, 3);

/// Знаков после запятой у пересчитанных цен
pub const PRICE_DECIMALS: u32 = 2;

/// Минимальная длина запроса (в символах, после trim)
pub const MIN_QUERY_CHARS: usize = 2;

/// Заголовки обязательных колонок прайса
pub const COLUMN_CODE: &str = "Код";
pub const COLUMN_NAME: &str = "Номенклатура";
pub const COLUMN_PRICE: &str = "Цена";
