use rust_decimal::Decimal;
use thiserror::Error;

/// Верхнеуровневый тип ошибок крейта
#[derive(Debug, Error)]
pub enum PriceCoreError {
    /// Ошибки протокола
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Ошибки разбора прайса
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Ошибки курсов валют
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Ошибки протокола
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// пустая команда
    #[error("empty command")]
    EmptyCommand,

    /// Неизвестная команда
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Лишние аргументы
    #[error("unexpected extra arguments")]
    ExtraArgs,
}

/// Ошибки разбора табличных данных.
///
/// Любая из них делает невалидной всю таблицу целиком.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Пустой входной буфер
    #[error("table is empty")]
    Empty,

    /// Не удалось открыть xlsx книгу
    #[error("xlsx error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// В книге нет ни одного листа
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// Ошибка разбора CSV
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Не нашли обязательную колонку в заголовке
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    /// Цена не число
    #[error("invalid price {value:?} in row {row}")]
    InvalidPrice { row: usize, value: String },
}

/// Ошибки курсов валют
#[derive(Debug, Error)]
pub enum RateError {
    /// Курс должен быть строго положительным
    #[error("rate must be positive, got {0}")]
    NonPositive(Decimal),

    /// Масштаб котировки должен быть положительным
    #[error("rate scale must be positive, got {0}")]
    BadScale(u32),

    /// Нет нужного поля в ответе
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Поле есть, но значение не разобрать
    #[error("malformed field {field}: {value}")]
    Malformed { field: &'static str, value: String },

    /// Ошибка транспорта (HTTP, таймаут, статус)
    #[error("rate feed unavailable: {0}")]
    Unavailable(String),
}
