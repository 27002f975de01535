use crate::error::ProtocolError;

/// Приветствие
pub const CMD_START: &str = "/start";
/// Обновление прайса
pub const CMD_UPDATE: &str = "/update";
/// Текущие курсы
pub const CMD_RATE: &str = "/rate";

/// Команда, пришедшая одной строкой
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Приветствие и подсказка по командам
    Start,
    /// Перекачать прайс и курсы
    Update,
    /// Показать курсы текущего среза
    Rate,
    /// Любой текст без `/` — поисковый запрос
    Search(String),
}

/// Парсит одну строку протокола:
/// "/start", "/update", "/rate" или произвольный текст запроса.
pub fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::EmptyCommand);
    }

    if !line.starts_with('/') {
        return Ok(Command::Search(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let cmd = parts.next().ok_or(ProtocolError::EmptyCommand)?;

    // в чатах команда может прийти как "/rate@bot_name"
    let cmd = cmd.split('@').next().unwrap_or(cmd);

    let parsed = match cmd {
        CMD_START => Command::Start,
        CMD_UPDATE => Command::Update,
        CMD_RATE => Command::Rate,
        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };

    if parts.next().is_some() {
        return Err(ProtocolError::ExtraArgs);
    }

    Ok(parsed)
}

/// Обратная операция для клиента: команда -> строка протокола (с '\n')
pub fn format_command_line(cmd: &Command) -> String {
    match cmd {
        Command::Start => format!("{CMD_START}\n"),
        Command::Update => format!("{CMD_UPDATE}\n"),
        Command::Rate => format!("{CMD_RATE}\n"),
        // переводы строк внутри запроса сломали бы построчный протокол
        Command::Search(text) => format!("{}\n", text.replace(['\r', '\n'], " ")),
    }
}
