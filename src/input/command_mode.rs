use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Refresh,
    Goto(NaiveDate),
    NewEvent(Option<String>),
    Export(Option<PathBuf>),
    Import(PathBuf),
    Theme(String),
    Help,
    Error(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };

    let parts: Vec<&str> = command_text.split_whitespace().collect();

    if parts.is_empty() {
        return Command::Error("Empty command".to_string());
    }

    let rest = || parts[1..].join(" ");

    match parts[0] {
        "q" | "quit" => Command::Quit,
        "w" | "write" | "refresh" => Command::Refresh,
        "help" => Command::Help,
        "goto" => {
            if parts.len() < 2 {
                Command::Error("goto requires a date argument".to_string())
            } else if let Ok(date) = NaiveDate::parse_from_str(parts[1], "%Y-%m-%d") {
                Command::Goto(date)
            } else {
                Command::Error(format!("Invalid date format: {}", parts[1]))
            }
        }
        "new" => {
            if parts.len() < 2 {
                Command::NewEvent(None)
            } else {
                Command::NewEvent(Some(rest()))
            }
        }
        "export" => {
            if parts.len() < 2 {
                Command::Export(None)
            } else {
                Command::Export(Some(PathBuf::from(rest())))
            }
        }
        "import" => {
            if parts.len() < 2 {
                Command::Error("import requires a file path".to_string())
            } else {
                Command::Import(PathBuf::from(rest()))
            }
        }
        "theme" => {
            if parts.len() < 2 {
                Command::Error("theme requires a theme name".to_string())
            } else {
                Command::Theme(parts[1].to_string())
            }
        }
        _ => Command::Error(format!("Unknown command: {}", parts[0])),
    }
}
