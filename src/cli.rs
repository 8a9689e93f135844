use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    process::{Command, Stdio},
};

use chrono::{Local, NaiveDate};

use courtesy_cal::{
    calendar::{ChecklistItem, CourtesyEvent, events_on, format_date},
    spreadsheet,
    storage::config::Config,
    sync::sync_engine::StoreClient,
};

use crate::tui::{SessionOptions, connect};

pub const USAGE: &str = "Usage: courtesy-cal [--offline] [--token TOKEN] [--sample] \
[--agenda [YYYY-MM-DD] | --export [DIR] | --import FILE]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Tui,
    Agenda(NaiveDate),
    Export(Option<PathBuf>),
    Import(PathBuf),
    Help,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub mode: CliMode,
    pub options: SessionOptions,
}

pub fn parse_cli_mode() -> Result<CliArgs, String> {
    parse_args(env::args().skip(1), Local::now().date_naive())
}

fn parse_args<I>(args: I, today: NaiveDate) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = SessionOptions::default();
    let mut mode = CliMode::Tui;
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--offline" => options.offline = true,
            "--sample" => options.sample = true,
            "--token" => {
                let token = args.next().ok_or("--token needs a value")?;
                options.token = Some(token);
            }
            "--agenda" => {
                let date = match args.next_if(|next| !next.starts_with("--")) {
                    Some(date_str) => NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", date_str))?,
                    None => today,
                };
                set_mode(&mut mode, CliMode::Agenda(date))?;
            }
            "--export" => {
                let dir = args.next_if(|next| !next.starts_with("--")).map(PathBuf::from);
                set_mode(&mut mode, CliMode::Export(dir))?;
            }
            "--import" => {
                let path = args.next().ok_or("--import needs a file")?;
                set_mode(&mut mode, CliMode::Import(PathBuf::from(path)))?;
            }
            "--help" | "-h" => return Ok(CliArgs { mode: CliMode::Help, options }),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(CliArgs { mode, options })
}

fn set_mode(current: &mut CliMode, next: CliMode) -> Result<(), String> {
    if *current != CliMode::Tui {
        return Err("Only one headless mode may be given".to_string());
    }
    *current = next;
    Ok(())
}

/// Connects and signs in without a terminal UI. `None` when there is no
/// identity to act for.
async fn headless_store(config: &Config, options: &SessionOptions) -> Result<Option<StoreClient>, io::Error> {
    let backend = connect(config, options.offline)?;
    match backend.sign_in(config, options.token.as_deref()).await {
        Some(identity) => {
            tracing::info!("Headless session for {}", identity.uid);
            Ok(Some(backend.store))
        }
        None => {
            eprintln!("Not signed in. Check {} or use --offline.", Config::config_path().display());
            Ok(None)
        }
    }
}

fn load_config() -> Result<Config, io::Error> {
    Config::load_or_create().map_err(|e| io::Error::other(e.to_string()))
}

pub async fn run_agenda_mode(date: NaiveDate, options: &SessionOptions) -> Result<(), io::Error> {
    let config = load_config()?;
    let Some(store) = headless_store(&config, options).await? else {
        return Ok(());
    };

    let events = match store.snapshot().await {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Failed to fetch events: {}", e);
            Vec::new()
        }
    };

    let day = events_on(&events, &format_date(date));
    let agenda = format_agenda_text(date, &day);
    display_with_pager(&agenda)
}

pub async fn run_export_mode(dir: Option<PathBuf>, options: &SessionOptions) -> Result<(), io::Error> {
    let config = load_config()?;
    let Some(store) = headless_store(&config, options).await? else {
        return Ok(());
    };

    let events = store
        .snapshot()
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;
    let dir = dir.unwrap_or_else(|| config.export.directory.clone());

    match spreadsheet::export_events(&events, &dir, Local::now().date_naive()) {
        Ok(Some(path)) => println!("Exported {} events to {}", events.len(), path.display()),
        Ok(None) => println!("내보낼 일정이 없습니다"),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            eprintln!("Export failed: {}", e);
        }
    }
    Ok(())
}

pub async fn run_import_mode(path: PathBuf, options: &SessionOptions) -> Result<(), io::Error> {
    let config = load_config()?;
    let Some(store) = headless_store(&config, options).await? else {
        return Ok(());
    };

    match spreadsheet::import_file(&store, &path, Local::now().date_naive()).await {
        Ok(report) => println!("{}", report.message()),
        Err(e) => {
            tracing::error!("Import of {} failed: {}", path.display(), e);
            eprintln!("Import failed: {}", e);
        }
    }
    Ok(())
}

fn format_agenda_text(date: NaiveDate, events: &[&CourtesyEvent]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("경조사 일정: {}", date.format("%Y-%m-%d (%a)")));
    lines.push(String::new());

    if events.is_empty() {
        lines.push("No events".to_string());
    } else {
        for event in events {
            lines.push(format!("- {}", build_agenda_line(event)));
        }
    }

    lines.join("\n")
}

fn build_agenda_line(event: &CourtesyEvent) -> String {
    let checks: Vec<String> = ChecklistItem::ALL
        .iter()
        .map(|item| {
            let mark = if event.checklist.get(*item) { 'x' } else { ' ' };
            format!("[{}] {}", mark, item.label())
        })
        .collect();

    let mut line = format!(
        "[{}] {}  {}  ({}/3)",
        event.event_type.label(),
        event.company_name,
        checks.join(" "),
        event.done_count()
    );
    if event.is_completed {
        line.push_str(" 완료");
    }
    if !event.note.is_empty() {
        line.push_str(&format!(" - {}", event.note));
    }
    line
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let Some(cmd) = parts.next() else {
        println!("{text}");
        return Ok(());
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtesy_cal::calendar::{Checklist, EventType};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn parse(args: &[&str]) -> Result<CliArgs, String> {
        parse_args(args.iter().map(|s| s.to_string()), today())
    }

    #[test]
    fn no_arguments_runs_the_terminal_ui() {
        let parsed = parse(&[]).unwrap();
        assert_eq!(parsed.mode, CliMode::Tui);
        assert!(!parsed.options.offline);
        assert_eq!(parsed.options.token, None);
    }

    #[test]
    fn agenda_defaults_to_today() {
        assert_eq!(parse(&["--agenda"]).unwrap().mode, CliMode::Agenda(today()));
        assert_eq!(
            parse(&["--agenda", "--offline"]).unwrap().mode,
            CliMode::Agenda(today())
        );
    }

    #[test]
    fn agenda_accepts_an_iso_date() {
        let parsed = parse(&["--agenda", "2024-12-25", "--offline"]).unwrap();
        assert_eq!(
            parsed.mode,
            CliMode::Agenda(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap())
        );
        assert!(parsed.options.offline);
    }

    #[test]
    fn agenda_rejects_other_date_formats() {
        assert!(parse(&["--agenda", "2024/12/25"]).is_err());
    }

    #[test]
    fn export_directory_is_optional() {
        assert_eq!(parse(&["--export"]).unwrap().mode, CliMode::Export(None));
        assert_eq!(
            parse(&["--export", "/tmp/out"]).unwrap().mode,
            CliMode::Export(Some(PathBuf::from("/tmp/out")))
        );
    }

    #[test]
    fn import_requires_a_file() {
        assert!(parse(&["--import"]).is_err());
        assert_eq!(
            parse(&["--import", "list.xlsx"]).unwrap().mode,
            CliMode::Import(PathBuf::from("list.xlsx"))
        );
    }

    #[test]
    fn token_and_sample_flags_are_collected() {
        let parsed = parse(&["--token", "abc", "--sample"]).unwrap();
        assert_eq!(parsed.options.token.as_deref(), Some("abc"));
        assert!(parsed.options.sample);
        assert!(parse(&["--token"]).is_err());
    }

    #[test]
    fn only_one_headless_mode_is_allowed() {
        assert!(parse(&["--agenda", "--export"]).is_err());
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert_eq!(parse(&["--bogus"]).unwrap_err(), "Unknown argument: --bogus");
    }

    #[test]
    fn empty_agenda_says_no_events() {
        let text = format_agenda_text(today(), &[]);
        assert!(text.ends_with("No events"));
    }

    #[test]
    fn agenda_line_shows_checklist_and_progress() {
        let event = CourtesyEvent {
            id: "e1".to_string(),
            company_name: "ACME".to_string(),
            event_type: EventType::Funeral,
            date: "2024-05-10".to_string(),
            note: "본사".to_string(),
            checklist: Checklist::default().with(ChecklistItem::Wreath, true),
            is_completed: false,
            created_at: None,
        };

        let line = build_agenda_line(&event);
        assert!(line.starts_with("[장례] ACME"));
        assert!(line.contains("[x] 화환"));
        assert!(line.contains("(1/3)"));
        assert!(line.ends_with("- 본사"));
        assert!(!line.contains("완료"));
    }
}
