use std::io;

mod cli;
use cli::{CliMode, USAGE, parse_cli_mode, run_agenda_mode, run_export_mode, run_import_mode};
mod tui;
use tui::run_tui;

use courtesy_cal::storage::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    setup_logging();

    let args = match parse_cli_mode() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    match args.mode {
        CliMode::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliMode::Agenda(date) => run_agenda_mode(date, &args.options).await,
        CliMode::Export(dir) => run_export_mode(dir, &args.options).await,
        CliMode::Import(path) => run_import_mode(path, &args.options).await,
        CliMode::Tui => run_tui(args.options).await,
    }
}

fn setup_logging() {
    let log_dir = Config::log_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "courtesy-cal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("courtesy-cal started");
}
