use std::io;
use std::path::PathBuf;
use std::time::Duration;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use courtesy_cal::{
    app::{AppState, Mode, SyncStatus},
    calendar::ChecklistItem,
    input::{command_mode, insert_mode, normal_mode},
    spreadsheet,
    storage::config::Config,
    sync::{
        subscription::{FeedUpdate, LiveFeed},
        sync_engine::StoreClient,
    },
    ui::theme::Theme,
};
use crate::tui::{
    authentication::{Backend, BackendKind, connect},
    presentation::ui,
    sample_events::add_sample_events,
};

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub offline: bool,
    pub token: Option<String>,
    pub sample: bool,
}

struct Session<'a> {
    backend: &'a Backend,
    config: &'a Config,
    feed: LiveFeed,
}

impl Session<'_> {
    fn store(&self) -> &StoreClient {
        &self.backend.store
    }

    fn connected_status(&self) -> SyncStatus {
        match self.backend.kind {
            BackendKind::Offline => SyncStatus::Offline,
            _ => SyncStatus::Live,
        }
    }

    fn pump_live(&mut self, app: &mut AppState) {
        match self.feed.poll() {
            Some(FeedUpdate::Events(events)) => {
                app.sync_status = self.connected_status();
                app.replace_events(events);
            }
            Some(FeedUpdate::SignedOut) => {
                app.sync_status = SyncStatus::SignedOut;
                app.replace_events(Vec::new());
            }
            Some(FeedUpdate::Failed(message)) => {
                app.sync_status = SyncStatus::Error(message);
            }
            None => {}
        }
    }
}

pub async fn run_tui(options: SessionOptions) -> Result<(), io::Error> {
    let config = Config::load_or_create()
        .map_err(|e| io::Error::other(e.to_string()))?;
    let backend = connect(&config, options.offline)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    let theme = Theme::get_by_name(&config.ui.theme);
    let mut app = AppState::new().with_theme(theme);
    terminal.draw(|f| ui(f, &app)).ok();

    let poll_interval = Duration::from_secs(config.sync.poll_interval_seconds.max(1));
    let mut session = Session {
        backend: &backend,
        config: &config,
        feed: LiveFeed::new(backend.store.clone(), poll_interval),
    };
    start_session(&session, &options, &mut app).await;

    let res = run_app(&mut terminal, &mut app, &mut session).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn start_session(session: &Session<'_>, options: &SessionOptions, app: &mut AppState) {
    let identity = session
        .backend
        .sign_in(session.config, options.token.as_deref())
        .await;

    if identity.is_none() {
        app.sync_status = SyncStatus::SignedOut;
        if session.backend.kind == BackendKind::Unconfigured {
            app.set_status(format!("Set api_key and project_id in {}", Config::config_path().display()));
        }
        return;
    }

    if options.sample {
        if session.backend.kind == BackendKind::Offline {
            add_sample_events(session.store()).await;
        } else {
            tracing::warn!("--sample is only honoured with the offline store");
        }
    }

    app.sync_status = session.connected_status();
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    session: &mut Session<'_>,
) -> io::Result<()> {
    loop {
        session.pump_live(app);
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }

        if let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.mode {
                Mode::Normal => {
                    if app.show_help {
                        handle_help_keys(key.code, app);
                    } else if app.delete_flow.pending().is_some() {
                        handle_delete_confirmation(key.code, app, session).await;
                    } else if let Some(item) = normal_mode::checklist_key(key.code) {
                        toggle_selected(item, app, session).await;
                    } else {
                        match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            _ => {
                                app.clear_status();
                                normal_mode::handle_key(key.code, app);
                            }
                        }
                    }
                }
                Mode::Command => {
                    if handle_command_mode(key.code, app, terminal, session).await? {
                        return Ok(());
                    }
                }
                Mode::Insert => {
                    handle_insert_mode(key.code, app, session).await;
                }
            }
        }
    }
}

fn handle_help_keys(code: KeyCode, app: &mut AppState) {
    match code {
        KeyCode::Char('j') => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => {
            app.show_help = false;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

async fn toggle_selected(item: ChecklistItem, app: &mut AppState, session: &Session<'_>) {
    let Some(event) = app.selected_event().cloned() else {
        return;
    };
    if !session.store().toggle_checklist(&event, item).await {
        app.set_status(format!("{} 상태를 저장하지 못했습니다", item.label()));
    }
}

async fn handle_delete_confirmation(code: KeyCode, app: &mut AppState, session: &Session<'_>) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(event_id) = app.delete_flow.confirm() {
                tracing::info!("Deleting event: {}", event_id);
                if session.store().delete(&event_id).await {
                    app.set_status("일정을 삭제했습니다");
                } else {
                    app.set_status("일정을 삭제하지 못했습니다");
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.delete_flow.cancel();
        }
        _ => {}
    }
}

async fn handle_insert_mode(code: KeyCode, app: &mut AppState, session: &Session<'_>) {
    match code {
        KeyCode::Esc => app.close_event_form(),
        KeyCode::Enter => {
            let Some(form) = app.event_form.as_mut() else {
                return;
            };
            match form.to_draft() {
                Err(e) => form.error = Some(e),
                Ok(draft) => {
                    if session.store().create(draft).await {
                        app.close_event_form();
                        app.set_status("일정을 등록했습니다");
                    } else {
                        app.set_status("일정을 저장하지 못했습니다");
                    }
                }
            }
        }
        _ => insert_mode::handle_key(code, app),
    }
}

async fn handle_command_mode<B: ratatui::backend::Backend>(
    code: KeyCode,
    app: &mut AppState,
    terminal: &mut Terminal<B>,
    session: &mut Session<'_>,
) -> io::Result<bool> {
    match code {
        KeyCode::Enter => {
            let command_text = app.command_buffer.clone();
            let cmd = command_mode::parse_command(&command_text);
            app.command_buffer.clear();
            app.mode = Mode::Normal;

            match cmd {
                command_mode::Command::Quit => return Ok(true),
                command_mode::Command::Refresh => {
                    if session.feed.refresh() {
                        app.set_status("Refreshing...");
                    } else {
                        app.set_status("Not signed in");
                    }
                }
                command_mode::Command::Goto(date) => app.select_date(date),
                command_mode::Command::Help => {
                    app.show_help = !app.show_help;
                }
                command_mode::Command::Theme(theme_name) => {
                    app.theme = Theme::get_by_name(&theme_name);
                }
                command_mode::Command::NewEvent(company) => {
                    app.open_event_form(company.unwrap_or_default());
                }
                command_mode::Command::Export(dir) => {
                    let dir = dir.unwrap_or_else(|| session.config.export.directory.clone());
                    export(app, &dir);
                }
                command_mode::Command::Import(path) => {
                    app.set_status(format!("Importing {}...", path.display()));
                    terminal.draw(|f| ui(f, app))?;
                    import(app, session, path).await;
                }
                command_mode::Command::Error(message) => {
                    app.set_status(message);
                }
            }
            Ok(false)
        }
        KeyCode::Esc => {
            app.command_buffer.clear();
            app.mode = Mode::Normal;
            Ok(false)
        }
        KeyCode::Backspace => {
            app.command_buffer.pop();
            if app.command_buffer.is_empty() {
                app.mode = Mode::Normal;
            }
            Ok(false)
        }
        KeyCode::Char(c) => {
            app.command_buffer.push(c);
            Ok(false)
        }
        _ => Ok(false)
    }
}

fn export(app: &mut AppState, dir: &std::path::Path) {
    match spreadsheet::export_events(&app.events, dir, Local::now().date_naive()) {
        Ok(Some(path)) => app.set_status(format!("Exported to {}", path.display())),
        Ok(None) => app.set_status("내보낼 일정이 없습니다"),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            app.set_status(format!("Export failed: {}", e));
        }
    }
}

async fn import(app: &mut AppState, session: &Session<'_>, path: PathBuf) {
    if session.store().identity().is_none() {
        app.set_status("Not signed in");
        return;
    }
    match spreadsheet::import_file(session.store(), &path, Local::now().date_naive()).await {
        Ok(report) => app.set_status(report.message()),
        Err(e) => {
            tracing::error!("Import of {} failed: {}", path.display(), e);
            app.set_status(format!("Import failed: {}", e));
        }
    }
}
