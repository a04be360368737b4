//! quill: an AI-assisted code editor for the terminal.
//!
//! Entry point for the `quill` binary. Wires together configuration, file
//! logging, the SQLite-backed buffer store, the HTTP assist client, the core
//! editing session, and the terminal lifecycle.
//!
//! # Startup sequence
//!
//! 1. Load config from XDG. Read-only, safe before anything else.
//! 2. Create the data directory and install the file logger.
//! 3. Open the state database and restore buffers from it.
//! 4. `install_panic_hook()`, so the terminal is restored before a panic prints.
//! 5. `register_sigterm()`, polled in the event loop's heartbeat.
//! 6. `init_tui()`, then spawn the terminal event task.
//! 7. Mount one text area per buffer and probe the assist service.
//!
//! # Safety
//!
//! `restore_tui()` is called after the event loop returns (`q`, SIGTERM, the
//! event channel closing, or a draw error). Only the Render arm uses `?`, and
//! it returns from `run()` rather than from `main()`, so the terminal is still
//! restored. Pending edits are flushed to disk on the way out.

mod app;
mod config;
mod event;
mod highlight;
mod logging;
mod textarea;
mod theme;
mod tui;
mod ui;

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use quill_core::storage::{load_state, open_db, PersistedState};
use quill_core::{BufferStore, HttpAssistClient, Session, SessionConfig, SessionEvent};

use crate::app::AppState;
use crate::config::Config;
use crate::event::AppEvent;
use crate::textarea::TextArea;
use crate::ui::keybindings::{handle_key, handle_mouse, handle_paste, KeyAction};

#[tokio::main]
async fn main() -> io::Result<()> {
    let (config, config_warning) = Config::load(&config::config_path());

    std::fs::create_dir_all(&config.data_dir)?;
    logging::init(&config.data_dir)?;
    if let Some(warning) = config_warning {
        warn!("{warning}");
    }
    let theme = theme::Theme::from_name(&config.theme);

    let conn = open_db(&config.db_path().to_string_lossy())
        .await
        .map_err(io::Error::other)?;
    let persisted = load_state(&conn).await.unwrap_or_else(|e| {
        warn!(error = %e, "could not read saved editor state; starting fresh");
        PersistedState::default()
    });
    let store = BufferStore::restore(&persisted);
    let writer = quill_core::persist::spawn_writer(conn);

    let client = HttpAssistClient::new(&config.service.base_url, config.request_timeout())
        .map_err(io::Error::other)?;
    let (session_tx, mut session_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let mut session: Session<TextArea> = Session::new(
        store,
        Arc::new(client),
        session_tx,
        SessionConfig { debounce: config.debounce() },
    )
    .with_persistence(writer);
    info!(base_url = %config.service.base_url, buffers = session.store().buffers().len(), "quill started");

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let ids: Vec<String> = session.store().buffers().iter().map(|b| b.id.clone()).collect();
    for id in ids {
        session.on_mount(&id, TextArea::default());
    }
    session.check_status();
    highlight::warm_up();

    let mut state = AppState::default();
    let outcome = run(&mut terminal, &mut state, &mut session, &mut session_rx, &mut rx, &theme, &term_flag).await;

    tui::restore_tui()?;
    session.flush().await;
    if let Err(e) = &outcome {
        error!(error = %e, "event loop failed");
    }
    info!("quill stopped");
    outcome
}

/// Event loop. Returns on `q`, SIGTERM, a closed event channel, or a draw
/// error; the caller restores the terminal in every case.
async fn run(
    terminal: &mut tui::Tui,
    state: &mut AppState,
    session: &mut Session<TextArea>,
    session_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    theme: &theme::Theme,
    term_flag: &std::sync::atomic::AtomicBool,
) -> io::Result<()> {
    'event_loop: loop {
        tokio::select! {
            // SIGTERM is checked at least every 50ms even when the terminal is idle.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            Some(event) = session_rx.recv() => {
                match &event {
                    SessionEvent::Reviewed { .. } => state.review_scroll = 0,
                    SessionEvent::Executed { .. } => state.output_scroll = 0,
                    _ => {}
                }
                session.handle_event(event);
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, state, session, theme))?;
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, state, session) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => handle_mouse(mouse, state, session),
                    Some(AppEvent::Paste(text)) => handle_paste(&text, state, session),
                    Some(AppEvent::Tick) => state.expire_flash(Instant::now()),
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }
    Ok(())
}
