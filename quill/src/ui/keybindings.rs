//! Keybinding dispatcher for quill.
//!
//! Translates crossterm key, mouse and paste events into `AppState` changes
//! and session calls, and returns a `KeyAction` telling the event loop
//! whether to keep going. Dispatch branches on `state.mode` first.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use quill_core::suggest::TRIGGER_CHARACTERS;
use quill_core::Session;

use crate::app::{AppState, Mode, PanelFocus};
use crate::textarea::TextArea;

/// Control-flow signal returned from the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

type EditorSession = Session<TextArea>;

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState, session: &mut EditorSession) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state, session),
        Mode::Insert => {
            handle_insert(key, state, session);
            KeyAction::Continue
        }
    }
}

/// Inserts pasted text into the active buffer. Ignored outside insert mode.
pub fn handle_paste(text: &str, state: &AppState, session: &mut EditorSession) {
    if state.mode == Mode::Insert {
        edit_active(session, |area| area.insert_str(text));
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState, session: &mut EditorSession) -> KeyAction {
    if let Some(action) = handle_navigation_key(key, state, session) {
        return action;
    }

    match key.code {
        KeyCode::Char('i') => {
            state.focus = PanelFocus::Editor;
            state.mode = Mode::Insert;
        }

        // Buffers
        KeyCode::Char('n') => {
            let id = session.create_buffer();
            session.on_mount(&id, TextArea::default());
            state.set_flash(format!("New {} buffer", session.active_buffer().language));
        }
        KeyCode::Char('[') => switch_buffer(session, -1),
        KeyCode::Char(']') => switch_buffer(session, 1),
        KeyCode::Char('l') => {
            let language = session.active_buffer().language.next();
            session.set_language(language);
        }

        // Assist
        KeyCode::Char('r') => {
            if session.request_review() {
                state.review_scroll = 0;
                state.set_flash("Reviewing...");
            } else {
                state.set_flash("A review is already running");
            }
        }
        KeyCode::Char('a') => {
            if !session.apply_corrections() {
                state.set_flash("No corrections to apply");
            }
        }
        KeyCode::Char('c') => session.close_review(),
        KeyCode::Char('x') => {
            if session.run_active() {
                state.output_scroll = 0;
            } else {
                state.set_flash("Already running");
            }
        }
        KeyCode::Char('o') => session.dismiss_output(),

        // Focus
        KeyCode::Char('b') => state.toggle_sidebar(),
        KeyCode::Char('H') => state.cycle_focus(false),
        KeyCode::Char('L') => state.cycle_focus(true),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') => return KeyAction::Quit,

        _ => {}
    }
    KeyAction::Continue
}

/// j / k / g / G and Ctrl-d / Ctrl-u, applied to whatever panel has focus.
///
/// Returns `None` when the key is not a navigation key.
fn handle_navigation_key(
    key: KeyEvent,
    state: &mut AppState,
    session: &mut EditorSession,
) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let delta: isize = match key.code {
        KeyCode::Char('j') | KeyCode::Down => 1,
        KeyCode::Char('k') | KeyCode::Up => -1,
        KeyCode::Char('d') if ctrl => state.half_page() as isize,
        KeyCode::Char('u') if ctrl => -(state.half_page() as isize),
        KeyCode::Char('g') => isize::MIN,
        KeyCode::Char('G') => isize::MAX,
        _ => return None,
    };

    match state.focus {
        PanelFocus::Sidebar => match delta {
            isize::MIN => select_buffer(session, 0),
            isize::MAX => select_buffer(session, usize::MAX),
            _ => switch_buffer(session, delta.signum()),
        },
        PanelFocus::Editor => {
            let page = matches!(key.code, KeyCode::Char('d' | 'u')) && ctrl;
            with_active(session, |area| match delta {
                isize::MIN => area.move_top(),
                isize::MAX => area.move_bottom(),
                _ if page => area.page(delta > 0),
                _ => area.move_lines(delta),
            });
        }
        PanelFocus::Review | PanelFocus::Output => match delta {
            isize::MIN => state.scroll_panel(i32::MIN),
            isize::MAX => state.scroll_panel(i32::MAX),
            _ => state.scroll_panel(delta as i32),
        },
    }
    Some(KeyAction::Continue)
}

/// Activates the buffer `delta` places away from the active one, wrapping.
fn switch_buffer(session: &mut EditorSession, delta: isize) {
    let buffers = session.store().buffers();
    let len = buffers.len() as isize;
    let Some(current) = buffers.iter().position(|b| b.id == session.store().active_id()) else {
        return;
    };
    let next = (current as isize + delta).rem_euclid(len) as usize;
    select_buffer(session, next);
}

/// Activates the buffer at `index`, clamped to the last one.
fn select_buffer(session: &mut EditorSession, index: usize) {
    let buffers = session.store().buffers();
    let Some(buffer) = buffers.get(index.min(buffers.len().saturating_sub(1))) else {
        return;
    };
    let id = buffer.id.clone();
    session.set_active(&id);
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Handles a key in insert mode.
///
/// While the completion menu is open, Tab/Enter accept, Up/Down navigate and
/// Esc closes it. Otherwise keys edit the buffer; trigger characters and Enter
/// invoke the completion provider, and Enter also fires the line-commit hook
/// that drives comment-to-code generation.
fn handle_insert(key: KeyEvent, state: &mut AppState, session: &mut EditorSession) {
    let id = session.store().active_id().to_owned();
    let menu_open = session.widget(&id).is_some_and(|w| w.menu().is_some());
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if menu_open {
        match key.code {
            KeyCode::Tab | KeyCode::Enter => {
                edit_active(session, TextArea::accept_completion);
                return;
            }
            KeyCode::Down => return with_active(session, TextArea::menu_next),
            KeyCode::Up => return with_active(session, TextArea::menu_prev),
            KeyCode::Esc => return with_active(session, TextArea::dismiss_menu),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Char(' ') if ctrl => session.on_completion_requested(&id),
        KeyCode::Char(c) if !ctrl => {
            edit_active(session, |area| area.insert_char(c));
            if TRIGGER_CHARACTERS.contains(&c) {
                session.on_completion_requested(&id);
            }
        }
        KeyCode::Enter => {
            edit_active(session, TextArea::insert_newline);
            session.on_key_commit(&id);
            session.on_completion_requested(&id);
        }
        KeyCode::Tab => edit_active(session, TextArea::insert_tab),
        KeyCode::Backspace => edit_active(session, TextArea::backspace),
        KeyCode::Delete => edit_active(session, TextArea::delete),
        KeyCode::Left => with_active(session, TextArea::move_left),
        KeyCode::Right => with_active(session, TextArea::move_right),
        KeyCode::Up => with_active(session, |area| area.move_lines(-1)),
        KeyCode::Down => with_active(session, |area| area.move_lines(1)),
        KeyCode::Home => with_active(session, TextArea::move_home),
        KeyCode::End => with_active(session, TextArea::move_end),
        KeyCode::PageUp => with_active(session, |area| area.page(false)),
        KeyCode::PageDown => with_active(session, |area| area.page(true)),
        _ => {}
    }
}

/// Runs `f` on the active widget without touching buffer text.
fn with_active<R>(session: &mut EditorSession, f: impl FnOnce(&mut TextArea) -> R) {
    let id = session.store().active_id().to_owned();
    if let Some(area) = session.widget_mut(&id) {
        f(area);
    }
}

/// Runs an editing operation on the active widget, then syncs the store.
fn edit_active<R>(session: &mut EditorSession, f: impl FnOnce(&mut TextArea) -> R) {
    let id = session.store().active_id().to_owned();
    with_active(session, f);
    session.on_text_changed(&id);
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses the panel under the pointer; the wheel moves the editor
/// cursor or scrolls the focused panel by three lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState, session: &mut EditorSession) {
    let delta = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            focus_at(mouse.column, mouse.row, state);
            return;
        }
        MouseEventKind::ScrollUp => -3,
        MouseEventKind::ScrollDown => 3,
        _ => return,
    };

    match (state.mode, state.focus) {
        (Mode::HelpOverlay, _) => {
            state.help_scroll = state.help_scroll.saturating_add_signed(delta as i16);
        }
        (_, PanelFocus::Editor) => with_active(session, |area| area.move_lines(delta)),
        (_, PanelFocus::Sidebar) => switch_buffer(session, delta.signum()),
        _ => state.scroll_panel(delta as i32),
    }
}

fn focus_at(col: u16, row: u16, state: &mut AppState) {
    let pos = Position { x: col, y: row };
    let panels = [PanelFocus::Sidebar, PanelFocus::Editor, PanelFocus::Review, PanelFocus::Output];
    for (rect, panel) in state.panel_rects.iter().zip(panels) {
        if rect.width > 0 && rect.contains(pos) {
            state.focus = panel;
            return;
        }
    }
}
