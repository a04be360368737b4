//! Terminal event bus for quill.
//!
//! Key presses, mouse events, resizes, and the two timer cycles are normalised
//! into one `AppEvent` stream. Results of network work travel on the session's
//! own channel; the main loop selects over both.
//!
//! - **Render interval** (33 ms, about 30 FPS) triggers a `terminal.draw()`.
//! - **Tick interval** (250 ms) drives housekeeping such as expiring status
//!   messages.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text pasted while bracketed paste is enabled.
    Paste(String),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Sender and receiver ends of the terminal event channel.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that feeds the terminal event channel.
///
/// Release and repeat key events are dropped so each keystroke is seen once.
/// The task stops when the receiver is gone.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let crossterm_event = reader.next().fuse();

            let event = tokio::select! {
                _ = tick_interval.tick() => AppEvent::Tick,
                _ = render_interval.tick() => AppEvent::Render,
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        AppEvent::Key(key)
                    }
                    Some(Ok(Event::Mouse(mouse))) => AppEvent::Mouse(mouse),
                    Some(Ok(Event::Paste(text))) => AppEvent::Paste(text),
                    Some(Ok(Event::Resize(w, h))) => AppEvent::Resize(w, h),
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => break,
                },
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}
