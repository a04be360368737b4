//! Central UI state for quill.
//!
//! Pure state: mode, focus, panel scroll offsets, geometry cached from the last
//! frame, and the transient status-bar message. Buffer contents and every
//! AI-assisted workflow live in the core session, not here.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::highlight::HighlightCache;

/// How long a status-bar message stays up.
const FLASH_TTL: Duration = Duration::from_secs(4);

/// Keybinding set currently in effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Keys edit the active buffer.
    Insert,
    /// Help overlay is shown above all panels.
    HelpOverlay,
}

/// Which panel receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Sidebar,
    #[default]
    Editor,
    Review,
    Output,
}

impl PanelFocus {
    const ORDER: [PanelFocus; 4] =
        [PanelFocus::Sidebar, PanelFocus::Editor, PanelFocus::Review, PanelFocus::Output];

    fn index(self) -> usize {
        match self {
            PanelFocus::Sidebar => 0,
            PanelFocus::Editor => 1,
            PanelFocus::Review => 2,
            PanelFocus::Output => 3,
        }
    }

    /// Neighbour in left-to-right order, wrapping. `forward = false` walks back.
    pub fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let offset = if forward { 1 } else { len - 1 };
        Self::ORDER[(self.index() + offset) % len]
    }
}

pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Set by the user to hide the sidebar on wide terminals.
    pub sidebar_hidden: bool,

    /// Selection mirror for the buffer list; synced to the active buffer on render.
    pub sidebar_state: ListState,

    pub review_scroll: u16,
    pub output_scroll: u16,
    pub help_scroll: u16,

    /// Inner heights cached after each render, for page-wise scrolling.
    pub review_viewport_height: u16,
    pub output_viewport_height: u16,

    /// Outer rects of sidebar, editor, review and output from the last frame.
    /// Hidden panels have zero width.
    pub panel_rects: [Rect; 4],

    pub highlight: HighlightCache,

    flash: Option<(String, Instant)>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            sidebar_hidden: false,
            sidebar_state: ListState::default(),
            review_scroll: 0,
            output_scroll: 0,
            help_scroll: 0,
            review_viewport_height: 0,
            output_viewport_height: 0,
            panel_rects: [Rect::default(); 4],
            highlight: HighlightCache::default(),
            flash: None,
        }
    }
}

impl AppState {
    /// `true` if `panel` was drawn in the last frame. The editor always is.
    pub fn is_visible(&self, panel: PanelFocus) -> bool {
        panel == PanelFocus::Editor || self.panel_rects[panel.index()].width > 0
    }

    /// Shows or hides the sidebar. Focus leaves it when it goes away.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_hidden = !self.sidebar_hidden;
        if self.sidebar_hidden && self.focus == PanelFocus::Sidebar {
            self.focus = PanelFocus::Editor;
        }
    }

    /// Moves focus to the next visible panel in the given direction.
    pub fn cycle_focus(&mut self, forward: bool) {
        let mut next = self.focus.step(forward);
        while !self.is_visible(next) {
            next = next.step(forward);
        }
        self.focus = next;
    }

    /// Falls back to the editor when the focused panel has disappeared.
    pub fn ensure_focus_visible(&mut self) {
        if !self.is_visible(self.focus) {
            self.focus = PanelFocus::Editor;
        }
    }

    /// Scrolls the focused text panel (review or output) by `lines`.
    pub fn scroll_panel(&mut self, lines: i32) {
        let scroll = match self.focus {
            PanelFocus::Review => &mut self.review_scroll,
            PanelFocus::Output => &mut self.output_scroll,
            PanelFocus::Sidebar | PanelFocus::Editor => return,
        };
        *scroll = scroll.saturating_add_signed(lines.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    }

    /// Half the focused text panel's height, at least one line.
    pub fn half_page(&self) -> i32 {
        let height = match self.focus {
            PanelFocus::Review => self.review_viewport_height,
            PanelFocus::Output => self.output_viewport_height,
            PanelFocus::Sidebar | PanelFocus::Editor => 2,
        };
        i32::from((height / 2).max(1))
    }

    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some((message.into(), Instant::now()));
    }

    pub fn flash(&self) -> Option<&str> {
        self.flash.as_ref().map(|(m, _)| m.as_str())
    }

    /// Drops the status message once it has been up for long enough.
    pub fn expire_flash(&mut self, now: Instant) {
        if self
            .flash
            .as_ref()
            .is_some_and(|(_, shown)| now.duration_since(*shown) >= FLASH_TTL)
        {
            self.flash = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_skips_hidden_panels() {
        let mut state = AppState::default();
        state.panel_rects[0] = Rect::new(0, 0, 20, 10);
        state.cycle_focus(true);
        assert_eq!(state.focus, PanelFocus::Sidebar);
        state.cycle_focus(true);
        assert_eq!(state.focus, PanelFocus::Editor);
        state.cycle_focus(false);
        assert_eq!(state.focus, PanelFocus::Sidebar);
    }

    #[test]
    fn panel_scroll_saturates_at_zero() {
        let mut state = AppState { focus: PanelFocus::Review, ..AppState::default() };
        state.scroll_panel(3);
        state.scroll_panel(-10);
        assert_eq!(state.review_scroll, 0);
        state.scroll_panel(2);
        assert_eq!(state.review_scroll, 2);
        assert_eq!(state.output_scroll, 0);
    }

    #[test]
    fn flash_expires() {
        let mut state = AppState::default();
        state.set_flash("saved");
        state.expire_flash(Instant::now());
        assert_eq!(state.flash(), Some("saved"));
        state.expire_flash(Instant::now() + FLASH_TTL);
        assert_eq!(state.flash(), None);
    }

    #[test]
    fn hiding_sidebar_moves_focus_to_editor() {
        let mut state = AppState { focus: PanelFocus::Sidebar, ..AppState::default() };
        state.toggle_sidebar();
        assert!(state.sidebar_hidden);
        assert_eq!(state.focus, PanelFocus::Editor);
        state.toggle_sidebar();
        assert!(!state.sidebar_hidden);
        assert_eq!(state.focus, PanelFocus::Editor);
    }
}
