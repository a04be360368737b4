//! Color themes.
//!
//! Two built-ins: `dark` uses the ANSI 16 palette and works everywhere;
//! `catppuccin_mocha` uses RGB and wants a truecolor terminal.

use ratatui::style::Color;

use quill_core::MarkerSeverity;

/// Every color quill draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Editor
    /// Line numbers in the gutter.
    pub gutter: Color,
    /// Gutter number of the cursor line.
    pub gutter_active: Color,
    /// Background of the cursor line.
    pub cursor_line_bg: Color,
    /// Plain text when no syntax highlighting applies.
    pub text: Color,
    /// Placeholder and hint text.
    pub muted: Color,

    // Markers and diagnostics
    pub marker_error: Color,
    pub marker_warning: Color,
    pub marker_hint: Color,

    // Completion popup
    pub popup_bg: Color,
    pub popup_selected_bg: Color,
    pub popup_kind: Color,

    // Sidebar
    pub sidebar_active: Color,

    // Review preview
    pub diff_added: Color,
    pub diff_removed: Color,

    // Output panel
    pub output_ok: Color,
    pub output_err: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,
    pub status_online: Color,
    pub status_offline: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            gutter: Color::DarkGray,
            gutter_active: Color::White,
            cursor_line_bg: Color::Black,
            text: Color::Reset,
            muted: Color::DarkGray,

            marker_error: Color::Red,
            marker_warning: Color::Yellow,
            marker_hint: Color::Blue,

            popup_bg: Color::Black,
            popup_selected_bg: Color::Blue,
            popup_kind: Color::Magenta,

            sidebar_active: Color::Cyan,

            diff_added: Color::Green,
            diff_removed: Color::Red,

            output_ok: Color::Reset,
            output_err: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            status_online: Color::Green,
            status_offline: Color::Red,
        }
    }

    /// Catppuccin Mocha, <https://github.com/catppuccin/catppuccin>.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let mantle = Color::Rgb(24, 24, 37); // #181825
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            gutter: overlay0,
            gutter_active: lavender,
            cursor_line_bg: surface0,
            text,
            muted: overlay0,

            marker_error: red,
            marker_warning: yellow,
            marker_hint: blue,

            popup_bg: mantle,
            popup_selected_bg: surface1,
            popup_kind: mauve,

            sidebar_active: lavender,

            diff_added: green,
            diff_removed: red,

            output_ok: text,
            output_err: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            status_online: green,
            status_offline: red,
        }
    }

    /// Resolves a configured theme name. Unknown names fall back to `dark`
    /// with a logged warning.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Underline and badge color for a marker.
    pub fn marker(&self, severity: MarkerSeverity) -> Color {
        match severity {
            MarkerSeverity::Error => self.marker_error,
            MarkerSeverity::Warning => self.marker_warning,
            MarkerSeverity::Info | MarkerSeverity::Hint => self.marker_hint,
        }
    }
}
