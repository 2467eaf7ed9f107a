use ratatui::style::{Color, Modifier, Style};

use crate::theme_toggle::Theme;

// Terminal colors for each page theme. Only named colors are used so the
// preview looks the same on 16-color terminals.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub link: Color,
    pub dialog_bg: Color,
    pub dialog_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub error: Color,
    pub success: Color,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        fg: Color::Black,
        bg: Color::White,
        accent: Color::Blue,
        muted: Color::DarkGray,
        link: Color::Blue,
        dialog_bg: Color::Gray,
        dialog_fg: Color::Black,
        status_bg: Color::Blue,
        status_fg: Color::White,
        error: Color::Red,
        success: Color::Green,
    };

    pub const DARK: Palette = Palette {
        fg: Color::White,
        bg: Color::Black,
        accent: Color::Yellow,
        muted: Color::Gray,
        link: Color::Cyan,
        dialog_bg: Color::DarkGray,
        dialog_fg: Color::White,
        status_bg: Color::DarkGray,
        status_fg: Color::White,
        error: Color::LightRed,
        success: Color::LightGreen,
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::LIGHT,
            Theme::Dark => Self::DARK,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Focus ring.
    pub fn focused(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dialog(&self) -> Style {
        Style::default().fg(self.dialog_fg).bg(self.dialog_bg)
    }

    pub fn status(&self) -> Style {
        Style::default().fg(self.status_fg).bg(self.status_bg)
    }

    pub fn backdrop(&self) -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::LIGHT
    }
}
