//! Colors for the experiment screens.
//!
//! Uses Kanagawa Wave palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

/// Kanagawa Wave color palette constants.
mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub stimulus: Color,
    pub divider: Color,
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub key: Color,
    pub success: Color,
    pub failure: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            background: colors::BG_DARK,
            stimulus: colors::TEXT_PRIMARY,
            divider: colors::BG_BORDER,
            text: colors::TEXT_PRIMARY,
            muted: colors::TEXT_MUTED,
            title: colors::PRIMARY,
            key: colors::CYAN,
            success: colors::GREEN,
            failure: colors::RED,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            background: Color::Black,
            stimulus: Color::White,
            divider: Color::Gray,
            text: Color::White,
            muted: Color::Gray,
            title: Color::White,
            key: Color::White,
            success: Color::White,
            failure: Color::White,
        }
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_style(&self) -> Style {
        Style::default().fg(self.key).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn hint_style(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
    }
}

#[must_use]
pub fn palette(high_contrast: bool) -> Palette {
    if high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}
