//! Color accessors for the shell chrome.

use ratatui::style::Color;

pub fn header_bg() -> Color {
    Color::Rgb(32, 32, 36)
}

pub fn header_fg() -> Color {
    Color::Rgb(220, 220, 220)
}

pub fn chrome_bg() -> Color {
    Color::Rgb(24, 24, 26)
}

pub fn chrome_fg() -> Color {
    Color::Rgb(190, 190, 190)
}

pub fn muted_fg() -> Color {
    Color::Rgb(130, 130, 130)
}

pub fn handle_fg() -> Color {
    Color::Rgb(102, 102, 102)
}

pub fn handle_active_fg() -> Color {
    Color::Rgb(74, 144, 226)
}

pub fn command_bubble_fg() -> Color {
    Color::Rgb(120, 200, 255)
}

pub fn dialog_bg() -> Color {
    Color::Rgb(40, 40, 44)
}

pub fn dialog_fg() -> Color {
    Color::Rgb(225, 225, 225)
}

pub fn tab_active_bg() -> Color {
    Color::Rgb(56, 56, 62)
}

pub fn tab_inactive_fg() -> Color {
    Color::Rgb(150, 150, 150)
}

pub fn agent_user_fg() -> Color {
    Color::Rgb(255, 200, 120)
}

pub fn debug_fg() -> Color {
    Color::Rgb(110, 180, 110)
}
