use bitflags::bitflags;
use ratatui::style::Color;

use super::WindowFlags;

/// Colours of the window decoration. Unset colours fall back to the frame
/// colour; an unset title colour contrasts with the action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyle {
    pub frame_color: Color,
    pub action_bar_color: Option<Color>,
    pub border_color: Option<Color>,
    pub title_color: Option<Color>,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            frame_color: Color::White,
            action_bar_color: None,
            border_color: None,
            title_color: None,
        }
    }
}

impl WindowStyle {
    pub fn action_bar(&self) -> Color {
        self.action_bar_color.unwrap_or(self.frame_color)
    }

    pub fn border(&self) -> Color {
        self.border_color.unwrap_or(self.frame_color)
    }

    pub fn title(&self) -> Color {
        self.title_color
            .unwrap_or_else(|| text_color_for_background(self.action_bar()))
    }
}

/// Black or white, whichever reads on `background`.
pub fn text_color_for_background(background: Color) -> Color {
    let (r, g, b) = approximate_rgb(background);
    // invert, then gray by luma, then threshold
    let (r, g, b) = (255 - r as i32, 255 - g as i32, 255 - b as i32);
    let luma = (r * 299 + g * 587 + b * 114) / 1000;
    if luma < 127 { Color::Black } else { Color::White }
}

fn approximate_rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (128, 0, 0),
        Color::Green => (0, 128, 0),
        Color::Yellow => (128, 128, 0),
        Color::Blue => (0, 0, 128),
        Color::Magenta => (128, 0, 128),
        Color::Cyan => (0, 128, 128),
        Color::Gray => (192, 192, 192),
        Color::DarkGray => (128, 128, 128),
        Color::LightRed => (255, 0, 0),
        Color::LightGreen => (0, 255, 0),
        Color::LightYellow => (255, 255, 0),
        Color::LightBlue => (0, 0, 255),
        Color::LightMagenta => (255, 0, 255),
        Color::LightCyan => (0, 255, 255),
        Color::White => (255, 255, 255),
        Color::Indexed(idx) if idx >= 232 => {
            let level = 8 + (idx - 232) * 10;
            (level, level, level)
        }
        Color::Indexed(_) | Color::Reset => (128, 128, 128),
    }
}

/// Which pieces of chrome a renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeState {
    pub action_bar: bool,
    pub border: bool,
    pub icon: bool,
    pub title: bool,
    pub minimize_button: bool,
    pub maximize_button: bool,
    /// The maximize/restore button is greyed out on non-resizable windows.
    pub maximize_enabled: bool,
    pub quit_button: bool,
    pub resize_anchor: bool,
    /// Content swallows touches unless the window drags by its content.
    pub content_clickable: bool,
}

impl ChromeState {
    pub fn from_flags(flags: WindowFlags) -> Self {
        let action_bar = !flags.contains(WindowFlags::NO_ACTION_BAR);
        Self {
            action_bar,
            border: !flags.contains(WindowFlags::NO_BORDER),
            icon: action_bar && !flags.contains(WindowFlags::NO_ICON),
            title: action_bar && !flags.contains(WindowFlags::NO_TITLE),
            minimize_button: action_bar && !flags.contains(WindowFlags::NO_MINIMIZE_BUTTON),
            maximize_button: action_bar && !flags.contains(WindowFlags::NO_MAXIMIZE_BUTTON),
            maximize_enabled: flags.contains(WindowFlags::RESIZABLE),
            quit_button: action_bar && !flags.contains(WindowFlags::NO_QUIT_BUTTON),
            resize_anchor: flags.contains(WindowFlags::RESIZABLE),
            content_clickable: !flags.contains(WindowFlags::DRAGGABLE_BY_CONTENT),
        }
    }
}

/// Buttons in the action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeButton {
    Minimize,
    MaximizeRestore,
    Quit,
}

bitflags! {
    /// Anchor for [`super::OverlayWindow::set_position_by_gravity`]. Empty
    /// means top-left.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gravity: u8 {
        const RIGHT = 1 << 0;
        const BOTTOM = 1 << 1;
        const CENTER_HORIZONTAL = 1 << 2;
        const CENTER_VERTICAL = 1 << 3;
        const CENTER = Self::CENTER_HORIZONTAL.bits() | Self::CENTER_VERTICAL.bits();
    }
}
