//! A [`Host`] backed by a terminal screen, one cell per pixel.
//!
//! Surfaces are tracked in memory and painted by [`render`] with ratatui in
//! stack order. Timers are polled from the event loop's idle callback.

use std::collections::BTreeMap;
use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::geometry::{FloatRect, Point};
use crate::host::{
    Host, HostError, Snapshot, SurfaceContent, SurfaceDescriptor, SurfaceHandle, SurfaceRole,
    TimerToken,
};
use crate::media::MediaWindow;
use crate::shell::Shell;
use crate::window::{ChromeButton, OverlayWindow, WindowMode};

const STATUS_BAR_ROWS: i32 = 1;
const BUTTON_WIDTH: i32 = 3;

#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug)]
pub struct TerminalHost {
    screen: (i32, i32),
    next_handle: u64,
    next_timer: u64,
    surfaces: BTreeMap<SurfaceHandle, (SurfaceDescriptor, FloatRect)>,
    timers: BTreeMap<TimerToken, Timer>,
}

impl TerminalHost {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            screen: (i32::from(columns), i32::from(rows)),
            next_handle: 1,
            next_timer: 1,
            surfaces: BTreeMap::new(),
            timers: BTreeMap::new(),
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.screen = (i32::from(columns), i32::from(rows));
        tracing::debug!(columns, rows, "terminal resized");
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Timers due at `now`, each rescheduled for its next interval.
    pub fn due_timers(&mut self, now: Duration) -> Vec<TimerToken> {
        let mut due = Vec::new();
        for (token, timer) in self.timers.iter_mut() {
            if timer.next_due <= now {
                due.push(*token);
                while timer.next_due <= now {
                    timer.next_due += timer.interval.max(Duration::from_millis(1));
                }
            }
        }
        due
    }
}

impl Host for TerminalHost {
    fn check_overlay_permission(&self) -> bool {
        true
    }

    fn attach_surface(
        &mut self,
        descriptor: &SurfaceDescriptor,
        rect: FloatRect,
    ) -> Result<SurfaceHandle, HostError> {
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.surfaces.insert(handle, (descriptor.clone(), rect));
        Ok(handle)
    }

    fn update_surface_rect(
        &mut self,
        handle: SurfaceHandle,
        rect: FloatRect,
    ) -> Result<(), HostError> {
        let entry = self
            .surfaces
            .get_mut(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        entry.1 = rect;
        Ok(())
    }

    fn detach_surface(&mut self, handle: SurfaceHandle, _immediate: bool) -> Result<(), HostError> {
        self.surfaces
            .remove(&handle)
            .map(|_| ())
            .ok_or(HostError::UnknownSurface(handle))
    }

    fn capture_visual_snapshot(&mut self, handle: SurfaceHandle) -> Result<Snapshot, HostError> {
        let (_, rect) = self
            .surfaces
            .get(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        Ok(Snapshot::blank(rect.width, rect.height))
    }

    fn screen_dimensions(&self) -> (i32, i32) {
        self.screen
    }

    fn status_bar_height(&self) -> i32 {
        STATUS_BAR_ROWS
    }

    fn schedule_repeating(&mut self, interval: Duration) -> Result<TimerToken, HostError> {
        let token = TimerToken(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            token,
            Timer {
                interval,
                next_due: interval,
            },
        );
        Ok(token)
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }
}

/// Action bar buttons with their cells, right to left.
pub fn chrome_buttons(window: &OverlayWindow) -> Vec<(ChromeButton, FloatRect)> {
    let chrome = window.chrome_state();
    if !chrome.action_bar || !window.surface(SurfaceRole::Primary).is_attached() {
        return Vec::new();
    }
    let rect = window.surface(SurfaceRole::Primary).rect();
    let bar_y = window.y();
    let mut right = rect.right();
    let mut buttons = Vec::new();
    for (button, visible) in [
        (ChromeButton::Quit, chrome.quit_button),
        (ChromeButton::MaximizeRestore, chrome.maximize_button),
        (ChromeButton::Minimize, chrome.minimize_button),
    ] {
        if !visible {
            continue;
        }
        right -= BUTTON_WIDTH;
        buttons.push((
            button,
            FloatRect::new(right, bar_y, BUTTON_WIDTH, window.action_bar_height()),
        ));
    }
    buttons
}

pub fn button_at(window: &OverlayWindow, point: Point) -> Option<ChromeButton> {
    chrome_buttons(window)
        .into_iter()
        .find(|(_, rect)| rect.contains(point))
        .map(|(button, _)| button)
}

fn to_cells(rect: FloatRect, area: Rect) -> Option<Rect> {
    let x0 = rect.x.max(i32::from(area.x));
    let y0 = rect.y.max(i32::from(area.y));
    let x1 = rect.right().min(i32::from(area.right()));
    let y1 = rect.bottom().min(i32::from(area.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}

fn button_label(button: ChromeButton, mode: WindowMode) -> &'static str {
    match button {
        ChromeButton::Quit => " x ",
        ChromeButton::MaximizeRestore if mode == WindowMode::Maximized => " ❐ ",
        ChromeButton::MaximizeRestore => " □ ",
        ChromeButton::Minimize => " _ ",
    }
}

fn content_lines(window: &OverlayWindow) -> Vec<Line<'static>> {
    if let Some(media) = window.behavior().as_any().downcast_ref::<MediaWindow>() {
        let state = if media.is_playing() { "▶" } else { "■" };
        return vec![
            Line::from(format!(
                "{state} {:>3}s / {}s",
                media.position().as_secs(),
                media.duration().as_secs()
            )),
            Line::from(media.source().unwrap_or("no source").to_string()),
        ];
    }
    vec![
        Line::from(format!("{} {}", window.kind(), window.id())),
        Line::from(format!("{}x{} at {},{}", window.width(), window.height(), window.x(), window.y())),
    ]
}

fn render_primary(frame: &mut Frame<'_>, window: &OverlayWindow, area: Rect) {
    let rect = window.surface(SurfaceRole::Primary).rect();
    let Some(cells) = to_cells(rect, area) else {
        return;
    };
    let chrome = window.chrome_state();
    let style = window.style();
    frame.render_widget(Clear, cells);

    if chrome.action_bar {
        let bar = FloatRect::new(rect.x, window.y(), rect.width, window.action_bar_height());
        if let Some(bar_cells) = to_cells(bar, area) {
            let mut spans = Vec::new();
            if chrome.icon {
                spans.push(Span::raw("◆ "));
            }
            if chrome.title {
                spans.push(Span::raw(window.title().to_string()));
            }
            let mut bar_style = Style::default().bg(style.action_bar()).fg(style.title());
            if window.is_focused() {
                bar_style = bar_style.add_modifier(Modifier::BOLD);
            }
            frame.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), bar_cells);
            for (button, button_rect) in chrome_buttons(window) {
                let Some(button_cells) = to_cells(button_rect, area) else {
                    continue;
                };
                let mut button_style = bar_style;
                if button == ChromeButton::MaximizeRestore && !chrome.maximize_enabled {
                    button_style = button_style.fg(Color::DarkGray);
                }
                frame.render_widget(
                    Paragraph::new(button_label(button, window.mode())).style(button_style),
                    button_cells,
                );
            }
        }
    }

    let body = window.content_rect();
    let body_rect = FloatRect::new(rect.x, body.y, rect.width, rect.bottom() - body.y);
    let Some(body_cells) = to_cells(body_rect, area) else {
        return;
    };
    let mut block = Block::default();
    if chrome.border {
        let borders = if chrome.action_bar {
            Borders::LEFT | Borders::RIGHT | Borders::BOTTOM
        } else {
            Borders::ALL
        };
        block = block
            .borders(borders)
            .border_style(Style::default().fg(style.border()));
    }
    frame.render_widget(Paragraph::new(content_lines(window)).block(block), body_cells);

    if chrome.resize_anchor
        && let Some(anchor) = to_cells(FloatRect::new(rect.right() - 1, rect.bottom() - 1, 1, 1), area)
    {
        frame.render_widget(Paragraph::new("◢"), anchor);
    }
}

fn render_proxy(frame: &mut Frame<'_>, window: &OverlayWindow, area: Rect) {
    let surface = window.surface(SurfaceRole::Proxy);
    let Some(cells) = to_cells(surface.rect(), area) else {
        return;
    };
    let label = match surface.content() {
        SurfaceContent::Image(snapshot) => format!("snapshot {}x{}", snapshot.width, snapshot.height),
        _ => String::new(),
    };
    let block = Block::bordered()
        .title(window.title().to_string())
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Clear, cells);
    frame.render_widget(
        Paragraph::new(label)
            .style(Style::default().fg(Color::DarkGray))
            .block(block),
        cells,
    );
}

fn render_icon(frame: &mut Frame<'_>, window: &OverlayWindow, area: Rect) {
    let Some(cells) = to_cells(window.surface(SurfaceRole::Icon).rect(), area) else {
        return;
    };
    frame.render_widget(Clear, cells);
    frame.render_widget(
        Paragraph::new(window.title().to_string()).block(Block::bordered().title("▣")),
        cells,
    );
}

/// Paint the status line and every attached surface, bottom of the stack
/// first.
pub fn render(frame: &mut Frame<'_>, shell: &Shell<TerminalHost>, status: &str) {
    let area = frame.area();
    let status_rect = Rect::new(area.x, area.y, area.width, (STATUS_BAR_ROWS as u16).min(area.height));
    frame.render_widget(
        Paragraph::new(status.to_string()).style(Style::default().bg(Color::Blue).fg(Color::White)),
        status_rect,
    );
    for id in shell.stack() {
        let Some(window) = shell.window(*id) else {
            continue;
        };
        if window.surface(SurfaceRole::Proxy).is_attached() {
            render_proxy(frame, window, area);
        }
        if window.surface(SurfaceRole::Primary).is_attached() {
            render_primary(frame, window, area);
        }
        if window.surface(SurfaceRole::Icon).is_attached() {
            render_icon(frame, window, area);
        }
    }
}
