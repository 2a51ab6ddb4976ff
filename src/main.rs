use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use indoc::indoc;
use tracing::Level;

use overlay_wm::config::{ChromeMetrics, ShellConfig};
use overlay_wm::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use overlay_wm::drivers::mouse::MouseTranslator;
use overlay_wm::drivers::{InputDriver, OutputDriver};
use overlay_wm::event_loop::{ControlFlow, EventLoop};
use overlay_wm::host::SurfaceRole;
use overlay_wm::media::{MediaWindow, SimulatedDecoder};
use overlay_wm::shell::Shell;
use overlay_wm::surface::Gesture;
use overlay_wm::terminal_host::{self, TerminalHost};
use overlay_wm::tracing_sub::{self, LogTarget};
use overlay_wm::window::{
    Gravity, PlainWindow, SwapWindow, WindowFlags, WindowId, WindowOptions, WindowStyle,
};

const KEYS_HELP: &str = indoc! {"
    Keys:
      Tab     focus the next window
      o       reopen closed windows
      Esc     unfocus the top window
      q       quit

    Drag a title bar to move a window, drag it into the status row to
    maximize, and drag the bottom-right corner to resize.
"};

#[derive(Parser, Debug)]
#[command(name = "overlay-wm", about = "Floating overlay windows in the terminal", after_help = KEYS_HELP)]
struct Args {
    /// Number of plain windows to open.
    #[arg(long, default_value_t = 2)]
    windows: usize,
    /// Tick interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    tick_ms: u64,
    /// Append debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Skip the media window.
    #[arg(long)]
    no_media: bool,
}

struct Demo {
    shell: Shell<TerminalHost>,
    windows: Vec<WindowId>,
    mouse: MouseTranslator,
    grab: Option<(WindowId, SurfaceRole)>,
    decoder: Option<SimulatedDecoder>,
    last_tick: Duration,
}

impl Demo {
    fn new(args: &Args, columns: u16, rows: u16) -> Self {
        let config = ShellConfig::default()
            .with_tick_interval(Duration::from_millis(args.tick_ms.max(1)))
            .with_chrome(ChromeMetrics {
                padding: 0,
                action_bar_height: 1,
            })
            .with_icon_press_inset(0);
        let mut shell = Shell::with_config(TerminalHost::new(columns, rows), config);
        let mut windows = Vec::new();

        for n in 0..args.windows {
            let id = shell.create_window(
                PlainWindow,
                WindowOptions::new()
                    .with_title(format!("Window {}", n + 1))
                    .with_flags(WindowFlags::RESIZABLE),
            );
            let offset = n as i32 * 4;
            shell.set_position(id, 2 + offset, 2 + offset);
            windows.push(id);
        }

        let notes = shell.create_window(
            SwapWindow,
            WindowOptions::new()
                .with_title("Notes (stays live)")
                .with_flags(WindowFlags::RESIZABLE),
        );
        shell.with_window(notes, |w, host| {
            w.set_style(WindowStyle {
                action_bar_color: Some(ratatui::style::Color::Yellow),
                ..WindowStyle::default()
            });
            w.set_position_by_gravity(host, Gravity::RIGHT);
        });
        windows.push(notes);

        let mut decoder = None;
        if !args.no_media {
            let sim = SimulatedDecoder::new(Duration::from_secs(30), (16, 9));
            let media = shell.create_window(
                MediaWindow::new(Rc::new(sim.clone())),
                WindowOptions::new().with_flags(WindowFlags::INFINITE_LOOP),
            );
            if let Err(err) = shell.set_media_source(media, "demo://clip") {
                tracing::warn!(%err, "media source rejected");
            }
            shell.fit_to_content_ratio(media, 2, 4);
            shell.with_window(media, |w, host| {
                w.set_position_by_gravity(host, Gravity::RIGHT | Gravity::BOTTOM)
            });
            windows.push(media);
            decoder = Some(sim);
        }

        for id in &windows {
            shell.open(*id);
        }

        Self {
            shell,
            windows,
            mouse: MouseTranslator::new(),
            grab: None,
            decoder,
            last_tick: Duration::ZERO,
        }
    }

    fn status_line(&self) -> String {
        let open = self.windows.iter().filter(|id| self.shell.is_open(**id)).count();
        let top = self
            .shell
            .stack()
            .last()
            .and_then(|id| self.shell.window(*id))
            .map(|w| w.title().to_string())
            .unwrap_or_default();
        format!(" overlay-wm | {open} open | top: {top} | q quit, o reopen, Tab focus")
    }

    fn on_idle(&mut self, now: Duration) {
        if let Some(decoder) = &self.decoder {
            decoder.advance(now.saturating_sub(self.last_tick));
        }
        self.last_tick = now;
        for token in self.shell.host_mut().due_timers(now) {
            self.shell.on_timer(token);
        }
    }

    fn focus_next(&mut self) {
        let open: Vec<_> = self
            .windows
            .iter()
            .copied()
            .filter(|id| self.shell.is_open(*id) || self.twin_is_open(*id))
            .collect();
        let Some(first) = open.first().copied() else {
            return;
        };
        let top = self.shell.stack().last().copied();
        let next = top
            .and_then(|top| open.iter().position(|id| *id == top))
            .and_then(|pos| open.get(pos + 1).copied())
            .unwrap_or(first);
        self.shell.focus(next);
    }

    fn twin_is_open(&self, id: WindowId) -> bool {
        self.shell
            .window(id)
            .and_then(|w| w.twin())
            .is_some_and(|twin| self.shell.is_open(twin))
    }

    fn reopen(&mut self) {
        for id in self.windows.clone() {
            if !self.shell.is_open(id) && !self.twin_is_open(id) {
                self.shell.open(id);
            }
        }
    }

    fn on_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Down(point) => {
                let Some((id, role)) = self.shell.surface_at(point) else {
                    self.grab = None;
                    self.shell.unfocus_top();
                    return;
                };
                if role == SurfaceRole::Primary
                    && let Some(button) = self
                        .shell
                        .window(id)
                        .and_then(|w| terminal_host::button_at(w, point))
                {
                    self.grab = None;
                    self.shell.press_button(id, button);
                    return;
                }
                self.grab = Some((id, role));
                self.shell.dispatch_to(id, role, gesture);
            }
            Gesture::Move(_) | Gesture::Up(_) => {
                if let Some((id, role)) = self.grab {
                    self.shell.dispatch_to(id, role, gesture);
                }
            }
            Gesture::Tap(_) => {
                if let Some((id, role)) = self.grab.take() {
                    self.shell.dispatch_to(id, role, gesture);
                }
            }
        }
    }

    fn on_event(&mut self, event: Event) -> ControlFlow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => return ControlFlow::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return ControlFlow::Quit;
                }
                KeyCode::Char('o') => self.reopen(),
                KeyCode::Tab => self.focus_next(),
                KeyCode::Esc => self.shell.unfocus_top(),
                _ => {}
            },
            Event::Mouse(mouse) => {
                for gesture in self.mouse.translate(&mouse) {
                    self.on_gesture(gesture);
                }
            }
            Event::Resize(columns, rows) => self.shell.host_mut().resize(columns, rows),
            _ => {}
        }
        ControlFlow::Continue
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let target = match &args.log_file {
        Some(path) => LogTarget::file(path)?,
        None => LogTarget::Sink,
    };
    tracing_sub::init_with(target, Level::DEBUG);

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;

    let (columns, rows) = output.size()?;
    let mut demo = Demo::new(&args, columns, rows);
    tracing::info!(columns, rows, windows = demo.windows.len(), "overlay-wm started");

    let mut event_loop = EventLoop::new(input, Duration::from_millis(16));
    let started = std::time::Instant::now();
    let result = event_loop.run(|_, event| {
        let Some(event) = event else {
            demo.on_idle(started.elapsed());
            let status = demo.status_line();
            output.draw(|frame| terminal_host::render(frame, &demo.shell, &status))?;
            return Ok(ControlFlow::Continue);
        };
        Ok(demo.on_event(event))
    });

    demo.shell.destroy();
    event_loop.driver().set_mouse_capture(false)?;
    output.exit()?;
    result
}
