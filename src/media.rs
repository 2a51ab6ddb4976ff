//! Continuous media content that survives focus swaps.
//!
//! [`MediaWindow`] keeps a player per window. Its twin gets a player of its
//! own from the same [`MediaDecoder`]; the source and the playback position
//! are mirrored into it so playback resumes where it left off after a swap.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::host::{Host, Orientation, Screen};
use crate::shell::Shell;
use crate::window::{WindowBehavior, WindowContext, WindowFlags, WindowId};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported media source: {0}")]
    UnsupportedSource(String),
    #[error("media decoder error: {0}")]
    Decoder(String),
}

/// Playback contract consumed from the media backend.
pub trait MediaPlayer: fmt::Debug {
    fn load(&mut self, source: &str) -> Result<(), MediaError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    fn is_playing(&self) -> bool;
    /// Whether playback ran to the end of the content.
    fn has_finished(&self) -> bool;
    fn content_size(&self) -> Option<(i32, i32)>;
}

pub trait MediaDecoder: fmt::Debug {
    fn new_player(&self) -> Box<dyn MediaPlayer>;
}

#[derive(Debug)]
pub struct MediaWindow {
    decoder: Rc<dyn MediaDecoder>,
    player: Box<dyn MediaPlayer>,
    source: Option<String>,
    current_point: Duration,
    start_point: Duration,
    did_not_play: bool,
}

impl MediaWindow {
    pub fn new(decoder: Rc<dyn MediaDecoder>) -> Self {
        let player = decoder.new_player();
        Self {
            decoder,
            player,
            source: None,
            current_point: Duration::ZERO,
            start_point: Duration::ZERO,
            did_not_play: true,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.source.is_some()
    }

    /// Load a new source. Playback does not start until [`Self::start`].
    pub fn set_source(&mut self, source: impl Into<String>) -> Result<(), MediaError> {
        let source = source.into();
        self.player.load(&source)?;
        tracing::debug!(%source, "media source loaded");
        self.source = Some(source);
        self.did_not_play = true;
        self.current_point = Duration::ZERO;
        Ok(())
    }

    pub fn start(&mut self) {
        if !self.has_content() {
            return;
        }
        self.player.play();
        if self.did_not_play {
            self.did_not_play = false;
            let start = std::mem::take(&mut self.start_point);
            self.set_position(start);
        }
    }

    pub fn pause(&mut self) {
        if self.has_content() {
            self.player.pause();
        }
    }

    pub fn stop(&mut self) {
        if self.has_content() {
            self.current_point = Duration::ZERO;
            self.player.stop();
        }
    }

    /// Seek, clamped to the duration. Before the first playback the position
    /// is kept as the point to start from.
    pub fn set_position(&mut self, position: Duration) {
        if self.has_content() && !self.did_not_play {
            self.current_point = position.min(self.player.duration());
            self.player.seek(self.current_point);
        } else {
            self.start_point = position;
        }
    }

    pub fn position(&self) -> Duration {
        self.current_point
    }

    pub fn start_point(&self) -> Duration {
        self.start_point
    }

    pub fn duration(&self) -> Duration {
        self.player.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn did_not_play(&self) -> bool {
        self.did_not_play
    }
}

impl WindowBehavior for MediaWindow {
    fn kind(&self) -> &'static str {
        "media"
    }

    fn default_flags(&self) -> WindowFlags {
        WindowFlags::ONLY_CONTENT
            | WindowFlags::RESIZABLE
            | WindowFlags::DRAGGABLE_BY_CONTENT
            | WindowFlags::NOT_RESIZABLE_BY_MOTION
    }

    fn default_title(&self) -> &'static str {
        "Video player window"
    }

    fn on_open(&mut self, _ctx: &WindowContext) {
        if !self.is_playing() {
            self.start();
        }
    }

    fn on_close(&mut self, _ctx: &WindowContext) {
        self.stop();
    }

    fn on_tick(&mut self, ctx: &WindowContext) {
        if !self.has_content() {
            return;
        }
        self.current_point = self.player.position();
        if self.player.has_finished() && ctx.flags().contains(WindowFlags::INFINITE_LOOP) {
            tracing::trace!(window_id = ?ctx.id(), "media restarted");
            self.player.play();
            self.set_position(Duration::ZERO);
        }
    }

    fn create_twin(&self) -> Option<Box<dyn WindowBehavior>> {
        Some(Box::new(MediaWindow::new(self.decoder.clone())))
    }

    fn mirror_into(&self, counterpart: &mut dyn WindowBehavior) {
        let Some(other) = counterpart.as_any_mut().downcast_mut::<MediaWindow>() else {
            return;
        };
        if other.source != self.source
            && let Some(source) = self.source.clone()
            && let Err(err) = other.set_source(source)
        {
            tracing::warn!(%err, "media source could not be mirrored");
            return;
        }
        other.set_position(self.current_point);
    }

    fn content_size(&self) -> Option<(i32, i32)> {
        if !self.has_content() {
            return None;
        }
        self.player.content_size()
    }
}

impl<H: Host> Shell<H> {
    /// Load a source into a media window (and its twin) and start playback
    /// if the window is open.
    pub fn set_media_source(
        &mut self,
        id: WindowId,
        source: impl Into<String>,
    ) -> Result<(), MediaError> {
        let open = self.is_open(id);
        let source = source.into();
        self.update_behavior::<MediaWindow, _>(id, |media| {
            media.set_source(source)?;
            if open {
                media.start();
            }
            Ok(())
        })
        .unwrap_or(Ok(()))
    }

    pub fn set_media_position(&mut self, id: WindowId, position: Duration) {
        self.update_behavior::<MediaWindow, _>(id, |media| media.set_position(position));
    }

    /// Size the window to the content's aspect ratio. The longer content
    /// side gets `1/width_div` of the screen, or `1/height_div` when the
    /// screen is oriented the same way as the content.
    pub fn fit_to_content_ratio(&mut self, id: WindowId, width_div: i32, height_div: i32) {
        let Some((content_w, content_h)) = self.window(id).and_then(|w| w.behavior().content_size())
        else {
            return;
        };
        if content_w <= 0 || content_h <= 0 || width_div <= 0 || height_div <= 0 {
            return;
        }
        self.with_window(id, |window, host| {
            let screen = Screen::query(host);
            let orientation = screen.orientation();
            if content_w > content_h {
                let ratio = content_h as f32 / content_w as f32;
                let div = if orientation == Orientation::Landscape {
                    height_div
                } else {
                    width_div
                };
                window.set_min_width(host, screen.width / div);
                let min_width = window.min_width();
                window.set_min_height(host, (min_width as f32 * ratio) as i32);
            } else {
                let ratio = content_w as f32 / content_h as f32;
                let div = if orientation == Orientation::Portrait {
                    height_div
                } else {
                    width_div
                };
                window.set_min_height(host, screen.height / div);
                let min_height = window.min_height();
                window.set_min_width(host, (min_height as f32 * ratio) as i32);
            }
            window.set_size(host, 0, 0);
        });
    }
}

/// A clock-driven player with a fixed duration, for tests and demos.
#[derive(Debug, Clone)]
pub struct SimulatedDecoder {
    clock: Rc<Cell<Duration>>,
    duration: Duration,
    size: (i32, i32),
}

impl SimulatedDecoder {
    pub fn new(duration: Duration, size: (i32, i32)) -> Self {
        Self {
            clock: Rc::new(Cell::new(Duration::ZERO)),
            duration,
            size,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }
}

impl MediaDecoder for SimulatedDecoder {
    fn new_player(&self) -> Box<dyn MediaPlayer> {
        Box::new(SimulatedPlayer {
            clock: self.clock.clone(),
            duration: self.duration,
            size: self.size,
            loaded: false,
            playing: false,
            base: Duration::ZERO,
            started_at: Duration::ZERO,
        })
    }
}

#[derive(Debug)]
pub struct SimulatedPlayer {
    clock: Rc<Cell<Duration>>,
    duration: Duration,
    size: (i32, i32),
    loaded: bool,
    playing: bool,
    base: Duration,
    started_at: Duration,
}

impl MediaPlayer for SimulatedPlayer {
    fn load(&mut self, source: &str) -> Result<(), MediaError> {
        if source.trim().is_empty() {
            return Err(MediaError::UnsupportedSource(source.to_string()));
        }
        self.loaded = true;
        self.playing = false;
        self.base = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) {
        if !self.loaded || self.playing {
            return;
        }
        if self.has_finished() {
            self.base = Duration::ZERO;
        }
        self.started_at = self.clock.get();
        self.playing = true;
    }

    fn pause(&mut self) {
        self.base = self.position();
        self.playing = false;
    }

    fn stop(&mut self) {
        self.base = Duration::ZERO;
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.base = position.min(self.duration);
        self.started_at = self.clock.get();
    }

    fn position(&self) -> Duration {
        if !self.playing {
            return self.base;
        }
        let elapsed = self.clock.get().saturating_sub(self.started_at);
        (self.base + elapsed).min(self.duration)
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing && self.position() < self.duration
    }

    fn has_finished(&self) -> bool {
        self.loaded && !self.duration.is_zero() && self.position() >= self.duration
    }

    fn content_size(&self) -> Option<(i32, i32)> {
        self.loaded.then_some(self.size)
    }
}
