//! The host compositor seam.
//!
//! The core never draws anything itself. It asks a [`Host`] to attach,
//! reposition and detach opaque surfaces, and reads screen metrics from it.
//! All host calls happen on the single UI thread.

pub mod headless;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::geometry::FloatRect;
use crate::window::WindowId;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("overlay permission not granted")]
    PermissionDenied,
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceHandle),
    #[error("host backend error: {0}")]
    Backend(String),
    #[error("host i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host-assigned identity of an attached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token for a repeating timer registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(pub u64);

/// Which of a window's three surfaces a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceRole {
    /// Live content with chrome.
    Primary,
    /// Static image standing in for the primary while unfocused.
    Proxy,
    /// Minimized icon.
    Icon,
}

/// A still image of a surface's visual state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    /// Opaque host-defined pixel payload.
    pub pixels: Vec<u8>,
}

impl Snapshot {
    /// A blank placeholder used when the host cannot capture a surface.
    pub fn blank(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
            pixels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceContent {
    Live,
    Image(Snapshot),
    Icon,
}

/// Everything the host needs to know to attach a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub window: WindowId,
    pub role: SurfaceRole,
    pub content: SurfaceContent,
}

/// Screen metrics sampled from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Screen {
    pub width: i32,
    pub height: i32,
    pub status_bar_height: i32,
}

impl Screen {
    pub fn query(host: &dyn Host) -> Self {
        let (width, height) = host.screen_dimensions();
        Self {
            width,
            height,
            status_bar_height: host.status_bar_height(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        match self.height.cmp(&self.width) {
            std::cmp::Ordering::Greater => Orientation::Portrait,
            std::cmp::Ordering::Less => Orientation::Landscape,
            std::cmp::Ordering::Equal => Orientation::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Square,
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAnimation {
    /// Scale in from 70% around the centre.
    Open,
}

/// Platform services consumed by the overlay core.
pub trait Host {
    fn check_overlay_permission(&self) -> bool;

    fn attach_surface(
        &mut self,
        descriptor: &SurfaceDescriptor,
        rect: FloatRect,
    ) -> Result<SurfaceHandle, HostError>;

    fn update_surface_rect(
        &mut self,
        handle: SurfaceHandle,
        rect: FloatRect,
    ) -> Result<(), HostError>;

    /// Remove a surface. `immediate` requests synchronous removal; otherwise
    /// the host may batch it with the next frame.
    fn detach_surface(&mut self, handle: SurfaceHandle, immediate: bool) -> Result<(), HostError>;

    fn capture_visual_snapshot(&mut self, handle: SurfaceHandle) -> Result<Snapshot, HostError>;

    fn screen_dimensions(&self) -> (i32, i32);

    fn status_bar_height(&self) -> i32;

    /// Register a repeating timer. The host later reports expiry by calling
    /// [`crate::shell::Shell::on_timer`] with the returned token.
    fn schedule_repeating(&mut self, interval: Duration) -> Result<TimerToken, HostError>;

    fn cancel_timer(&mut self, token: TimerToken);

    fn animate_surface(&mut self, _handle: SurfaceHandle, _animation: SurfaceAnimation) {}
}
