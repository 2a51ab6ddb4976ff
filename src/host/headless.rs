//! An in-memory [`Host`] that records every call.
//!
//! Used by the test suites and handy for embedding the shell in a process
//! without a display. Nothing is drawn; attached surfaces are kept in a map
//! and timers run on a virtual clock advanced with [`HeadlessHost::advance`].

use std::collections::BTreeMap;
use std::time::Duration;

use super::{
    Host, HostError, SurfaceAnimation, SurfaceContent, SurfaceDescriptor, SurfaceHandle,
    SurfaceRole, Snapshot, TimerToken,
};
use crate::geometry::FloatRect;
use crate::window::WindowId;

#[derive(Debug, Clone)]
pub struct AttachedSurface {
    pub descriptor: SurfaceDescriptor,
    pub rect: FloatRect,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug)]
pub struct HeadlessHost {
    permission: bool,
    screen: (i32, i32),
    status_bar_height: i32,
    fail_attach: bool,
    next_handle: u64,
    next_timer: u64,
    surfaces: BTreeMap<SurfaceHandle, AttachedSurface>,
    attach_log: Vec<(WindowId, SurfaceRole)>,
    detach_log: Vec<(SurfaceHandle, bool)>,
    captures: usize,
    animations: Vec<(SurfaceHandle, SurfaceAnimation)>,
    timers: BTreeMap<TimerToken, Timer>,
    now: Duration,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1080, 1920, 24)
    }
}

impl HeadlessHost {
    pub fn new(width: i32, height: i32, status_bar_height: i32) -> Self {
        Self {
            permission: true,
            screen: (width, height),
            status_bar_height,
            fail_attach: false,
            next_handle: 1,
            next_timer: 1,
            surfaces: BTreeMap::new(),
            attach_log: Vec::new(),
            detach_log: Vec::new(),
            captures: 0,
            animations: Vec::new(),
            timers: BTreeMap::new(),
            now: Duration::ZERO,
        }
    }

    pub fn set_permission(&mut self, granted: bool) {
        self.permission = granted;
    }

    pub fn set_screen(&mut self, width: i32, height: i32) {
        self.screen = (width, height);
    }

    /// Make every following attach call fail with a backend error.
    pub fn set_fail_attach(&mut self, fail: bool) {
        self.fail_attach = fail;
    }

    /// Advance the virtual clock and return the timers that fired, once per
    /// elapsed interval.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now += by;
        let mut fired = Vec::new();
        for (token, timer) in self.timers.iter_mut() {
            while timer.next_due <= self.now {
                fired.push(*token);
                timer.next_due += timer.interval.max(Duration::from_millis(1));
            }
        }
        fired
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &AttachedSurface> {
        self.surfaces.values()
    }

    pub fn surface(&self, window: WindowId, role: SurfaceRole) -> Option<&AttachedSurface> {
        self.surfaces
            .values()
            .find(|s| s.descriptor.window == window && s.descriptor.role == role)
    }

    pub fn is_attached(&self, window: WindowId, role: SurfaceRole) -> bool {
        self.surface(window, role).is_some()
    }

    pub fn rect_of(&self, window: WindowId, role: SurfaceRole) -> Option<FloatRect> {
        self.surface(window, role).map(|s| s.rect)
    }

    /// Whether the proxy attached for `window` carries a captured image.
    pub fn proxy_has_image(&self, window: WindowId) -> bool {
        self.surface(window, SurfaceRole::Proxy)
            .is_some_and(|s| matches!(s.descriptor.content, SurfaceContent::Image(_)))
    }

    pub fn attach_count(&self, window: WindowId, role: SurfaceRole) -> usize {
        self.attach_log
            .iter()
            .filter(|(w, r)| *w == window && *r == role)
            .count()
    }

    pub fn detach_log(&self) -> &[(SurfaceHandle, bool)] {
        &self.detach_log
    }

    pub fn captures(&self) -> usize {
        self.captures
    }

    pub fn animations(&self) -> &[(SurfaceHandle, SurfaceAnimation)] {
        &self.animations
    }
}

impl Host for HeadlessHost {
    fn check_overlay_permission(&self) -> bool {
        self.permission
    }

    fn attach_surface(
        &mut self,
        descriptor: &SurfaceDescriptor,
        rect: FloatRect,
    ) -> Result<SurfaceHandle, HostError> {
        if !self.permission {
            return Err(HostError::PermissionDenied);
        }
        if self.fail_attach {
            return Err(HostError::Backend("attach rejected".to_string()));
        }
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.attach_log.push((descriptor.window, descriptor.role));
        self.surfaces.insert(
            handle,
            AttachedSurface {
                descriptor: descriptor.clone(),
                rect,
            },
        );
        Ok(handle)
    }

    fn update_surface_rect(
        &mut self,
        handle: SurfaceHandle,
        rect: FloatRect,
    ) -> Result<(), HostError> {
        let surface = self
            .surfaces
            .get_mut(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        surface.rect = rect;
        Ok(())
    }

    fn detach_surface(&mut self, handle: SurfaceHandle, immediate: bool) -> Result<(), HostError> {
        self.surfaces
            .remove(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        self.detach_log.push((handle, immediate));
        Ok(())
    }

    fn capture_visual_snapshot(&mut self, handle: SurfaceHandle) -> Result<Snapshot, HostError> {
        let surface = self
            .surfaces
            .get(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        self.captures += 1;
        Ok(Snapshot {
            width: surface.rect.width.max(0) as u32,
            height: surface.rect.height.max(0) as u32,
            pixels: vec![0xff; 4],
        })
    }

    fn screen_dimensions(&self) -> (i32, i32) {
        self.screen
    }

    fn status_bar_height(&self) -> i32 {
        self.status_bar_height
    }

    fn schedule_repeating(&mut self, interval: Duration) -> Result<TimerToken, HostError> {
        let token = TimerToken(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            token,
            Timer {
                interval,
                next_due: self.now + interval,
            },
        );
        Ok(token)
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }

    fn animate_surface(&mut self, handle: SurfaceHandle, animation: SurfaceAnimation) {
        self.animations.push((handle, animation));
    }
}
