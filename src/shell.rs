//! The window shell: owns every window, the focus registry and the host.
//!
//! All cross-window behavior lives here so that no window ever needs a
//! reference to another one. Operations on unknown ids, closed windows or
//! windows in the wrong mode are no-ops.

use std::collections::BTreeMap;

use crate::config::ShellConfig;
use crate::events::{WindowEvent, WindowListener};
use crate::geometry::Point;
use crate::host::{Host, SurfaceAnimation, SurfaceHandle, SurfaceRole, TimerToken};
use crate::registry::FocusRegistry;
use crate::surface::Gesture;
use crate::window::{
    ChromeButton, GestureOutcome, ModeTransition, OverlayWindow, TwinLink, WindowBehavior,
    WindowFlags, WindowId, WindowMode, WindowOptions,
};

pub struct Shell<H: Host> {
    host: H,
    config: ShellConfig,
    windows: BTreeMap<WindowId, OverlayWindow>,
    registry: FocusRegistry,
    listener: Option<Box<dyn WindowListener>>,
    next_id: u64,
}

impl<H: Host> Shell<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, ShellConfig::default())
    }

    pub fn with_config(host: H, config: ShellConfig) -> Self {
        Self {
            host,
            registry: FocusRegistry::new(config.tick_interval),
            config,
            windows: BTreeMap::new(),
            listener: None,
            next_id: 1,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn registry(&self) -> &FocusRegistry {
        &self.registry
    }

    /// Ids of open windows, most recently focused last.
    pub fn stack(&self) -> &[WindowId] {
        self.registry.windows()
    }

    pub fn has_permission(&self) -> bool {
        self.host.check_overlay_permission()
    }

    pub fn set_listener(&mut self, listener: impl WindowListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    fn notify(&mut self, id: WindowId, event: WindowEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.notify(id, event);
        }
    }

    fn alloc_id(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- construction & access ----

    pub fn create_window(
        &mut self,
        behavior: impl WindowBehavior,
        options: WindowOptions,
    ) -> WindowId {
        self.create_boxed(Box::new(behavior), options)
    }

    /// Build a closed window. Kinds that provide a twin get one right away;
    /// the twin itself never gets a twin.
    pub fn create_boxed(
        &mut self,
        behavior: Box<dyn WindowBehavior>,
        options: WindowOptions,
    ) -> WindowId {
        let id = self.alloc_id();
        let chrome = self.config.chrome;
        let inset = self.config.icon_press_inset;
        let twin_behavior = behavior.create_twin();
        let mut window = OverlayWindow::new(id, behavior, options, chrome, inset);

        if let Some(twin_behavior) = twin_behavior {
            let twin_id = self.alloc_id();
            window.add_flags(&mut self.host, WindowFlags::KEEP_ALIVE_ON_UNFOCUS);
            let twin_options = WindowOptions::new()
                .with_title(window.title())
                .with_min_size(window.min_width(), window.min_height())
                .with_flags(window.flags() | WindowFlags::NO_OPEN_ANIMATION);
            let mut twin = OverlayWindow::new(twin_id, twin_behavior, twin_options, chrome, inset);
            twin.set_link(TwinLink::Original(id));
            twin.reapply_geometry(&mut self.host);
            window.set_link(TwinLink::Twin(twin_id));
            self.windows.insert(twin_id, twin);
            tracing::debug!(window_id = ?id, twin_id = ?twin_id, "twin created");
        }

        window.reapply_geometry(&mut self.host);
        tracing::debug!(window_id = ?id, kind = window.kind(), "window created");
        self.windows.insert(id, window);
        id
    }

    pub fn window(&self, id: WindowId) -> Option<&OverlayWindow> {
        self.windows.get(&id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &OverlayWindow> {
        self.windows.values()
    }

    /// Run `f` with mutable access to a window and the host, for geometry,
    /// flag and style changes.
    pub fn with_window<R>(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut OverlayWindow, &mut dyn Host) -> R,
    ) -> Option<R> {
        let window = self.windows.get_mut(&id)?;
        Some(f(window, &mut self.host))
    }

    pub fn set_position(&mut self, id: WindowId, x: i32, y: i32) {
        self.with_window(id, |w, host| w.set_position(host, x, y));
    }

    pub fn set_size(&mut self, id: WindowId, width: i32, height: i32) {
        self.with_window(id, |w, host| w.set_size(host, width, height));
    }

    pub fn add_flags(&mut self, id: WindowId, flags: WindowFlags) {
        self.with_window(id, |w, host| w.add_flags(host, flags));
    }

    pub fn remove_flags(&mut self, id: WindowId, flags: WindowFlags) {
        self.with_window(id, |w, host| w.remove_flags(host, flags));
    }

    pub fn behavior<T: WindowBehavior>(&self, id: WindowId) -> Option<&T> {
        self.windows
            .get(&id)?
            .behavior()
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutate a window's behavior and mirror the result into its twin pair.
    pub fn update_behavior<T: WindowBehavior, R>(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let window = self.windows.get_mut(&id)?;
        let behavior = window.behavior_mut().as_any_mut().downcast_mut::<T>()?;
        let out = f(behavior);
        if let Some(counterpart) = window.counterpart() {
            self.mirror_behavior(id, counterpart);
        }
        Some(out)
    }

    fn mirror_behavior(&mut self, from: WindowId, to: WindowId) {
        let Some(mut target) = self.windows.remove(&to) else {
            return;
        };
        if let Some(source) = self.windows.get(&from) {
            source.behavior().mirror_into(target.behavior_mut());
        }
        self.windows.insert(to, target);
    }

    // ---- lifecycle ----

    /// Open a window and focus it. Opening a twin id brings back its
    /// original; opening an original whose twin is live swaps back.
    pub fn open(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        match window.twin_link() {
            TwinLink::Original(original) => self.activate(original),
            TwinLink::Twin(twin) if !window.is_open() && self.is_open(twin) => {
                self.swap_back(id, twin);
            }
            _ => {
                self.open_inner(id, true, true);
            }
        }
    }

    pub fn is_open(&self, id: WindowId) -> bool {
        self.windows.get(&id).is_some_and(|w| w.is_open())
    }

    fn activate(&mut self, id: WindowId) {
        if self.is_open(id) {
            self.focus(id);
        } else {
            self.open(id);
        }
    }

    fn open_inner(&mut self, id: WindowId, focus: bool, animate: bool) -> bool {
        if !self.host.check_overlay_permission() {
            tracing::warn!(window_id = ?id, "open skipped: overlay permission missing");
            return false;
        }
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        if window.is_open() {
            return false;
        }
        window.set_open(true);
        window.set_focused(focus);
        window.refresh_attachment(&mut self.host);
        if !window.has_attached_surface() {
            tracing::warn!(window_id = ?id, "open failed: no surface could be attached");
            window.set_open(false);
            window.detach_all(&mut self.host, true);
            return false;
        }

        self.registry.init(&mut self.host);
        self.registry.register(id);
        if focus {
            self.request_focus(id);
        }

        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        if animate
            && !window.has_flags(WindowFlags::NO_OPEN_ANIMATION)
            && let Some(handle) = window.surface(SurfaceRole::Primary).handle()
        {
            self.host.animate_surface(handle, SurfaceAnimation::Open);
        }
        let ctx = window.context();
        window.behavior_mut().on_open(&ctx);
        tracing::debug!(window_id = ?id, focused = focus, "window opened");
        self.notify(id, WindowEvent::Open);
        true
    }

    /// Close a window. Closing an original also closes its twin.
    pub fn close(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if !window.is_open()
            && let Some(twin) = window.twin()
        {
            self.close_inner(twin, false);
            return;
        }
        self.close_inner(id, true);
    }

    fn close_inner(&mut self, id: WindowId, by_user: bool) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !window.is_open() {
            return;
        }
        window.detach_all(&mut self.host, false);
        self.registry.deregister(id);
        window.set_open(false);
        window.resume_silently(&mut self.host);
        let twin = if by_user { window.twin() } else { None };
        let ctx = window.context();
        window.behavior_mut().on_close(&ctx);
        tracing::debug!(window_id = ?id, by_user, "window closed");
        self.notify(id, WindowEvent::Close);

        if let Some(twin) = twin {
            self.close_inner(twin, false);
        }
    }

    /// Close every open window, draining the stack from the bottom so windows
    /// opened during teardown are closed too.
    pub fn close_all(&mut self) {
        while let Some(first) = self.registry.first() {
            self.close_inner(first, true);
            if self.registry.first() == Some(first) {
                self.registry.deregister(first);
            }
        }
    }

    /// Close everything and stop the tick timer.
    pub fn destroy(&mut self) {
        self.close_all();
        self.registry.destroy(&mut self.host);
    }

    // ---- focus ----

    pub fn focus(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        match window.twin_link() {
            TwinLink::Original(original) => {
                self.activate(original);
                return;
            }
            TwinLink::Twin(twin) if !window.is_open() && self.is_open(twin) => {
                self.swap_back(id, twin);
                return;
            }
            _ => {}
        }
        if !window.is_open() || window.mode() == WindowMode::Minimized {
            return;
        }
        self.request_focus(id);
    }

    /// Put `id` on top and unfocus every other window. Unfocusing a sibling
    /// never lands back here.
    fn request_focus(&mut self, id: WindowId) {
        if !self.registry.promote(id) {
            return;
        }
        self.focus_window(id);
        for other in self.registry.others(id) {
            self.unfocus_window(other);
        }
    }

    fn focus_window(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !window.is_open() || window.mode() == WindowMode::Minimized {
            return;
        }
        window.set_focused(true);
        window.refresh_attachment(&mut self.host);
        let ctx = window.context();
        window.behavior_mut().on_focus(&ctx);
        tracing::debug!(window_id = ?id, "window focused");
        self.notify(id, WindowEvent::Focus);
    }

    pub fn unfocus(&mut self, id: WindowId) {
        self.unfocus_window(id);
    }

    /// Unfocus the window on top of the stack.
    pub fn unfocus_top(&mut self) {
        if let Some(top) = self.registry.top() {
            self.unfocus_window(top);
        }
    }

    fn unfocus_window(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if !window.is_open() || !window.is_focused() || window.mode() == WindowMode::Minimized {
            return;
        }
        if window.has_flags(WindowFlags::KEEP_ALIVE_ON_UNFOCUS)
            && let Some(twin) = window.twin()
            && self.swap_to_twin(id, twin)
        {
            return;
        }
        self.unfocus_in_place(id);
    }

    fn unfocus_in_place(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !window.is_focused() {
            return;
        }
        window.unfocus_surfaces(&mut self.host);
        let ctx = window.context();
        window.behavior_mut().on_unfocus(&ctx);
        tracing::debug!(window_id = ?id, "window unfocused");
        self.notify(id, WindowEvent::Unfocus);
    }

    // ---- twin swaps ----

    /// Hand the screen over to the twin: it opens live in the original's
    /// stack slot, then the original closes.
    fn swap_to_twin(&mut self, original: WindowId, twin: WindowId) -> bool {
        let Some(state) = self.windows.get(&original).map(|w| w.mirror_state()) else {
            return false;
        };
        self.mirror_behavior(original, twin);
        let Some(twin_window) = self.windows.get_mut(&twin) else {
            return false;
        };
        twin_window.apply_mirror_state(&mut self.host, state);

        self.registry.replace(original, twin);
        if !self.open_inner(twin, false, false) {
            self.registry.replace(twin, original);
            tracing::warn!(window_id = ?original, twin_id = ?twin, "twin swap failed, keeping original live");
            return false;
        }
        tracing::debug!(window_id = ?original, twin_id = ?twin, "swapped to twin");

        if let Some(window) = self.windows.get_mut(&original) {
            window.set_focused(false);
            let ctx = window.context();
            window.behavior_mut().on_unfocus(&ctx);
            self.notify(original, WindowEvent::Unfocus);
        }
        self.close_inner(original, false);
        true
    }

    /// Bring the original back at the twin's current geometry.
    fn swap_back(&mut self, original: WindowId, twin: WindowId) {
        let Some(geometry) = self.windows.get(&twin).map(|w| w.geometry()) else {
            return;
        };
        self.mirror_behavior(twin, original);
        if let Some(window) = self.windows.get_mut(&original) {
            window.adopt_geometry(&mut self.host, geometry);
        }

        self.registry.replace(twin, original);
        if !self.open_inner(original, true, false) {
            self.registry.replace(original, twin);
            tracing::warn!(window_id = ?original, twin_id = ?twin, "swap back failed");
            return;
        }
        tracing::debug!(window_id = ?original, twin_id = ?twin, "swapped back from twin");
        self.close_inner(twin, false);
    }

    // ---- modes ----

    pub fn set_mode(&mut self, id: WindowId, target: WindowMode) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let from = window.mode();
        match window.plan_mode(target) {
            ModeTransition::Stay => window.reapply_geometry(&mut self.host),
            ModeTransition::Reject => {
                tracing::debug!(window_id = ?id, "maximize rejected: window is not resizable");
                return;
            }
            ModeTransition::Maximize => {
                window.maximize(&mut self.host);
                self.focus_after_mode_change(id);
            }
            ModeTransition::Restore => {
                window.restore(&mut self.host);
                self.focus_after_mode_change(id);
            }
            ModeTransition::Minimize => {
                if from == WindowMode::Maximized {
                    window.restore(&mut self.host);
                }
                self.unfocus_in_place(id);
                if let Some(window) = self.windows.get_mut(&id) {
                    window.minimize(&mut self.host, from);
                }
            }
            ModeTransition::Unminimize { target } => {
                window.unminimize(&mut self.host);
                if target == WindowMode::Maximized && window.has_flags(WindowFlags::RESIZABLE) {
                    window.maximize(&mut self.host);
                }
                self.focus_after_mode_change(id);
            }
        }
        let to = self.windows.get(&id).map(|w| w.mode());
        tracing::debug!(window_id = ?id, ?from, ?to, "mode changed");
    }

    fn focus_after_mode_change(&mut self, id: WindowId) {
        if self
            .windows
            .get(&id)
            .is_some_and(|w| w.is_open() && !w.is_twin())
        {
            self.request_focus(id);
        }
    }

    pub fn press_button(&mut self, id: WindowId, button: ChromeButton) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let chrome = window.chrome_state();
        match button {
            ChromeButton::Minimize if chrome.minimize_button => {
                self.set_mode(id, WindowMode::Minimized);
            }
            ChromeButton::MaximizeRestore if chrome.maximize_button && chrome.maximize_enabled => {
                let target = if window.mode() == WindowMode::Maximized {
                    WindowMode::Restored
                } else {
                    WindowMode::Maximized
                };
                self.set_mode(id, target);
            }
            ChromeButton::Quit if chrome.quit_button => self.close(id),
            _ => tracing::trace!(window_id = ?id, ?button, "button hidden, press ignored"),
        }
    }

    // ---- ticks ----

    /// Handle a host timer expiry. Returns whether the token was the tick.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        if !self.registry.is_tick(token) {
            return false;
        }
        self.tick();
        true
    }

    pub fn tick(&mut self) {
        for id in self.registry.windows().to_vec() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            if !window.is_open() || window.has_flags(WindowFlags::NO_TICK) {
                continue;
            }
            window.reapply_geometry(&mut self.host);
            let ctx = window.context();
            window.behavior_mut().on_tick(&ctx);
            if let Some(counterpart) = window.counterpart() {
                self.mirror_behavior(id, counterpart);
            }
            tracing::trace!(window_id = ?id, "tick");
            self.notify(id, WindowEvent::Tick);
        }
    }

    // ---- input ----

    /// Topmost attached surface under `point`.
    pub fn surface_at(&self, point: Point) -> Option<(WindowId, SurfaceRole)> {
        self.registry.windows().iter().rev().find_map(|id| {
            let window = self.windows.get(id)?;
            [SurfaceRole::Icon, SurfaceRole::Primary, SurfaceRole::Proxy]
                .into_iter()
                .find(|role| {
                    let surface = window.surface(*role);
                    surface.is_attached() && surface.rect().contains(point)
                })
                .map(|role| (*id, role))
        })
    }

    /// Route a gesture reported by the host for one of its surfaces.
    /// Returns `false` when no live surface has that handle.
    pub fn dispatch_gesture(&mut self, handle: SurfaceHandle, gesture: Gesture) -> bool {
        let target = self.windows.values().find_map(|w| {
            [SurfaceRole::Primary, SurfaceRole::Proxy, SurfaceRole::Icon]
                .into_iter()
                .find(|role| w.surface(*role).handle() == Some(handle))
                .map(|role| (w.id(), role))
        });
        let Some((id, role)) = target else {
            return false;
        };
        self.dispatch_to(id, role, gesture);
        true
    }

    pub fn dispatch_to(&mut self, id: WindowId, role: SurfaceRole, gesture: Gesture) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let outcome = window.handle_gesture(&mut self.host, role, gesture);
        match outcome {
            GestureOutcome::None => {}
            GestureOutcome::Focus => self.focus(id),
            GestureOutcome::UnfocusTop => self.unfocus_top(),
            GestureOutcome::FocusOriginal(original) => self.activate(original),
            GestureOutcome::SetMode(mode) => self.set_mode(id, mode),
        }
    }
}

impl<H: Host> std::fmt::Debug for Shell<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("windows", &self.windows.len())
            .field("stack", &self.registry.windows())
            .field("timer", &self.registry.timer())
            .finish()
    }
}
