//! Overlay windows.
//!
//! An [`OverlayWindow`] composes three [`OverlaySurface`]s: the live primary
//! surface, a static proxy that stands in for it while the window is
//! unfocused, and the icon shown while minimized. Geometry is kept in content
//! coordinates (chrome excluded) and pushed to the primary and proxy surfaces
//! on every change.
//!
//! Cross-window effects (focus, twin swaps, registry bookkeeping) are driven
//! by [`crate::shell::Shell`]; the window reports what a gesture asked for
//! through [`GestureOutcome`].

pub mod behavior;
pub mod mode;
pub mod style;

use std::fmt;

use bitflags::bitflags;

pub use behavior::{PlainWindow, SwapWindow, WindowBehavior, WindowContext};
pub use mode::{ModeController, ModeTransition, SavedGeometry, WindowMode, edge_snap};
pub use style::{ChromeButton, ChromeState, Gravity, WindowStyle};

use crate::config::ChromeMetrics;
use crate::geometry::{
    FloatRect, Point, ResizeEdge, apply_resize_drag, by_interval, clamp_window_height,
    clamp_window_width, clamp_window_x, clamp_window_y,
};
use crate::host::{Host, Screen, Snapshot, SurfaceContent, SurfaceRole};
use crate::surface::{DragFilter, DragListener, DragStep, Gesture, OverlaySurface, SurfaceFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        const NO_ICON = 1 << 0;
        const NO_TITLE = 1 << 1;
        const NO_MINIMIZE_BUTTON = 1 << 2;
        const NO_QUIT_BUTTON = 1 << 3;
        const NO_MAXIMIZE_BUTTON = 1 << 4;
        const NO_CONTROLS = Self::NO_MINIMIZE_BUTTON.bits()
            | Self::NO_QUIT_BUTTON.bits()
            | Self::NO_MAXIMIZE_BUTTON.bits();
        const NO_ACTION_BAR = 1 << 5;
        const NO_BORDER = 1 << 6;
        const ONLY_CONTENT = Self::NO_ACTION_BAR.bits() | Self::NO_BORDER.bits();
        const RESIZABLE = 1 << 7;
        /// Dragging across the status bar does not maximize or restore.
        const NOT_RESIZABLE_BY_MOTION = 1 << 8;
        const NOT_DRAGGABLE = 1 << 9;
        const DRAGGABLE_BY_CONTENT = 1 << 10;
        /// Keep the live surface on screen while unfocused instead of
        /// swapping in a snapshot.
        const KEEP_ALIVE_ON_UNFOCUS = 1 << 11;
        const NO_FOCUS_ON_TOUCH = 1 << 12;
        const NO_TICK = 1 << 13;
        const NO_OPEN_ANIMATION = 1 << 14;
        /// Restart media content when it reaches its end.
        const INFINITE_LOOP = 1 << 15;
        /// Skip position clamping.
        const NO_LIMITS = 1 << 16;
    }
}

/// Construction parameters supplied by the embedder.
#[derive(Debug, Clone, Default)]
pub struct WindowOptions {
    pub title: Option<String>,
    pub min_width: i32,
    pub min_height: i32,
    pub flags: WindowFlags,
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_min_size(mut self, min_width: i32, min_height: i32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// How a window relates to its twin, if it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TwinLink {
    #[default]
    None,
    /// This window is an original; the id is its background twin.
    Twin(WindowId),
    /// This window is a twin; the id is the window it stands in for.
    Original(WindowId),
}

/// What a gesture on one of the window's surfaces asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    None,
    Focus,
    /// Unfocus whichever window is on top of the stack.
    UnfocusTop,
    /// Focus the window this twin stands in for.
    FocusOriginal(WindowId),
    SetMode(WindowMode),
}

/// Where a point lands on the primary surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    Outside,
    ResizeAnchor,
    Chrome,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interaction {
    Idle,
    Moving,
    Resizing { start: FloatRect, anchor_touch: Point },
}

/// State copied from an original window into its twin before a swap.
#[derive(Debug, Clone)]
pub(crate) struct MirrorState {
    geometry: FloatRect,
    min_width: i32,
    min_height: i32,
    title: String,
    style: WindowStyle,
    flags: WindowFlags,
    modes: ModeController,
}

#[derive(Debug)]
pub struct OverlayWindow {
    id: WindowId,
    behavior: Box<dyn WindowBehavior>,
    chrome: ChromeMetrics,
    icon_press_inset: i32,
    title: String,
    flags: WindowFlags,
    style: WindowStyle,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    min_width: i32,
    min_height: i32,
    modes: ModeController,
    open: bool,
    focused: bool,
    link: TwinLink,
    primary: OverlaySurface,
    proxy: OverlaySurface,
    icon: OverlaySurface,
    interaction: Interaction,
    icon_pressed: bool,
}

impl OverlayWindow {
    pub(crate) fn new(
        id: WindowId,
        behavior: Box<dyn WindowBehavior>,
        options: WindowOptions,
        chrome: ChromeMetrics,
        icon_press_inset: i32,
    ) -> Self {
        let flags = behavior.default_flags() | options.flags;
        let title = options
            .title
            .unwrap_or_else(|| behavior.default_title().to_string());
        let min_width = by_interval(options.min_width, Some(chrome.min_width_floor()), None);
        let min_height = by_interval(options.min_height, Some(chrome.min_height_floor()), None);
        let live = if flags.contains(WindowFlags::NOT_DRAGGABLE) {
            SurfaceFlags::NO_LIMITS
        } else {
            SurfaceFlags::DRAGGABLE | SurfaceFlags::NO_LIMITS
        };
        Self {
            id,
            behavior,
            chrome,
            icon_press_inset,
            title,
            flags,
            style: WindowStyle::default(),
            x: 0,
            y: 0,
            width: min_width,
            height: min_height,
            min_width,
            min_height,
            modes: ModeController::new(),
            open: false,
            focused: false,
            link: TwinLink::None,
            primary: OverlaySurface::new(id, SurfaceRole::Primary, live),
            proxy: OverlaySurface::new(id, SurfaceRole::Proxy, live),
            icon: OverlaySurface::new(id, SurfaceRole::Icon, SurfaceFlags::DRAGGABLE),
            interaction: Interaction::Idle,
            icon_pressed: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    pub fn behavior(&self) -> &dyn WindowBehavior {
        self.behavior.as_ref()
    }

    pub fn behavior_mut(&mut self) -> &mut dyn WindowBehavior {
        self.behavior.as_mut()
    }

    pub fn context(&self) -> WindowContext {
        WindowContext::new(self.id, self.flags)
            .with_open(self.open)
            .with_focus(self.focused)
            .with_twin(self.is_twin())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn style(&self) -> &WindowStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: WindowStyle) {
        self.style = style;
    }

    pub fn chrome_state(&self) -> ChromeState {
        ChromeState::from_flags(self.flags)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_twin(&self) -> bool {
        matches!(self.link, TwinLink::Original(_))
    }

    pub fn twin_link(&self) -> TwinLink {
        self.link
    }

    /// The background twin of an original window.
    pub fn twin(&self) -> Option<WindowId> {
        match self.link {
            TwinLink::Twin(id) => Some(id),
            _ => None,
        }
    }

    /// The original window a twin stands in for.
    pub fn original(&self) -> Option<WindowId> {
        match self.link {
            TwinLink::Original(id) => Some(id),
            _ => None,
        }
    }

    /// The other half of a twin pair.
    pub fn counterpart(&self) -> Option<WindowId> {
        match self.link {
            TwinLink::Twin(id) | TwinLink::Original(id) => Some(id),
            TwinLink::None => None,
        }
    }

    pub(crate) fn set_link(&mut self, link: TwinLink) {
        self.link = link;
    }

    pub fn mode(&self) -> WindowMode {
        self.modes.mode()
    }

    pub fn saved_geometry(&self) -> Option<SavedGeometry> {
        self.modes.saved()
    }

    pub fn resume_mode(&self) -> WindowMode {
        self.modes.resume_mode()
    }

    pub(crate) fn plan_mode(&self, target: WindowMode) -> ModeTransition {
        self.modes.plan(target, self.flags.contains(WindowFlags::RESIZABLE))
    }

    pub fn surface(&self, role: SurfaceRole) -> &OverlaySurface {
        match role {
            SurfaceRole::Primary => &self.primary,
            SurfaceRole::Proxy => &self.proxy,
            SurfaceRole::Icon => &self.icon,
        }
    }

    fn surface_mut(&mut self, role: SurfaceRole) -> &mut OverlaySurface {
        match role {
            SurfaceRole::Primary => &mut self.primary,
            SurfaceRole::Proxy => &mut self.proxy,
            SurfaceRole::Icon => &mut self.icon,
        }
    }

    pub fn set_drag_filter(&mut self, role: SurfaceRole, filter: Option<Box<dyn DragFilter>>) {
        self.surface_mut(role).set_drag_filter(filter);
    }

    pub fn set_drag_listener(&mut self, role: SurfaceRole, listener: Option<Box<dyn DragListener>>) {
        self.surface_mut(role).set_drag_listener(listener);
    }

    // ---- flags ----

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    /// Returns whether any of `flags` is set.
    pub fn has_flags(&self, flags: WindowFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn set_flags(&mut self, host: &mut dyn Host, flags: WindowFlags) {
        self.flags = flags;
        self.apply_flags(host);
    }

    pub fn add_flags(&mut self, host: &mut dyn Host, flags: WindowFlags) {
        self.set_flags(host, self.flags | flags);
    }

    pub fn remove_flags(&mut self, host: &mut dyn Host, flags: WindowFlags) {
        self.set_flags(host, self.flags - flags);
    }

    pub fn clear_flags(&mut self, host: &mut dyn Host) {
        self.set_flags(host, WindowFlags::empty());
    }

    fn apply_flags(&mut self, host: &mut dyn Host) {
        let draggable = !self.flags.contains(WindowFlags::NOT_DRAGGABLE);
        for surface in [&mut self.primary, &mut self.proxy] {
            if draggable {
                surface.add_flags(host, SurfaceFlags::DRAGGABLE);
            } else {
                surface.remove_flags(host, SurfaceFlags::DRAGGABLE);
            }
        }
        let (width, height) = (self.width, self.height);
        self.set_width(host, width);
        self.set_height(host, height);
        self.refresh_attachment(host);
    }

    // ---- geometry ----

    /// Height of the action bar as drawn, zero when it is hidden.
    pub fn action_bar_height(&self) -> i32 {
        if self.flags.contains(WindowFlags::NO_ACTION_BAR) {
            0
        } else {
            self.chrome.action_bar_height
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    pub fn geometry(&self) -> FloatRect {
        FloatRect::new(self.x, self.y, self.width, self.height)
    }

    /// Rectangle of the primary and proxy surfaces, chrome included.
    pub fn surface_rect(&self) -> FloatRect {
        let p = self.chrome.padding;
        FloatRect::new(
            self.x.saturating_sub(p),
            self.y.saturating_sub(p),
            self.width.saturating_add(p * 2),
            self.height
                .saturating_add(self.action_bar_height())
                .saturating_add(p * 2),
        )
    }

    pub fn content_rect(&self) -> FloatRect {
        FloatRect::new(
            self.x,
            self.y.saturating_add(self.action_bar_height()),
            self.width,
            self.height,
        )
    }

    pub fn set_x(&mut self, host: &mut dyn Host, x: i32) {
        let screen = Screen::query(host);
        self.x = if self.mode() == WindowMode::Maximized {
            0
        } else if self.flags.contains(WindowFlags::NO_LIMITS) {
            x
        } else {
            clamp_window_x(x, self.width, screen.width)
        };
        self.sync_surfaces(host);
    }

    pub fn set_y(&mut self, host: &mut dyn Host, y: i32) {
        let screen = Screen::query(host);
        self.y = if self.mode() == WindowMode::Maximized {
            0
        } else if self.flags.contains(WindowFlags::NO_LIMITS) {
            y
        } else {
            clamp_window_y(y, self.height, screen.height)
        };
        self.sync_surfaces(host);
    }

    pub fn set_position(&mut self, host: &mut dyn Host, x: i32, y: i32) {
        self.set_x(host, x);
        self.set_y(host, y);
    }

    pub fn set_width(&mut self, host: &mut dyn Host, width: i32) {
        let screen = Screen::query(host);
        self.width = clamp_window_width(width, self.min_width, screen.width);
        self.sync_surfaces(host);
    }

    pub fn set_height(&mut self, host: &mut dyn Host, height: i32) {
        let screen = Screen::query(host);
        self.height = clamp_window_height(
            height,
            self.min_height,
            screen.height,
            screen.status_bar_height,
        );
        self.sync_surfaces(host);
    }

    pub fn set_size(&mut self, host: &mut dyn Host, width: i32, height: i32) {
        self.set_width(host, width);
        self.set_height(host, height);
    }

    pub fn set_min_width(&mut self, host: &mut dyn Host, min_width: i32) {
        self.min_width = by_interval(min_width, Some(self.chrome.min_width_floor()), None);
        let width = self.width;
        self.set_width(host, width);
    }

    pub fn set_min_height(&mut self, host: &mut dyn Host, min_height: i32) {
        self.min_height = by_interval(min_height, Some(self.chrome.min_height_floor()), None);
        let height = self.height;
        self.set_height(host, height);
    }

    pub fn set_position_by_gravity(&mut self, host: &mut dyn Host, gravity: Gravity) {
        let screen = Screen::query(host);
        let x = if gravity.contains(Gravity::RIGHT) {
            screen.width - self.width
        } else if gravity.contains(Gravity::CENTER_HORIZONTAL) {
            (screen.width - self.width) / 2
        } else {
            0
        };
        let free_height =
            screen.height - screen.status_bar_height - self.height - self.action_bar_height();
        let y = if gravity.contains(Gravity::BOTTOM) {
            free_height
        } else if gravity.contains(Gravity::CENTER_VERTICAL) {
            free_height / 2
        } else {
            0
        };
        self.set_position(host, x, y);
    }

    fn sync_surfaces(&mut self, host: &mut dyn Host) {
        let rect = self.surface_rect();
        self.primary.set_rect(host, rect);
        self.proxy.set_rect(host, rect);
    }

    /// Re-run every setter with the current values so the geometry is clamped
    /// against the current screen.
    pub(crate) fn reapply_geometry(&mut self, host: &mut dyn Host) {
        if self.mode() == WindowMode::Maximized {
            self.apply_maximized_geometry(host);
            return;
        }
        let FloatRect {
            x,
            y,
            width,
            height,
        } = self.geometry();
        self.set_width(host, width);
        self.set_height(host, height);
        self.set_x(host, x);
        self.set_y(host, y);
    }

    fn apply_saved(&mut self, host: &mut dyn Host, saved: SavedGeometry) {
        self.set_width(host, saved.width);
        self.set_height(host, saved.height);
        self.set_x(host, saved.x);
        self.set_y(host, saved.y);
    }

    fn apply_maximized_geometry(&mut self, host: &mut dyn Host) {
        let screen = Screen::query(host);
        let height = screen.height - self.action_bar_height() * 2 - self.chrome.padding * 2;
        self.set_width(host, screen.width);
        self.set_height(host, height);
        self.set_x(host, 0);
        self.set_y(host, 0);
    }

    // ---- modes ----

    pub(crate) fn maximize(&mut self, host: &mut dyn Host) {
        let FloatRect {
            x,
            y,
            width,
            height,
        } = self.geometry();
        self.modes.enter_maximized(x, y, width, height);
        self.apply_maximized_geometry(host);
    }

    pub(crate) fn restore(&mut self, host: &mut dyn Host) {
        if let Some(saved) = self.modes.enter_restored() {
            self.apply_saved(host, saved);
        }
    }

    /// Enter MINIMIZED from RESTORED, remembering `resume` for the way back.
    pub(crate) fn minimize(&mut self, host: &mut dyn Host, resume: WindowMode) {
        let FloatRect {
            x,
            y,
            width,
            height,
        } = self.geometry();
        self.modes.enter_minimized(x, y, width, height, resume);

        let screen = Screen::query(host);
        let size = self.chrome.icon_size();
        let icon_x = if x > screen.width.saturating_sub(x.saturating_add(width)) {
            screen.width
        } else {
            0
        };
        self.icon_pressed = false;
        self.icon.set_rect(host, FloatRect::new(icon_x, y, size, size));
        self.refresh_attachment(host);
    }

    /// Leave MINIMIZED into RESTORED with the pre-minimize geometry.
    pub(crate) fn unminimize(&mut self, host: &mut dyn Host) {
        self.restore(host);
        self.refresh_attachment(host);
    }

    /// Bookkeeping-only return from MINIMIZED, used when a minimized window
    /// closes.
    pub(crate) fn resume_silently(&mut self, host: &mut dyn Host) {
        if self.mode() != WindowMode::Minimized {
            return;
        }
        let resume = self.modes.resume_mode();
        self.restore(host);
        if resume == WindowMode::Maximized && self.flags.contains(WindowFlags::RESIZABLE) {
            self.maximize(host);
        }
    }

    // ---- lifecycle ----

    /// Whether the live primary surface stays attached while unfocused.
    fn stays_live(&self) -> bool {
        self.focused || self.is_twin() || self.flags.contains(WindowFlags::KEEP_ALIVE_ON_UNFOCUS)
    }

    /// Attach exactly the surface the current state calls for. New surfaces
    /// are attached before old ones are detached.
    pub(crate) fn refresh_attachment(&mut self, host: &mut dyn Host) {
        if !self.open {
            return;
        }
        // Outgoing surfaces stay on screen when the host refuses the new one.
        if self.mode() == WindowMode::Minimized {
            if self.icon.create(host) {
                self.primary.destroy(host, false);
                self.proxy.destroy(host, false);
            }
            return;
        }
        let (incoming, outgoing) = if self.stays_live() {
            (&mut self.primary, &mut self.proxy)
        } else {
            (&mut self.proxy, &mut self.primary)
        };
        if incoming.create(host) {
            outgoing.destroy(host, false);
            self.icon.destroy(host, false);
        }
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.open = open;
        if !open {
            self.focused = false;
            self.interaction = Interaction::Idle;
        }
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub(crate) fn has_attached_surface(&self) -> bool {
        self.primary.is_attached() || self.proxy.is_attached() || self.icon.is_attached()
    }

    /// Drop focus without leaving the screen: a snapshot proxy replaces the
    /// primary surface unless the window keeps its live surface.
    pub(crate) fn unfocus_surfaces(&mut self, host: &mut dyn Host) {
        self.focused = false;
        if !self.stays_live() {
            self.capture_into_proxy(host);
        }
        self.refresh_attachment(host);
    }

    pub(crate) fn detach_all(&mut self, host: &mut dyn Host, immediate: bool) {
        self.interaction = Interaction::Idle;
        self.primary.destroy(host, immediate);
        self.proxy.destroy(host, immediate);
        self.icon.destroy(host, immediate);
    }

    /// Capture the live surface into the proxy. A blank image of the surface
    /// size is used when nothing can be captured.
    pub(crate) fn capture_into_proxy(&mut self, host: &mut dyn Host) {
        let rect = self.surface_rect();
        let blank = || Snapshot::blank(rect.width, rect.height);
        let snapshot = match self.primary.handle() {
            Some(handle) => host.capture_visual_snapshot(handle).unwrap_or_else(|err| {
                tracing::warn!(window_id = ?self.id, %err, "snapshot capture failed");
                blank()
            }),
            None => blank(),
        };
        self.proxy.set_content(host, SurfaceContent::Image(snapshot));
    }

    pub(crate) fn mirror_state(&self) -> MirrorState {
        MirrorState {
            geometry: self.geometry(),
            min_width: self.min_width,
            min_height: self.min_height,
            title: self.title.clone(),
            style: self.style,
            flags: self.flags,
            modes: self.modes,
        }
    }

    /// Take over everything an original window shows, ready to open in its
    /// place.
    pub(crate) fn apply_mirror_state(&mut self, host: &mut dyn Host, state: MirrorState) {
        self.flags = state.flags | WindowFlags::NO_OPEN_ANIMATION;
        self.title = state.title;
        self.style = state.style;
        self.modes.mirror(&state.modes);
        self.min_width = state.min_width;
        self.min_height = state.min_height;
        self.apply_flags(host);
        self.adopt_geometry(host, state.geometry);
    }

    pub(crate) fn adopt_geometry(&mut self, host: &mut dyn Host, geometry: FloatRect) {
        self.set_size(host, geometry.width, geometry.height);
        self.set_position(host, geometry.x, geometry.y);
    }

    // ---- gestures ----

    pub fn hit_test(&self, touch: Point) -> HitRegion {
        let rect = self.surface_rect();
        if !rect.contains(touch) {
            return HitRegion::Outside;
        }
        let anchor = self.chrome.action_bar_height;
        if self.flags.contains(WindowFlags::RESIZABLE)
            && touch.x >= rect.right() - anchor
            && touch.y >= rect.bottom() - anchor
        {
            return HitRegion::ResizeAnchor;
        }
        if self.content_rect().contains(touch) {
            HitRegion::Content
        } else {
            HitRegion::Chrome
        }
    }

    pub(crate) fn handle_gesture(
        &mut self,
        host: &mut dyn Host,
        role: SurfaceRole,
        gesture: Gesture,
    ) -> GestureOutcome {
        match role {
            SurfaceRole::Primary => self.primary_gesture(host, gesture),
            SurfaceRole::Proxy => self.proxy_gesture(host, gesture),
            SurfaceRole::Icon => self.icon_gesture(host, gesture),
        }
    }

    fn primary_gesture(&mut self, host: &mut dyn Host, gesture: Gesture) -> GestureOutcome {
        if !self.primary.is_attached() {
            self.interaction = Interaction::Idle;
            return GestureOutcome::None;
        }
        if let Gesture::Down(touch) = gesture {
            match self.hit_test(touch) {
                HitRegion::ResizeAnchor => {
                    if self.mode() == WindowMode::Maximized {
                        self.restore(host);
                    }
                    self.interaction = Interaction::Resizing {
                        start: self.geometry(),
                        anchor_touch: touch,
                    };
                    tracing::trace!(window_id = ?self.id, "resize start");
                    return self.live_touch_focus();
                }
                HitRegion::Chrome => {}
                HitRegion::Content if self.flags.contains(WindowFlags::DRAGGABLE_BY_CONTENT) => {}
                HitRegion::Content | HitRegion::Outside => return GestureOutcome::None,
            }
        }
        if let Interaction::Resizing {
            start,
            anchor_touch,
        } = self.interaction
        {
            return self.resize_gesture(host, gesture, start, anchor_touch);
        }

        match self.primary.handle_gesture(host, gesture) {
            DragStep::Started { .. } => {
                self.interaction = Interaction::Moving;
                self.live_touch_focus()
            }
            DragStep::Moved {
                touch,
                proposed,
                accepted: true,
            } => {
                let p = self.chrome.padding;
                self.set_x(host, proposed.x.saturating_add(p));
                self.set_y(host, proposed.y.saturating_add(p));
                if self.flags.contains(WindowFlags::NOT_RESIZABLE_BY_MOTION) {
                    return GestureOutcome::None;
                }
                let status_bar = host.status_bar_height();
                match edge_snap(touch.y, status_bar, self.mode()) {
                    Some(WindowMode::Restored) => {
                        self.modes.override_saved_y(touch.y);
                        GestureOutcome::SetMode(WindowMode::Restored)
                    }
                    Some(target) => GestureOutcome::SetMode(target),
                    None => GestureOutcome::None,
                }
            }
            DragStep::Stopped { .. } => {
                self.interaction = Interaction::Idle;
                match self.link {
                    TwinLink::Original(original) => GestureOutcome::FocusOriginal(original),
                    _ => GestureOutcome::None,
                }
            }
            DragStep::Tapped { .. } => match self.link {
                TwinLink::Original(original) => GestureOutcome::FocusOriginal(original),
                _ if !self.focused => GestureOutcome::Focus,
                _ => GestureOutcome::None,
            },
            DragStep::Moved { .. } | DragStep::Ignored => GestureOutcome::None,
        }
    }

    /// Touching the live surface of an unfocused keep-alive window focuses it.
    fn live_touch_focus(&self) -> GestureOutcome {
        if !self.focused
            && !self.is_twin()
            && self.flags.contains(WindowFlags::KEEP_ALIVE_ON_UNFOCUS)
        {
            GestureOutcome::Focus
        } else {
            GestureOutcome::None
        }
    }

    fn resize_gesture(
        &mut self,
        host: &mut dyn Host,
        gesture: Gesture,
        start: FloatRect,
        anchor_touch: Point,
    ) -> GestureOutcome {
        match gesture {
            Gesture::Move(touch) => {
                let delta = Point::new(
                    touch.x.saturating_sub(anchor_touch.x),
                    touch.y.saturating_sub(anchor_touch.y),
                );
                let next = apply_resize_drag(
                    start,
                    ResizeEdge::BottomRight,
                    delta,
                    self.min_width,
                    self.min_height,
                );
                self.set_size(host, next.width, next.height);
                tracing::trace!(window_id = ?self.id, width = self.width, height = self.height, "resize move");
            }
            Gesture::Up(_) => {
                self.interaction = Interaction::Idle;
            }
            Gesture::Down(_) | Gesture::Tap(_) => {}
        }
        GestureOutcome::None
    }

    fn proxy_gesture(&mut self, host: &mut dyn Host, gesture: Gesture) -> GestureOutcome {
        let touch_focus = !self.flags.contains(WindowFlags::NO_FOCUS_ON_TOUCH);
        match self.proxy.handle_gesture(host, gesture) {
            DragStep::Started { .. } if touch_focus => GestureOutcome::UnfocusTop,
            DragStep::Moved {
                proposed,
                accepted: true,
                ..
            } => {
                let p = self.chrome.padding;
                self.set_x(host, proposed.x.saturating_add(p));
                self.set_y(host, proposed.y.saturating_add(p));
                GestureOutcome::None
            }
            DragStep::Stopped { .. } | DragStep::Tapped { .. } if touch_focus => {
                GestureOutcome::Focus
            }
            _ => GestureOutcome::None,
        }
    }

    fn icon_gesture(&mut self, host: &mut dyn Host, gesture: Gesture) -> GestureOutcome {
        let inset = self.icon_press_inset;
        match self.icon.handle_gesture(host, gesture) {
            DragStep::Started { .. } => {
                let rect = self.icon.rect();
                self.icon.set_size(host, rect.width - inset * 2, rect.height - inset * 2);
                self.icon.set_position(host, rect.x + inset, rect.y + inset);
                self.icon_pressed = true;
                GestureOutcome::None
            }
            DragStep::Stopped { .. } => {
                if self.icon_pressed {
                    let rect = self.icon.rect();
                    self.icon.set_size(host, rect.width + inset * 2, rect.height + inset * 2);
                    self.icon_pressed = false;
                }
                GestureOutcome::None
            }
            DragStep::Tapped { .. } => GestureOutcome::SetMode(self.modes.resume_mode()),
            DragStep::Moved { .. } | DragStep::Ignored => GestureOutcome::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;

    fn window(flags: WindowFlags) -> OverlayWindow {
        OverlayWindow::new(
            WindowId(1),
            Box::new(PlainWindow),
            WindowOptions::new()
                .with_min_size(200, 150)
                .with_flags(flags),
            ChromeMetrics::default(),
            5,
        )
    }

    #[test]
    fn default_options_carry_no_flags() {
        let options = WindowOptions::default();
        assert_eq!(options.flags, WindowFlags::empty());
        assert!(options.title.is_none());
    }

    #[test]
    fn min_sizes_respect_chrome_floor() {
        let w = OverlayWindow::new(
            WindowId(1),
            Box::new(PlainWindow),
            WindowOptions::new(),
            ChromeMetrics::default(),
            5,
        );
        assert_eq!(w.min_width(), 40 * 3 + 16 + 50);
        assert_eq!(w.min_height(), 40 * 2 + 16 + 5);
        assert_eq!(w.title(), "Floating Window");
    }

    #[test]
    fn surface_rect_wraps_content_with_chrome() {
        let mut host = HeadlessHost::default();
        let mut w = window(WindowFlags::empty());
        w.set_position(&mut host, 100, 200);
        assert_eq!(w.surface_rect(), FloatRect::new(92, 192, 216, 206));
        w.add_flags(&mut host, WindowFlags::NO_ACTION_BAR);
        assert_eq!(w.surface_rect(), FloatRect::new(92, 192, 216, 166));
    }

    #[test]
    fn setters_clamp_to_window_bounds() {
        let mut host = HeadlessHost::new(1080, 1920, 24);
        let mut w = window(WindowFlags::empty());
        w.set_width(&mut host, 10);
        assert_eq!(w.width(), 200);
        w.set_width(&mut host, 100_000);
        assert_eq!(w.width(), 1080 + 200 / 3 * 4);
        w.set_height(&mut host, 100_000);
        assert_eq!(w.height(), 1920 - 24);
        w.set_size(&mut host, 300, 300);
        w.set_x(&mut host, -10_000);
        assert_eq!(w.x(), -(300 - 100));
        w.set_x(&mut host, 10_000);
        assert_eq!(w.x(), 1080 - 100);
        w.set_y(&mut host, -5);
        assert_eq!(w.y(), 0);
        w.set_y(&mut host, 10_000);
        assert_eq!(w.y(), 1920 - 150);
    }

    #[test]
    fn no_limits_skips_position_clamp() {
        let mut host = HeadlessHost::default();
        let mut w = window(WindowFlags::NO_LIMITS);
        w.set_position(&mut host, -5000, 9000);
        assert_eq!((w.x(), w.y()), (-5000, 9000));
    }

    #[test]
    fn maximize_then_restore_is_exact() {
        let mut host = HeadlessHost::default();
        let mut w = window(WindowFlags::RESIZABLE);
        w.set_size(&mut host, 333, 222);
        w.set_position(&mut host, 17, 41);
        w.maximize(&mut host);
        assert_eq!(w.geometry(), FloatRect::new(0, 0, 1080, 1920 - 80 - 16));
        w.restore(&mut host);
        assert_eq!(w.geometry(), FloatRect::new(17, 41, 333, 222));
        assert_eq!(w.mode(), WindowMode::Restored);
    }

    #[test]
    fn gravity_places_window() {
        let mut host = HeadlessHost::new(1000, 1000, 20);
        let mut w = window(WindowFlags::empty());
        w.set_size(&mut host, 200, 150);
        w.set_position_by_gravity(&mut host, Gravity::CENTER);
        assert_eq!((w.x(), w.y()), (400, (1000 - 20 - 150 - 40) / 2));
        w.set_position_by_gravity(&mut host, Gravity::RIGHT | Gravity::BOTTOM);
        assert_eq!((w.x(), w.y()), (800, 1000 - 20 - 150 - 40));
        w.set_position_by_gravity(&mut host, Gravity::empty());
        assert_eq!((w.x(), w.y()), (0, 0));
    }

    #[test]
    fn hit_test_distinguishes_regions() {
        let mut host = HeadlessHost::default();
        let mut w = window(WindowFlags::RESIZABLE);
        w.set_position(&mut host, 100, 100);
        // surface spans (92, 92) .. (308, 298)
        assert_eq!(w.hit_test(Point::new(10, 10)), HitRegion::Outside);
        assert_eq!(w.hit_test(Point::new(150, 110)), HitRegion::Chrome);
        assert_eq!(w.hit_test(Point::new(150, 200)), HitRegion::Content);
        assert_eq!(w.hit_test(Point::new(300, 290)), HitRegion::ResizeAnchor);
        w.remove_flags(&mut host, WindowFlags::RESIZABLE);
        assert_eq!(w.hit_test(Point::new(300, 290)), HitRegion::Chrome);
    }

    #[test]
    fn minimize_places_icon_at_nearer_edge() {
        let mut host = HeadlessHost::default();
        let mut w = window(WindowFlags::empty());
        w.set_position(&mut host, 800, 300);
        w.minimize(&mut host, WindowMode::Restored);
        let icon = w.surface(SurfaceRole::Icon).rect();
        assert_eq!(icon.width, 90);
        assert_eq!((icon.x, icon.y), (1080 - 90, 300));
        assert_eq!(w.mode(), WindowMode::Minimized);
        w.unminimize(&mut host);
        assert_eq!(w.geometry(), FloatRect::new(800, 300, 200, 150));
    }
}
