//! A single draggable rectangle attached to the host compositor.
//!
//! `OverlaySurface` owns the drag gesture state machine
//! (`Idle -> Dragging -> Idle`). Gesture handling is synchronous and never
//! touches the host except to apply an accepted position.

use bitflags::bitflags;

use crate::geometry::{FloatRect, Point, clamp_x, clamp_y};
use crate::host::{
    Host, Screen, SurfaceContent, SurfaceDescriptor, SurfaceHandle, SurfaceRole,
};
use crate::window::WindowId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceFlags: u8 {
        const DRAGGABLE = 1 << 0;
        /// Skip screen clamping entirely.
        const NO_LIMITS = 1 << 1;
        /// Allow sliding up under the status bar.
        const IN_SCREEN = 1 << 2;
    }
}

/// Single-pointer input delivered by the host to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Down(Point),
    Move(Point),
    Up(Point),
    /// A press and release without movement, as recognised by the host.
    Tap(Point),
}

/// Veto hook consulted on every drag move.
///
/// Returning `false` keeps the surface's logical position where it is while
/// the raw drag math keeps tracking the pointer.
pub trait DragFilter {
    fn apply(&mut self, touch: Point, proposed: Point) -> bool;
}

impl<F> DragFilter for F
where
    F: FnMut(Point, Point) -> bool,
{
    fn apply(&mut self, touch: Point, proposed: Point) -> bool {
        self(touch, proposed)
    }
}

pub trait DragListener {
    fn on_start_drag(&mut self, _touch: Point) {}
    fn on_stop_drag(&mut self, _touch: Point) {}
}

/// What a gesture did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStep {
    Ignored,
    Started {
        touch: Point,
    },
    Moved {
        touch: Point,
        proposed: Point,
        accepted: bool,
    },
    Stopped {
        touch: Point,
    },
    Tapped {
        touch: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging { anchor: Point, anchor_touch: Point },
}

pub struct OverlaySurface {
    window: WindowId,
    role: SurfaceRole,
    rect: FloatRect,
    flags: SurfaceFlags,
    content: SurfaceContent,
    handle: Option<SurfaceHandle>,
    drag: DragState,
    raw_position: Point,
    drag_filter: Option<Box<dyn DragFilter>>,
    drag_listener: Option<Box<dyn DragListener>>,
}

impl std::fmt::Debug for OverlaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlaySurface")
            .field("window", &self.window)
            .field("role", &self.role)
            .field("rect", &self.rect)
            .field("flags", &self.flags)
            .field("handle", &self.handle)
            .field("drag", &self.drag)
            .finish()
    }
}

impl OverlaySurface {
    pub fn new(window: WindowId, role: SurfaceRole, flags: SurfaceFlags) -> Self {
        let content = match role {
            SurfaceRole::Primary => SurfaceContent::Live,
            SurfaceRole::Proxy => SurfaceContent::Image(crate::host::Snapshot::blank(0, 0)),
            SurfaceRole::Icon => SurfaceContent::Icon,
        };
        Self {
            window,
            role,
            rect: FloatRect::default(),
            flags,
            content,
            handle: None,
            drag: DragState::Idle,
            raw_position: Point::default(),
            drag_filter: None,
            drag_listener: None,
        }
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.handle
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn rect(&self) -> FloatRect {
        self.rect
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.width
    }

    pub fn height(&self) -> i32 {
        self.rect.height
    }

    /// Last position computed by the drag math, whether or not it was accepted.
    pub fn raw_position(&self) -> Point {
        self.raw_position
    }

    pub fn flags(&self) -> SurfaceFlags {
        self.flags
    }

    pub fn has_flags(&self, flags: SurfaceFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn set_flags(&mut self, host: &mut dyn Host, flags: SurfaceFlags) {
        self.flags = flags;
        self.apply(host);
    }

    pub fn add_flags(&mut self, host: &mut dyn Host, flags: SurfaceFlags) {
        self.set_flags(host, self.flags | flags);
    }

    pub fn remove_flags(&mut self, host: &mut dyn Host, flags: SurfaceFlags) {
        self.set_flags(host, self.flags - flags);
    }

    pub fn set_drag_filter(&mut self, filter: Option<Box<dyn DragFilter>>) {
        self.drag_filter = filter;
    }

    pub fn set_drag_listener(&mut self, listener: Option<Box<dyn DragListener>>) {
        self.drag_listener = listener;
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    /// Replace what the host should draw. An attached surface is re-attached
    /// so the host picks the new content up.
    pub fn set_content(&mut self, host: &mut dyn Host, content: SurfaceContent) {
        self.content = content;
        if self.is_attached() {
            self.destroy(host, true);
            self.create(host);
        }
    }

    /// Attach to the host. Idempotent; a no-op without overlay permission.
    pub fn create(&mut self, host: &mut dyn Host) -> bool {
        if self.is_attached() {
            return true;
        }
        if !host.check_overlay_permission() {
            tracing::warn!(window_id = ?self.window, role = ?self.role, "overlay permission missing");
            return false;
        }
        let descriptor = SurfaceDescriptor {
            window: self.window,
            role: self.role,
            content: self.content.clone(),
        };
        match host.attach_surface(&descriptor, self.rect) {
            Ok(handle) => {
                tracing::trace!(window_id = ?self.window, role = ?self.role, %handle, "surface attached");
                self.handle = Some(handle);
                true
            }
            Err(err) => {
                tracing::warn!(window_id = ?self.window, role = ?self.role, %err, "surface attach failed");
                false
            }
        }
    }

    /// Detach from the host. Any gesture in flight is abandoned.
    pub fn destroy(&mut self, host: &mut dyn Host, immediate: bool) {
        self.drag = DragState::Idle;
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(err) = host.detach_surface(handle, immediate) {
            tracing::warn!(window_id = ?self.window, role = ?self.role, %err, "surface detach failed");
        }
    }

    pub fn set_position(&mut self, host: &mut dyn Host, x: i32, y: i32) {
        let screen = Screen::query(host);
        let no_limits = self.has_flags(SurfaceFlags::NO_LIMITS);
        self.rect.x = clamp_x(x, self.rect.width, screen.width, no_limits);
        self.rect.y = clamp_y(
            y,
            self.rect.height,
            screen.height,
            screen.status_bar_height,
            self.has_flags(SurfaceFlags::IN_SCREEN),
            no_limits,
        );
        self.apply(host);
    }

    pub fn set_size(&mut self, host: &mut dyn Host, width: i32, height: i32) {
        self.rect.width = width.max(0);
        self.rect.height = height.max(0);
        self.apply(host);
    }

    /// Resize first, then position, so the position clamp uses the new size.
    pub fn set_rect(&mut self, host: &mut dyn Host, rect: FloatRect) {
        self.rect.width = rect.width.max(0);
        self.rect.height = rect.height.max(0);
        self.set_position(host, rect.x, rect.y);
    }

    fn apply(&mut self, host: &mut dyn Host) {
        let Some(handle) = self.handle else {
            return;
        };
        if let Err(err) = host.update_surface_rect(handle, self.rect) {
            tracing::warn!(window_id = ?self.window, role = ?self.role, %err, "surface update failed");
        }
    }

    /// Run one step of the drag state machine.
    ///
    /// Gestures reaching a detached surface are ignored, so a window closed
    /// mid-drag never re-attaches itself.
    pub fn handle_gesture(&mut self, host: &mut dyn Host, gesture: Gesture) -> DragStep {
        if !self.is_attached() {
            self.drag = DragState::Idle;
            return DragStep::Ignored;
        }
        match gesture {
            Gesture::Tap(touch) => DragStep::Tapped { touch },
            Gesture::Down(touch) => {
                if !self.has_flags(SurfaceFlags::DRAGGABLE) {
                    return DragStep::Ignored;
                }
                let anchor = Point::new(self.rect.x, self.rect.y);
                self.drag = DragState::Dragging {
                    anchor,
                    anchor_touch: touch,
                };
                self.raw_position = anchor;
                if let Some(listener) = self.drag_listener.as_mut() {
                    listener.on_start_drag(touch);
                }
                DragStep::Started { touch }
            }
            Gesture::Move(touch) => {
                let DragState::Dragging {
                    anchor,
                    anchor_touch,
                } = self.drag
                else {
                    return DragStep::Ignored;
                };
                let proposed = Point::new(
                    anchor.x.saturating_add(touch.x.saturating_sub(anchor_touch.x)),
                    anchor.y.saturating_add(touch.y.saturating_sub(anchor_touch.y)),
                );
                self.raw_position = proposed;
                let accepted = self
                    .drag_filter
                    .as_mut()
                    .is_none_or(|filter| filter.apply(touch, proposed));
                if accepted {
                    self.set_position(host, proposed.x, proposed.y);
                }
                tracing::trace!(window_id = ?self.window, role = ?self.role, ?proposed, accepted, "drag move");
                DragStep::Moved {
                    touch,
                    proposed,
                    accepted,
                }
            }
            Gesture::Up(touch) => {
                if !self.is_dragging() {
                    return DragStep::Ignored;
                }
                self.drag = DragState::Idle;
                if let Some(listener) = self.drag_listener.as_mut() {
                    listener.on_stop_drag(touch);
                }
                DragStep::Stopped { touch }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::host::headless::HeadlessHost;

    fn attached(host: &mut HeadlessHost, flags: SurfaceFlags) -> OverlaySurface {
        let mut s = OverlaySurface::new(WindowId(7), SurfaceRole::Icon, flags);
        s.set_rect(host, FloatRect::new(100, 100, 90, 90));
        assert!(s.create(host));
        s
    }

    #[test]
    fn create_is_idempotent() {
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::DRAGGABLE);
        assert!(s.create(&mut host));
        assert_eq!(host.attach_count(WindowId(7), SurfaceRole::Icon), 1);
    }

    #[test]
    fn create_without_permission_is_noop() {
        let mut host = HeadlessHost::default();
        host.set_permission(false);
        let mut s = OverlaySurface::new(WindowId(7), SurfaceRole::Icon, SurfaceFlags::empty());
        assert!(!s.create(&mut host));
        assert!(!s.is_attached());
    }

    #[test]
    fn failed_attach_leaves_surface_detached() {
        let mut host = HeadlessHost::default();
        host.set_fail_attach(true);
        let mut s = OverlaySurface::new(WindowId(7), SurfaceRole::Icon, SurfaceFlags::empty());
        assert!(!s.create(&mut host));
        assert!(!s.is_attached());
    }

    #[test]
    fn drag_without_filter_follows_pointer() {
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::DRAGGABLE);
        s.handle_gesture(&mut host, Gesture::Down(Point::new(10, 10)));
        let step = s.handle_gesture(&mut host, Gesture::Move(Point::new(60, 40)));
        assert!(matches!(step, DragStep::Moved { accepted: true, .. }));
        assert_eq!((s.x(), s.y()), (150, 130));
        assert_eq!(
            host.rect_of(WindowId(7), SurfaceRole::Icon),
            Some(FloatRect::new(150, 130, 90, 90))
        );
    }

    #[test]
    fn filter_veto_tracks_raw_position_only() {
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::DRAGGABLE);
        s.set_drag_filter(Some(Box::new(|_touch: Point, proposed: Point| proposed.x < 120)));
        s.handle_gesture(&mut host, Gesture::Down(Point::new(0, 0)));
        s.handle_gesture(&mut host, Gesture::Move(Point::new(10, 0)));
        assert_eq!(s.x(), 110);
        let step = s.handle_gesture(&mut host, Gesture::Move(Point::new(50, 0)));
        assert!(matches!(step, DragStep::Moved { accepted: false, .. }));
        assert_eq!(s.x(), 110);
        assert_eq!(s.raw_position(), Point::new(150, 100));
    }

    #[test]
    fn not_draggable_ignores_down() {
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::empty());
        assert_eq!(
            s.handle_gesture(&mut host, Gesture::Down(Point::new(0, 0))),
            DragStep::Ignored
        );
        assert_eq!(
            s.handle_gesture(&mut host, Gesture::Move(Point::new(40, 0))),
            DragStep::Ignored
        );
    }

    #[test]
    fn listener_sees_start_and_stop() {
        #[derive(Default)]
        struct Record(Rc<RefCell<Vec<&'static str>>>);
        impl DragListener for Record {
            fn on_start_drag(&mut self, _touch: Point) {
                self.0.borrow_mut().push("start");
            }
            fn on_stop_drag(&mut self, _touch: Point) {
                self.0.borrow_mut().push("stop");
            }
        }
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::DRAGGABLE);
        s.set_drag_listener(Some(Box::new(Record(log.clone()))));
        s.handle_gesture(&mut host, Gesture::Down(Point::new(0, 0)));
        let before = s.rect();
        s.handle_gesture(&mut host, Gesture::Up(Point::new(3, 3)));
        assert_eq!(s.rect(), before);
        assert_eq!(*log.borrow(), vec!["start", "stop"]);
    }

    #[test]
    fn gestures_after_destroy_are_noops() {
        let mut host = HeadlessHost::default();
        let mut s = attached(&mut host, SurfaceFlags::DRAGGABLE);
        s.handle_gesture(&mut host, Gesture::Down(Point::new(0, 0)));
        s.destroy(&mut host, false);
        assert_eq!(
            s.handle_gesture(&mut host, Gesture::Move(Point::new(30, 30))),
            DragStep::Ignored
        );
        assert!(!s.is_attached());
        assert!(!host.is_attached(WindowId(7), SurfaceRole::Icon));
    }

    #[test]
    fn position_is_clamped_unless_no_limits() {
        let mut host = HeadlessHost::new(500, 500, 20);
        let mut s = attached(&mut host, SurfaceFlags::empty());
        s.set_position(&mut host, -50, 1000);
        assert_eq!((s.x(), s.y()), (0, 500 - 90 - 20));
        s.add_flags(&mut host, SurfaceFlags::NO_LIMITS);
        s.set_position(&mut host, -50, 1000);
        assert_eq!((s.x(), s.y()), (-50, 1000));
    }
}
