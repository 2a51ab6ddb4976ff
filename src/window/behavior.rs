//! Lifecycle hooks implemented by concrete window kinds.
//!
//! The shell invokes these in a fixed order after it has committed the
//! corresponding state change, so implementations never need to chain up to
//! a base implementation.

use std::any::Any;

use super::{WindowFlags, WindowId};

/// Snapshot of the window state handed to lifecycle hooks.
#[derive(Debug, Clone, Copy)]
pub struct WindowContext {
    id: WindowId,
    flags: WindowFlags,
    open: bool,
    focused: bool,
    twin: bool,
}

impl WindowContext {
    pub const fn new(id: WindowId, flags: WindowFlags) -> Self {
        Self {
            id,
            flags,
            open: false,
            focused: false,
            twin: false,
        }
    }

    pub const fn id(&self) -> WindowId {
        self.id
    }

    pub const fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub const fn open(&self) -> bool {
        self.open
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    /// Returns whether the window is the background twin of another window.
    pub const fn is_twin(&self) -> bool {
        self.twin
    }

    pub const fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub const fn with_twin(mut self, twin: bool) -> Self {
        self.twin = twin;
        self
    }
}

/// Downcasting support for boxed behaviors.
///
/// Call through `&dyn WindowBehavior` (`boxed.as_ref().as_any()`); calling on
/// the `Box` itself resolves to the box's own `Any` impl.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait WindowBehavior: AsAny + std::fmt::Debug {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    /// Flags every window of this kind starts with.
    fn default_flags(&self) -> WindowFlags {
        WindowFlags::empty()
    }

    /// Title used when the embedder does not pass one.
    fn default_title(&self) -> &'static str {
        "Floating Window"
    }

    fn on_open(&mut self, _ctx: &WindowContext) {}
    fn on_close(&mut self, _ctx: &WindowContext) {}
    fn on_focus(&mut self, _ctx: &WindowContext) {}
    fn on_unfocus(&mut self, _ctx: &WindowContext) {}
    fn on_tick(&mut self, _ctx: &WindowContext) {}

    /// Build the behavior for a background twin. Kinds returning `Some`
    /// survive focus loss by swapping into that twin instead of a snapshot.
    ///
    /// Only called for windows that are not twins themselves.
    fn create_twin(&self) -> Option<Box<dyn WindowBehavior>> {
        None
    }

    /// Copy whatever content state must survive a swap into `counterpart`.
    fn mirror_into(&self, _counterpart: &mut dyn WindowBehavior) {}

    /// Natural size of the content, when the kind has one.
    fn content_size(&self) -> Option<(i32, i32)> {
        None
    }
}

/// A window with no content of its own.
#[derive(Debug, Default)]
pub struct PlainWindow;

impl WindowBehavior for PlainWindow {
    fn kind(&self) -> &'static str {
        "plain"
    }
}

/// A window that keeps its live surface across focus loss by swapping into a
/// background twin.
#[derive(Debug, Default)]
pub struct SwapWindow;

impl WindowBehavior for SwapWindow {
    fn kind(&self) -> &'static str {
        "swap"
    }

    fn default_flags(&self) -> WindowFlags {
        WindowFlags::KEEP_ALIVE_ON_UNFOCUS
    }

    fn create_twin(&self) -> Option<Box<dyn WindowBehavior>> {
        Some(Box::new(SwapWindow))
    }
}
