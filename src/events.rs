//! Lifecycle notifications for embedders.
//!
//! Events are delivered after the state change they describe has been
//! committed, so listeners always observe the new state.

use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Open,
    Close,
    Focus,
    Unfocus,
    Tick,
}

pub trait WindowListener {
    fn on_open(&mut self, _window: WindowId) {}
    fn on_close(&mut self, _window: WindowId) {}
    fn on_focus(&mut self, _window: WindowId) {}
    fn on_unfocus(&mut self, _window: WindowId) {}
    fn on_tick(&mut self, _window: WindowId) {}

    fn notify(&mut self, window: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::Open => self.on_open(window),
            WindowEvent::Close => self.on_close(window),
            WindowEvent::Focus => self.on_focus(window),
            WindowEvent::Unfocus => self.on_unfocus(window),
            WindowEvent::Tick => self.on_tick(window),
        }
    }
}

impl<F> WindowListener for F
where
    F: FnMut(WindowId, WindowEvent),
{
    fn notify(&mut self, window: WindowId, event: WindowEvent) {
        self(window, event)
    }
}
