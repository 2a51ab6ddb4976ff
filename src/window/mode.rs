//! Restore / maximize / minimize bookkeeping.
//!
//! `ModeController` only tracks state; the geometry it saves and hands back
//! is applied by the window, and the focus side effects of minimizing are
//! driven by the shell.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Restored,
    Maximized,
    Minimized,
}

/// Geometry captured when a window leaves RESTORED.
///
/// `mode` is the mode to return to when the window leaves MINIMIZED: the
/// mode the window was in right before it was minimized, or MAXIMIZED while
/// the window is maximized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub mode: WindowMode,
}

/// What the window must do to move from its current mode to a requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Already there; re-apply the current geometry.
    Stay,
    Maximize,
    /// Maximize was requested on a window that cannot resize.
    Reject,
    Restore,
    Minimize,
    /// Leave MINIMIZED, then continue towards `target`.
    Unminimize { target: WindowMode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeController {
    mode: WindowMode,
    saved: Option<SavedGeometry>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn saved(&self) -> Option<SavedGeometry> {
        self.saved
    }

    /// Mode a minimized window returns to when its icon is tapped.
    pub fn resume_mode(&self) -> WindowMode {
        self.saved
            .map(|saved| saved.mode)
            .unwrap_or(WindowMode::Restored)
    }

    pub fn plan(&self, target: WindowMode, resizable: bool) -> ModeTransition {
        use WindowMode::*;
        match (self.mode, target) {
            (Minimized, Minimized) | (Restored, Restored) | (Maximized, Maximized) => {
                ModeTransition::Stay
            }
            (Restored, Maximized) if resizable => ModeTransition::Maximize,
            (Restored, Maximized) => ModeTransition::Reject,
            (Maximized, Restored) => ModeTransition::Restore,
            (Restored | Maximized, Minimized) => ModeTransition::Minimize,
            (Minimized, target) => ModeTransition::Unminimize { target },
        }
    }

    /// Save `geometry` and enter MAXIMIZED.
    pub fn enter_maximized(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.saved = Some(SavedGeometry {
            x,
            y,
            width,
            height,
            mode: WindowMode::Maximized,
        });
        self.mode = WindowMode::Maximized;
    }

    /// Enter RESTORED and hand back the geometry to re-apply, if any.
    pub fn enter_restored(&mut self) -> Option<SavedGeometry> {
        self.mode = WindowMode::Restored;
        self.saved.take()
    }

    /// Save the restored `geometry` and enter MINIMIZED, remembering `resume`
    /// as the mode to come back to.
    pub fn enter_minimized(&mut self, x: i32, y: i32, width: i32, height: i32, resume: WindowMode) {
        self.saved = Some(SavedGeometry {
            x,
            y,
            width,
            height,
            mode: resume,
        });
        self.mode = WindowMode::Minimized;
    }

    /// Replace the saved vertical origin, used when a drag pulls a maximized
    /// window back down so it restores under the pointer.
    pub fn override_saved_y(&mut self, y: i32) {
        if let Some(saved) = self.saved.as_mut() {
            saved.y = y;
        }
    }

    /// Copy the mode and saved geometry of another controller.
    pub fn mirror(&mut self, other: &ModeController) {
        *self = *other;
    }
}

/// Mode change implied by a drag crossing the status-bar boundary.
pub fn edge_snap(touch_y: i32, status_bar_height: i32, mode: WindowMode) -> Option<WindowMode> {
    match mode {
        WindowMode::Maximized if touch_y > status_bar_height => Some(WindowMode::Restored),
        WindowMode::Restored if touch_y <= status_bar_height => Some(WindowMode::Maximized),
        _ => None,
    }
}
