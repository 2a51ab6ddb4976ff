//! Shared crate-wide constants.

/// Cadence of the maintenance tick delivered to every live window.
///
/// Units: milliseconds. Ticks are idempotent, so host scheduling jitter is
/// harmless.
pub const TICK_INTERVAL_MS: u64 = 500;

/// Inset (in device pixels) between a window's surface edge and its content
/// rectangle on every side. The shadow/border lives in this band.
pub const CHROME_PADDING: i32 = 8;

/// Default height of the action bar (title bar) in device pixels.
pub const ACTION_BAR_HEIGHT: i32 = 40;

/// Extra width (beyond three action-bar heights and the padding) that every
/// window keeps as its minimum width so the title and controls fit.
pub const MIN_WIDTH_EXTRA: i32 = 50;

/// Extra height (beyond two action-bar heights and the padding) that every
/// window keeps as its minimum height.
pub const MIN_HEIGHT_EXTRA: i32 = 5;

/// Extra size (in device pixels) added to twice the action-bar height to
/// size the minimized icon surface.
pub const ICON_EXTRA: i32 = 10;

/// How far the minimized icon shrinks on each side while it is pressed.
pub const ICON_PRESS_INSET: i32 = 5;
