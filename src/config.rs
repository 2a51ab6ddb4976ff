use std::time::Duration;

use crate::constants::{
    ACTION_BAR_HEIGHT, CHROME_PADDING, ICON_EXTRA, ICON_PRESS_INSET, MIN_HEIGHT_EXTRA,
    MIN_WIDTH_EXTRA, TICK_INTERVAL_MS,
};

/// Sizes of the window decoration that geometry is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeMetrics {
    pub padding: i32,
    pub action_bar_height: i32,
}

impl Default for ChromeMetrics {
    fn default() -> Self {
        Self {
            padding: CHROME_PADDING,
            action_bar_height: ACTION_BAR_HEIGHT,
        }
    }
}

impl ChromeMetrics {
    /// Smallest permitted content width for any window.
    pub fn min_width_floor(&self) -> i32 {
        self.action_bar_height * 3 + self.padding * 2 + MIN_WIDTH_EXTRA
    }

    /// Smallest permitted content height for any window.
    pub fn min_height_floor(&self) -> i32 {
        self.action_bar_height * 2 + self.padding * 2 + MIN_HEIGHT_EXTRA
    }

    /// Edge length of the square minimized icon.
    pub fn icon_size(&self) -> i32 {
        self.action_bar_height * 2 + ICON_EXTRA
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellConfig {
    pub tick_interval: Duration,
    pub chrome: ChromeMetrics,
    pub icon_press_inset: i32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            chrome: ChromeMetrics::default(),
            icon_press_inset: ICON_PRESS_INSET,
        }
    }
}

impl ShellConfig {
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_chrome(mut self, chrome: ChromeMetrics) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn with_icon_press_inset(mut self, inset: i32) -> Self {
        self.icon_press_inset = inset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_floors_follow_action_bar() {
        let chrome = ChromeMetrics::default();
        assert_eq!(chrome.min_width_floor(), 40 * 3 + 16 + 50);
        assert_eq!(chrome.min_height_floor(), 40 * 2 + 16 + 5);
        assert_eq!(chrome.icon_size(), 90);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ShellConfig::default()
            .with_tick_interval(Duration::from_millis(16))
            .with_icon_press_inset(1);
        assert_eq!(cfg.tick_interval, Duration::from_millis(16));
        assert_eq!(cfg.icon_press_inset, 1);
        assert_eq!(cfg.chrome, ChromeMetrics::default());
    }
}
