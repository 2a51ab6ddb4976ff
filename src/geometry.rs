//! Integer geometry and clamping helpers shared by surfaces and windows.
//!
//! Everything here is pure and total: there is no input (negative,
//! oversized, or inverted bounds) for which these functions panic.

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Signed rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Clamp `value` into `[min, max]`, checking the lower bound first.
///
/// Unlike [`i32::clamp`], inverted bounds do not panic: when `min > max`
/// the lower bound wins for values below it and the upper bound wins for
/// values above it.
pub fn by_interval(value: i32, min: Option<i32>, max: Option<i32>) -> i32 {
    if let Some(min) = min
        && value < min
    {
        return min;
    }
    if let Some(max) = max
        && value > max
    {
        return max;
    }
    value
}

/// Clamp a surface's horizontal origin so it stays on screen.
pub fn clamp_x(x: i32, width: i32, screen_width: i32, no_limits: bool) -> i32 {
    if no_limits {
        return x;
    }
    by_interval(x, Some(0), Some(screen_width.saturating_sub(width)))
}

/// Clamp a surface's vertical origin below the status bar.
///
/// With `in_screen_only` the surface may slide up under the status bar by its
/// full height.
pub fn clamp_y(
    y: i32,
    height: i32,
    screen_height: i32,
    status_bar_height: i32,
    in_screen_only: bool,
    no_limits: bool,
) -> i32 {
    if no_limits {
        return y;
    }
    let min = if in_screen_only {
        -status_bar_height
    } else {
        0
    };
    let max = screen_height
        .saturating_sub(height)
        .saturating_sub(status_bar_height);
    by_interval(y, Some(min), Some(max))
}

/// Clamp a window's content x so that at least a third of it stays visible.
pub fn clamp_window_x(x: i32, width: i32, screen_width: i32) -> i32 {
    let third = width / 3;
    by_interval(
        x,
        Some(-(width - third)),
        Some(screen_width.saturating_sub(third)),
    )
}

/// Clamp a window's content y so that its title area can always be grabbed.
pub fn clamp_window_y(y: i32, height: i32, screen_height: i32) -> i32 {
    by_interval(y, Some(0), Some(screen_height.saturating_sub(height / 2)))
}

/// Clamp a window's content width between its minimum and a little more than
/// the screen width.
pub fn clamp_window_width(width: i32, min_width: i32, screen_width: i32) -> i32 {
    let max = screen_width.saturating_add(min_width / 3 * 4);
    by_interval(width, Some(min_width), Some(max))
}

/// Clamp a window's content height between its minimum and the screen area
/// below the status bar.
pub fn clamp_window_height(
    height: i32,
    min_height: i32,
    screen_height: i32,
    status_bar_height: i32,
) -> i32 {
    by_interval(
        height,
        Some(min_height),
        Some(screen_height.saturating_sub(status_bar_height)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }
}

/// Apply a pointer delta to `start` by dragging `edge`, honouring a minimum
/// size. Edges that move the origin keep the opposite edge pinned when the
/// minimum kicks in.
pub fn apply_resize_drag(
    start: FloatRect,
    edge: ResizeEdge,
    delta: Point,
    min_width: i32,
    min_height: i32,
) -> FloatRect {
    let mut x = start.x;
    let mut y = start.y;
    let mut width = start.width;
    let mut height = start.height;

    if edge.moves_left() {
        x += delta.x;
        width -= delta.x;
    } else if edge.moves_right() {
        width += delta.x;
    }
    if edge.moves_top() {
        y += delta.y;
        height -= delta.y;
    } else if edge.moves_bottom() {
        height += delta.y;
    }

    let min_w = min_width.max(1);
    let min_h = min_height.max(1);
    if width < min_w {
        if edge.moves_left() {
            x -= min_w - width;
        }
        width = min_w;
    }
    if height < min_h {
        if edge.moves_top() {
            y -= min_h - height;
        }
        height = min_h;
    }

    FloatRect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_interval_prefers_lower_bound_when_inverted() {
        assert_eq!(by_interval(7, Some(10), Some(5)), 10);
        assert_eq!(by_interval(12, Some(10), Some(5)), 5);
        assert_eq!(by_interval(3, None, Some(5)), 3);
        assert_eq!(by_interval(-3, Some(0), None), 0);
    }

    #[test]
    fn clamp_x_keeps_surface_on_screen() {
        assert_eq!(clamp_x(-40, 100, 1000, false), 0);
        assert_eq!(clamp_x(950, 100, 1000, false), 900);
        assert_eq!(clamp_x(-40, 100, 1000, true), -40);
    }

    #[test]
    fn clamp_y_respects_status_bar_and_in_screen() {
        assert_eq!(clamp_y(-30, 100, 1000, 24, false, false), 0);
        assert_eq!(clamp_y(-30, 100, 1000, 24, true, false), -24);
        assert_eq!(clamp_y(990, 100, 1000, 24, false, false), 876);
        assert_eq!(clamp_y(i32::MIN, 100, 1000, 24, false, true), i32::MIN);
    }

    #[test]
    fn window_clamps_keep_a_third_visible() {
        assert_eq!(clamp_window_x(-500, 300, 1080), -200);
        assert_eq!(clamp_window_x(2000, 300, 1080), 980);
        assert_eq!(clamp_window_y(5000, 400, 1920), 1720);
        assert_eq!(clamp_window_width(10, 200, 1080), 200);
        assert_eq!(clamp_window_width(5000, 200, 1080), 1080 + 264);
        assert_eq!(clamp_window_height(5000, 150, 1920, 24), 1896);
    }

    #[test]
    fn window_clamps_survive_extreme_inputs() {
        for v in [i32::MIN, -1, 0, 1, i32::MAX] {
            let x = clamp_window_x(v, 300, 1080);
            assert!((-200..=980).contains(&x));
            let w = clamp_window_width(v, 200, 1080);
            assert!((200..=1344).contains(&w));
            let h = clamp_window_height(v, 150, 1920, 24);
            assert!((150..=1896).contains(&h));
        }
    }

    #[test]
    fn resize_top_drag_down_shrinks_from_top() {
        let start = FloatRect::new(0, 50, 20, 20);
        let res = apply_resize_drag(start, ResizeEdge::Top, Point::new(0, 5), 6, 3);
        assert_eq!(res, FloatRect::new(0, 55, 20, 15));
    }

    #[test]
    fn resize_left_past_minimum_pins_right_edge() {
        let start = FloatRect::new(-8, 10, 30, 12);
        let res = apply_resize_drag(start, ResizeEdge::Left, Point::new(40, 0), 10, 3);
        assert_eq!(res.width, 10);
        assert_eq!(res.right(), start.right());
    }

    #[test]
    fn resize_bottom_right_grows_both_axes() {
        let start = FloatRect::new(5, 5, 100, 80);
        let res = apply_resize_drag(start, ResizeEdge::BottomRight, Point::new(12, -7), 6, 3);
        assert_eq!(res, FloatRect::new(5, 5, 112, 73));
    }
}
