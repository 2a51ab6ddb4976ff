use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::geometry::Point;
use crate::surface::Gesture;

/// Turns left-button mouse reports into pointer gestures. A release with no
/// drag in between additionally yields a [`Gesture::Tap`].
#[derive(Debug, Default)]
pub struct MouseTranslator {
    pressed: Option<Point>,
    moved: bool,
}

impl MouseTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn translate(&mut self, event: &MouseEvent) -> Vec<Gesture> {
        let point = Point::new(i32::from(event.column), i32::from(event.row));
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = Some(point);
                self.moved = false;
                vec![Gesture::Down(point)]
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed.is_some() => {
                if self.pressed != Some(point) {
                    self.moved = true;
                }
                vec![Gesture::Move(point)]
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(_) = self.pressed.take() else {
                    return Vec::new();
                };
                if self.moved {
                    vec![Gesture::Up(point)]
                } else {
                    vec![Gesture::Up(point), Gesture::Tap(point)]
                }
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn click_without_drag_is_a_tap() {
        let mut t = MouseTranslator::new();
        t.translate(&mouse(MouseEventKind::Down(MouseButton::Left), 4, 5));
        let out = t.translate(&mouse(MouseEventKind::Up(MouseButton::Left), 4, 5));
        assert_eq!(
            out,
            vec![Gesture::Up(Point::new(4, 5)), Gesture::Tap(Point::new(4, 5))]
        );
        assert!(!t.is_pressed());
    }

    #[test]
    fn drag_suppresses_tap() {
        let mut t = MouseTranslator::new();
        t.translate(&mouse(MouseEventKind::Down(MouseButton::Left), 4, 5));
        let moved = t.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 9, 5));
        assert_eq!(moved, vec![Gesture::Move(Point::new(9, 5))]);
        let out = t.translate(&mouse(MouseEventKind::Up(MouseButton::Left), 9, 5));
        assert_eq!(out, vec![Gesture::Up(Point::new(9, 5))]);
    }

    #[test]
    fn stray_release_and_other_buttons_are_ignored() {
        let mut t = MouseTranslator::new();
        assert!(t.translate(&mouse(MouseEventKind::Up(MouseButton::Left), 1, 1)).is_empty());
        assert!(t.translate(&mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)).is_empty());
        assert!(t.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 1, 1)).is_empty());
    }
}
