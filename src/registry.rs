//! Ordered stack of open windows plus the single tick timer.
//!
//! The registry only stores ids. Unfocusing siblings and ticking windows is
//! done by the shell, which owns the windows themselves.

use std::time::Duration;

use crate::host::{Host, TimerToken};
use crate::window::WindowId;

#[derive(Debug, Clone)]
pub struct FocusRegistry {
    /// Most recently focused last.
    stack: Vec<WindowId>,
    interval: Duration,
    timer: Option<TimerToken>,
}

impl FocusRegistry {
    pub fn new(interval: Duration) -> Self {
        Self {
            stack: Vec::new(),
            interval,
            timer: None,
        }
    }

    /// Start the tick timer if it is not running yet.
    pub fn init(&mut self, host: &mut dyn Host) -> bool {
        if self.timer.is_some() {
            return true;
        }
        match host.schedule_repeating(self.interval) {
            Ok(token) => {
                tracing::debug!(?token, interval_ms = self.interval.as_millis() as u64, "tick timer started");
                self.timer = Some(token);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "tick timer could not be scheduled");
                false
            }
        }
    }

    /// Cancel the tick timer. Windows should already be closed.
    pub fn destroy(&mut self, host: &mut dyn Host) {
        if let Some(token) = self.timer.take() {
            host.cancel_timer(token);
            tracing::debug!(?token, "tick timer cancelled");
        }
        self.stack.clear();
    }

    pub fn timer(&self) -> Option<TimerToken> {
        self.timer
    }

    pub fn is_tick(&self, token: TimerToken) -> bool {
        self.timer == Some(token)
    }

    pub fn register(&mut self, id: WindowId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.stack.push(id);
        true
    }

    pub fn deregister(&mut self, id: WindowId) -> bool {
        let before = self.stack.len();
        self.stack.retain(|x| *x != id);
        before != self.stack.len()
    }

    /// Put `new` into the slot `old` occupies. Registers `new` on top when
    /// `old` is not present.
    pub fn replace(&mut self, old: WindowId, new: WindowId) {
        self.stack.retain(|x| *x != new);
        match self.stack.iter().position(|x| *x == old) {
            Some(pos) => self.stack[pos] = new,
            None => self.stack.push(new),
        }
    }

    /// Move `id` to the top of the stack. Ignored when not registered.
    pub fn promote(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.stack.iter().position(|x| *x == id) else {
            return false;
        };
        let item = self.stack.remove(pos);
        self.stack.push(item);
        true
    }

    pub fn top(&self) -> Option<WindowId> {
        self.stack.last().copied()
    }

    pub fn first(&self) -> Option<WindowId> {
        self.stack.first().copied()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.stack.contains(&id)
    }

    pub fn windows(&self) -> &[WindowId] {
        &self.stack
    }

    /// Every registered window except `id`, taken as a snapshot so callers
    /// may mutate the registry while iterating.
    pub fn others(&self, id: WindowId) -> Vec<WindowId> {
        self.stack.iter().copied().filter(|x| *x != id).collect()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
