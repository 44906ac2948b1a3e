//! Input Module
//!
//! Platform-agnostic build input. The windowing layer turns key presses and
//! cursor movement into [`InputEvent`]s and queues them; the game drains one
//! batch per tick.
//!
//! # Example
//!
//! ```rust,ignore
//! use castle_crafter_engine::input::{InputEvent, InputQueue};
//!
//! let mut queue = InputQueue::new();
//! queue.push(InputEvent::SelectPart("wood_floor".into()));
//! queue.push(InputEvent::Rotate(90));
//!
//! let batch = queue.drain();
//! builder.process_tick(&batch, &mut ctx);
//! ```

pub mod actions;

pub use actions::{InputEvent, InteractionMode};

/// Events collected between two ticks.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    /// Take every queued event, in arrival order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Extend<InputEvent> for InputQueue {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        self.pending.extend(iter);
    }
}
