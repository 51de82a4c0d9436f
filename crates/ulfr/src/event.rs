//! Typed event queues.
//!
//! [`Events`] keeps one queue per event type. Sending appends; reading hands
//! out the whole queue as a slice without consuming it, so every system that
//! runs after the sender in the same iteration sees the event.
//!
//! The driver rotates the queues once per iteration. It calls
//! [`mark`](Events::mark) as PostUpdate starts and [`rotate`](Events::rotate)
//! after it ends: everything sent before the mark is dropped, and events
//! sent during PostUpdate (window polling, for instance) carry over into the
//! next iteration.
//!
//! ```ignore
//! struct Damage { target: Entity, amount: u32 }
//!
//! fn combat(ctx: &mut Context) {
//!     ctx.send_event(Damage { target, amount: 5 });
//! }
//!
//! fn apply_damage(ctx: &mut Context) {
//!     let hits: Vec<_> = ctx.read_events::<Damage>().iter().map(|d| (d.target, d.amount)).collect();
//!     // ...
//! }
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Object-safe face of a `Vec<E>` so queues of different types can share a map.
trait Queue: Send + Sync {
    fn clear(&mut self);
    fn drop_front(&mut self, count: usize);
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: 'static + Send + Sync> Queue for Vec<E> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn drop_front(&mut self, count: usize) {
        let count = count.min(Vec::len(self));
        self.drain(..count);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-type FIFO event queues.
#[derive(Default)]
pub struct Events {
    queues: HashMap<TypeId, Box<dyn Queue>>,
    /// Queue lengths at the last [`mark`](Events::mark).
    marks: HashMap<TypeId, usize>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` to the queue for `E`.
    pub fn send<E: 'static + Send + Sync>(&mut self, event: E) {
        let queue = self
            .queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<E>::new()));
        if let Some(queue) = queue.as_any_mut().downcast_mut::<Vec<E>>() {
            queue.push(event);
        }
    }

    /// Every `E` sent since the last [`clear`](Self::clear), oldest first.
    pub fn read<E: 'static + Send + Sync>(&self) -> &[E] {
        self.queues
            .get(&TypeId::of::<E>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<E>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of pending `E` events.
    pub fn len<E: 'static + Send + Sync>(&self) -> usize {
        self.queues.get(&TypeId::of::<E>()).map_or(0, |q| q.len())
    }

    /// `true` if no event of any type is pending.
    pub fn is_empty(&self) -> bool {
        self.queues.values().all(|q| q.len() == 0)
    }

    /// Empty every queue. Allocations are kept for the next iteration.
    pub fn clear(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear();
        }
        self.marks.clear();
    }

    /// Remember how many events each queue holds right now.
    pub fn mark(&mut self) {
        self.marks.clear();
        self.marks
            .extend(self.queues.iter().map(|(id, queue)| (*id, queue.len())));
    }

    /// Drop the events that were pending at the last [`mark`](Self::mark),
    /// keeping anything sent since. Without a mark nothing is dropped.
    pub fn rotate(&mut self) {
        for (id, count) in self.marks.drain() {
            if let Some(queue) = self.queues.get_mut(&id) {
                queue.drop_front(count);
            }
        }
    }
}
