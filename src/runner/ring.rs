//! Fixed arena of task slots with index recycling.
//!
//! All capacity is allocated once at construction and reused for the runner's
//! entire lifetime; indices wrap modulo the capacity. The ring itself performs
//! no waiting and no capacity accounting — admission permits guarantee that
//! the slot at `end` is idle whenever [`SlotRing::admit`] runs, and the
//! sequencer's publish step is the only thing that makes an index reusable.
//!
//! The ring is guarded by a single mutex in [`Runner`](crate::Runner), so a
//! slot's state and payload are always observed together by whichever role
//! wakes next.

use crate::error::TaskResult;

use super::slot::Slot;
#[cfg(test)]
use super::slot::SlotState;

/// Fixed ring of task slots addressed by index.
pub(crate) struct SlotRing<T, R> {
    slots: Box<[Slot<T, R>]>,
    /// Next admission index; wraps modulo capacity.
    end: usize,
}

impl<T, R> SlotRing<T, R> {
    /// Allocates `capacity` idle slots. Capacity must be positive (validated
    /// at configuration time).
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Idle);
        Self {
            slots: slots.into_boxed_slice(),
            end: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Admits a task into the next ring position and returns its index.
    ///
    /// The caller must hold an admission permit, which guarantees the slot at
    /// `end` has been published and reset; a non-idle slot here is a protocol
    /// bug, not a full ring.
    pub fn admit(&mut self, task: T) -> usize {
        let index = self.end;
        let admitted = self.slots[index].admit(task);
        debug_assert!(admitted, "slot {index} re-admitted before publication");
        self.end = (index + 1) % self.slots.len();
        index
    }

    /// Worker pickup: marks `index` running and takes its task.
    pub fn begin(&mut self, index: usize) -> Option<T> {
        self.slots[index].begin()
    }

    /// Worker completion: stores the result and marks `index` done.
    pub fn finish(&mut self, index: usize, result: TaskResult<R>) -> bool {
        self.slots[index].finish(result)
    }

    /// Sequencer publication: takes the result at `index` and resets the slot,
    /// making the index eligible for admission again.
    ///
    /// Returns `None` while the slot has not reached `Done` — the sequencer
    /// never advances past an incomplete slot.
    pub fn publish(&mut self, index: usize) -> Option<TaskResult<R>> {
        self.slots[index].publish()
    }

    #[cfg(test)]
    pub fn state(&self, index: usize) -> SlotState {
        self.slots[index].state()
    }
}
