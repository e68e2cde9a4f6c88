//! One ring position: a payload-carrying state machine.
//!
//! A slot holds at most one task at a time and cycles strictly through
//! `Idle → Ready → Running → Done → Idle`. The payload lives inside the state
//! variant, so state and data always move together: taking the task marks the
//! slot `Running`, storing the result marks it `Done`, taking the result
//! resets it to `Idle`. No transition can be skipped or reversed without going
//! through these methods.

use crate::error::TaskResult;

/// Payload-free view of a slot's position in its lifecycle, for tests and
/// invariant checks.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    /// Empty, eligible for admission.
    Idle,
    /// Holds an admitted task awaiting a worker.
    Ready,
    /// A worker is executing the task.
    Running,
    /// Holds a result awaiting publication by the sequencer.
    Done,
}

/// One ring position holding a task's state and payload.
pub(crate) enum Slot<T, R> {
    Idle,
    Ready(T),
    Running,
    Done(TaskResult<R>),
}

impl<T, R> Slot<T, R> {
    /// Current lifecycle position.
    #[cfg(test)]
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Idle => SlotState::Idle,
            Slot::Ready(_) => SlotState::Ready,
            Slot::Running => SlotState::Running,
            Slot::Done(_) => SlotState::Done,
        }
    }

    /// Admission: `Idle → Ready`, storing the task.
    ///
    /// Returns `false` (and drops nothing) if the slot was not idle; the
    /// admission protocol guarantees it is.
    pub fn admit(&mut self, task: T) -> bool {
        match self {
            Slot::Idle => {
                *self = Slot::Ready(task);
                true
            }
            _ => false,
        }
    }

    /// Worker pickup: `Ready → Running`, yielding the task.
    ///
    /// Returns `None` if the slot holds no ready task.
    pub fn begin(&mut self) -> Option<T> {
        match std::mem::replace(self, Slot::Running) {
            Slot::Ready(task) => Some(task),
            other => {
                // Not ours to take; put the state back untouched.
                *self = other;
                None
            }
        }
    }

    /// Worker completion: `Running → Done`, storing the result.
    pub fn finish(&mut self, result: TaskResult<R>) -> bool {
        match self {
            Slot::Running => {
                *self = Slot::Done(result);
                true
            }
            _ => false,
        }
    }

    /// Publication: `Done → Idle`, yielding the result.
    ///
    /// Resetting here is what makes the index safe for the producer to reuse.
    /// Returns `None` if the slot is not done yet.
    pub fn publish(&mut self) -> Option<TaskResult<R>> {
        match std::mem::replace(self, Slot::Idle) {
            Slot::Done(result) => Some(result),
            other => {
                *self = other;
                None
            }
        }
    }
}
