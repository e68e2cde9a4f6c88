//! Pipeline core: the slot ring and the roles that coordinate over it.
//!
//! The only public API from this module is [`Runner`] and its
//! [`RunnerBuilder`]. Internal modules:
//! - [`slot`]: one ring position, a payload-carrying state machine;
//! - [`ring`]: the fixed arena of slots with index recycling;
//! - [`core`]: admission, worker pool, sequencer, and delivery loops;
//! - [`builder`]: construction and validation.

mod builder;
mod core;
mod ring;
mod slot;

pub use builder::RunnerBuilder;
pub use self::core::Runner;
