//! tempora-services: Sequencer store and loop control

pub mod loop_control;
pub mod store;

pub use loop_control::{LoopControl, LoopControlError, PendingMutation};
pub use store::{Command, Completion, SequencerStore, Store, StoreError};
