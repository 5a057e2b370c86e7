//! Loop range control over the sequencer store

use tempora_core::{
    grid, measure_info, measure_length, note_duration, pixel_to_tick, tick_to_second, Tick,
};
use thiserror::Error;
use tracing::debug;

use crate::store::{Command, Completion, Store, StoreError};

#[derive(Debug, Error)]
pub enum LoopControlError {
    #[error("Failed to set loop enabled state")]
    SetEnabled(#[source] StoreError),
    #[error("Failed to set loop range")]
    SetRange(#[source] StoreError),
    #[error("Failed to clear loop range")]
    Clear(#[source] StoreError),
    #[error("No time signature governs tick {0}")]
    NoTimeSignature(Tick),
    #[error("Pixel {x} is outside the timeline (offset {offset}, zoom {zoom_x})")]
    InvalidPosition { x: f64, offset: f64, zoom_x: f64 },
    #[error("Measure starting at tick {0} ends past the last representable tick")]
    TickOverflow(Tick),
}

/// A loop mutation that has been handed to the store
#[must_use = "loop mutations report failure only through `wait`"]
pub struct PendingMutation {
    inner: Pending,
}

enum Pending {
    Dispatched {
        completion: Completion,
        wrap: fn(StoreError) -> LoopControlError,
    },
    Failed(LoopControlError),
}

impl PendingMutation {
    fn dispatched(completion: Completion, wrap: fn(StoreError) -> LoopControlError) -> Self {
        Self {
            inner: Pending::Dispatched { completion, wrap },
        }
    }

    fn failed(error: LoopControlError) -> Self {
        Self {
            inner: Pending::Failed(error),
        }
    }

    /// Block until the store has applied or rejected the mutation
    pub fn wait(self) -> Result<(), LoopControlError> {
        match self.inner {
            Pending::Dispatched { completion, wrap } => completion.wait().map_err(wrap),
            Pending::Failed(e) => Err(e),
        }
    }
}

/// Loop state reads and loop mutations for a sequencer store.
///
/// Reads go to a fresh store snapshot on every call.
pub struct LoopControl<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> LoopControl<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn is_loop_enabled(&self) -> bool {
        self.store.state().loop_range.enabled
    }

    pub fn loop_start_tick(&self) -> Option<Tick> {
        self.store.state().loop_range.start_tick
    }

    pub fn loop_end_tick(&self) -> Option<Tick> {
        self.store.state().loop_range.end_tick
    }

    /// Loop start in seconds, `None` while the start is unset
    pub fn loop_start_time(&self) -> Option<f64> {
        let state = self.store.state();
        let tick = state.loop_range.start_tick?;
        Some(tick_to_second(tick, &state.tempos, state.tpqn))
    }

    /// Loop end in seconds, `None` while the end is unset
    pub fn loop_end_time(&self) -> Option<f64> {
        let state = self.store.state();
        let tick = state.loop_range.end_tick?;
        Some(tick_to_second(tick, &state.tempos, state.tpqn))
    }

    pub fn set_loop_enabled(&self, value: bool) -> PendingMutation {
        let completion = self.store.dispatch(Command::SetLoopEnabled {
            is_loop_enabled: value,
        });
        PendingMutation::dispatched(completion, LoopControlError::SetEnabled)
    }

    /// Request both bounds at once. Ordering is checked by the store, not here.
    pub fn set_loop_range(&self, start_tick: Tick, end_tick: Tick) -> PendingMutation {
        let completion = self.store.dispatch(Command::SetLoopRange {
            loop_start_tick: start_tick,
            loop_end_tick: end_tick,
        });
        PendingMutation::dispatched(completion, LoopControlError::SetRange)
    }

    pub fn clear_loop_range(&self) -> PendingMutation {
        let completion = self.store.dispatch(Command::ClearLoopRange);
        PendingMutation::dispatched(completion, LoopControlError::Clear)
    }

    /// Round a tick to the store's current snap grid
    pub fn snap_to_grid(&self, tick: Tick) -> Tick {
        let state = self.store.state();
        let interval = note_duration(state.snap_type, state.tpqn);
        grid::snap_to_grid(tick, interval)
    }

    /// Loop exactly the measure under a viewport pixel
    pub fn add_one_measure_loop(&self, x: f64, offset: f64, tpqn: u32, zoom_x: f64) -> PendingMutation {
        let Some(cursor_tick) = pixel_to_tick(x, offset, zoom_x, tpqn) else {
            return PendingMutation::failed(LoopControlError::InvalidPosition { x, offset, zoom_x });
        };
        let state = self.store.state();

        let Some(info) = measure_info(&state.time_signatures, cursor_tick, tpqn) else {
            return PendingMutation::failed(LoopControlError::NoTimeSignature(cursor_tick));
        };
        let length = measure_length(&info.time_signature, tpqn);
        let Some(end_tick) = info.start_tick.checked_add(length) else {
            return PendingMutation::failed(LoopControlError::TickOverflow(info.start_tick));
        };
        debug!(cursor_tick, start = info.start_tick, length, "Looping measure");

        self.set_loop_range(info.start_tick, end_tick)
    }
}
