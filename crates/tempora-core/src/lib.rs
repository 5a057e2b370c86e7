//! tempora-core: Timeline domain types for the tempora sequencer

mod error;
pub mod grid;
pub mod project;
pub mod tempo;
pub mod theme;
pub mod time_signature;

pub use error::{TemporaError, Result};
pub use grid::{
    base_x_to_tick, note_duration, pixel_to_tick, snap_to_grid, SnapType, BASE_X_PER_QUARTER_NOTE,
};
pub use project::{LoopRange, ProjectState, DEFAULT_TPQN};
pub use tempo::{second_to_tick, tick_to_second, Tempo, DEFAULT_BPM};
pub use time_signature::{
    measure_info, measure_length, measure_number_at_tick, time_signature_at_tick,
    time_signature_spans, MeasureInfo, TimeSignature, TimeSignatureSpan,
};

/// Fundamental timeline unit, independent of tempo
pub type Tick = u64;
