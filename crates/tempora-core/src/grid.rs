//! Snap grid and screen-to-tick mapping

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporaError};
use crate::Tick;

/// Base pixels covered by one quarter note at zoom 1.0
pub const BASE_X_PER_QUARTER_NOTE: f64 = 120.0;

/// Snap grid note value, as a note-length denominator.
///
/// `4` snaps to quarter notes, `16` to sixteenths, `12` to eighth-note triplets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapType(pub u32);

impl SnapType {
    pub const QUARTER: SnapType = SnapType(4);
    pub const EIGHTH: SnapType = SnapType(8);
    pub const SIXTEENTH: SnapType = SnapType(16);
    pub const EIGHTH_TRIPLET: SnapType = SnapType(12);

    pub fn validate(&self) -> Result<()> {
        if self.0 == 0 {
            return Err(TemporaError::InvalidSnapType(self.0));
        }
        Ok(())
    }
}

impl Default for SnapType {
    fn default() -> Self {
        Self::SIXTEENTH
    }
}

/// Length in ticks of one note of the given snap type
pub fn note_duration(snap_type: SnapType, tpqn: u32) -> Tick {
    if snap_type.0 == 0 {
        return 0;
    }
    (tpqn as Tick * 4) / snap_type.0 as Tick
}

/// Round `tick` to the nearest multiple of `interval`, halves rounding up.
///
/// A zero interval leaves the tick unchanged.
pub fn snap_to_grid(tick: Tick, interval: Tick) -> Tick {
    if interval == 0 {
        return tick;
    }
    (2 * tick + interval) / (2 * interval) * interval
}

/// Convert an unzoomed x coordinate to a tick; positions left of the origin map to 0
pub fn base_x_to_tick(base_x: f64, tpqn: u32) -> Tick {
    let tick = (base_x / BASE_X_PER_QUARTER_NOTE * tpqn as f64).round();
    if tick.is_nan() || tick <= 0.0 {
        0
    } else {
        tick as Tick
    }
}

/// Convert a viewport pixel to a tick given the scroll offset and horizontal zoom.
///
/// `None` when the zoom is not a positive finite factor or the position is not finite.
pub fn pixel_to_tick(x: f64, offset: f64, zoom_x: f64, tpqn: u32) -> Option<Tick> {
    if !zoom_x.is_finite() || zoom_x <= 0.0 {
        return None;
    }
    let base_x = (offset + x) / zoom_x;
    base_x.is_finite().then(|| base_x_to_tick(base_x, tpqn))
}
