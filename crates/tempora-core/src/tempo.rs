//! Tempo map and tick/seconds conversion

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporaError};
use crate::Tick;

/// Tempo used when a project carries no tempo events
pub const DEFAULT_BPM: f64 = 120.0;

/// A tempo change at a tick position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    pub position: Tick,
    pub bpm: f64,
}

impl Tempo {
    pub fn new(position: Tick, bpm: f64) -> Self {
        Self { position, bpm }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(TemporaError::InvalidTempo(format!(
                "{} bpm at tick {}",
                self.bpm, self.position
            )));
        }
        Ok(())
    }

    /// Seconds per tick at this tempo
    fn secs_per_tick(&self, tpqn: u32) -> f64 {
        60.0 / self.bpm / tpqn as f64
    }
}

fn sorted_tempos(tempos: &[Tempo]) -> Vec<Tempo> {
    let mut sorted = if tempos.is_empty() {
        vec![Tempo::new(0, DEFAULT_BPM)]
    } else {
        tempos.to_vec()
    };
    sorted.sort_by_key(|t| t.position);
    sorted
}

/// Convert a tick position to seconds, integrating across tempo changes.
///
/// Ticks before the first tempo event use the first event's tempo.
pub fn tick_to_second(tick: Tick, tempos: &[Tempo], tpqn: u32) -> f64 {
    let tempos = sorted_tempos(tempos);
    let mut secs = 0.0;
    let mut segment_start: Tick = 0;
    let mut current = tempos[0];

    for next in tempos.iter().skip(1) {
        if next.position >= tick {
            break;
        }
        secs += (next.position - segment_start) as f64 * current.secs_per_tick(tpqn);
        segment_start = next.position;
        current = *next;
    }

    secs + (tick - segment_start) as f64 * current.secs_per_tick(tpqn)
}

/// Convert seconds to the nearest tick position
pub fn second_to_tick(secs: f64, tempos: &[Tempo], tpqn: u32) -> Tick {
    if secs <= 0.0 {
        return 0;
    }
    let tempos = sorted_tempos(tempos);
    let mut elapsed = 0.0;
    let mut segment_start: Tick = 0;
    let mut current = tempos[0];

    for next in tempos.iter().skip(1) {
        let segment_secs = (next.position - segment_start) as f64 * current.secs_per_tick(tpqn);
        if elapsed + segment_secs > secs {
            break;
        }
        elapsed += segment_secs;
        segment_start = next.position;
        current = *next;
    }

    segment_start + ((secs - elapsed) / current.secs_per_tick(tpqn)).round() as Tick
}
