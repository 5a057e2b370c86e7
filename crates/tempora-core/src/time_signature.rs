//! Time signatures and measure resolution

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporaError};
use crate::Tick;

/// A meter change effective from `measure_number` (1-based) until superseded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub measure_number: u32,
    /// Numerator
    pub beats: u32,
    /// Denominator (power of two: 2, 4, 8, 16...)
    pub beat_type: u32,
}

impl TimeSignature {
    pub fn new(measure_number: u32, beats: u32, beat_type: u32) -> Self {
        Self {
            measure_number,
            beats,
            beat_type,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.measure_number == 0 {
            return Err(TemporaError::InvalidTimeSignature(
                "measure numbers start at 1".into(),
            ));
        }
        if self.beats == 0 || self.beat_type == 0 {
            return Err(TemporaError::InvalidTimeSignature(format!(
                "{}/{} at measure {}",
                self.beats, self.beat_type, self.measure_number
            )));
        }
        Ok(())
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(1, 4, 4)
    }
}

/// A time signature together with the tick its span starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignatureSpan {
    pub time_signature: TimeSignature,
    pub start_tick: Tick,
}

/// Start tick and governing signature of the measure containing a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureInfo {
    pub start_tick: Tick,
    pub time_signature: TimeSignature,
}

/// Length of one measure in ticks (0 for a zero beat type)
pub fn measure_length(time_signature: &TimeSignature, tpqn: u32) -> Tick {
    let whole_note_ticks = tpqn as Tick * 4;
    let beat_ticks = whole_note_ticks
        .checked_div(time_signature.beat_type as Tick)
        .unwrap_or(0);
    beat_ticks * time_signature.beats as Tick
}

/// Sort signatures by measure and compute the tick each span begins at.
///
/// The first signature always starts at tick 0, whatever its measure number.
pub fn time_signature_spans(time_signatures: &[TimeSignature], tpqn: u32) -> Vec<TimeSignatureSpan> {
    let mut sorted = time_signatures.to_vec();
    sorted.sort_by_key(|ts| ts.measure_number);

    let mut current_tick: Tick = 0;
    let mut prev: Option<TimeSignature> = None;
    sorted
        .into_iter()
        .map(|ts| {
            if let Some(prev_ts) = prev {
                let measure_diff = ts.measure_number.saturating_sub(prev_ts.measure_number) as Tick;
                current_tick += measure_diff * measure_length(&prev_ts, tpqn);
            }
            prev = Some(ts);
            TimeSignatureSpan {
                time_signature: ts,
                start_tick: current_tick,
            }
        })
        .collect()
}

/// Time signature in effect at `tick` and the tick its span began at.
///
/// Falls back to the earliest signature when no span starts at or before
/// `tick`. Returns `None` only for an empty list.
pub fn time_signature_at_tick(
    time_signatures: &[TimeSignature],
    tick: Tick,
    tpqn: u32,
) -> Option<TimeSignatureSpan> {
    let spans = time_signature_spans(time_signatures, tpqn);
    spans
        .iter()
        .rev()
        .find(|span| span.start_tick <= tick)
        .or_else(|| spans.first())
        .copied()
}

/// Start tick of the measure containing `tick`, with its time signature
pub fn measure_info(time_signatures: &[TimeSignature], tick: Tick, tpqn: u32) -> Option<MeasureInfo> {
    let span = time_signature_at_tick(time_signatures, tick, tpqn)?;
    let length = measure_length(&span.time_signature, tpqn);
    let ticks_from_span = tick.saturating_sub(span.start_tick);
    let measure_count = if length == 0 { 0 } else { ticks_from_span / length };
    Some(MeasureInfo {
        start_tick: span.start_tick + measure_count * length,
        time_signature: span.time_signature,
    })
}

/// 1-based number of the measure containing `tick`
pub fn measure_number_at_tick(time_signatures: &[TimeSignature], tick: Tick, tpqn: u32) -> Option<u32> {
    let span = time_signature_at_tick(time_signatures, tick, tpqn)?;
    let length = measure_length(&span.time_signature, tpqn);
    if length == 0 {
        return Some(span.time_signature.measure_number);
    }
    let elapsed = tick.saturating_sub(span.start_tick) / length;
    Some(span.time_signature.measure_number + elapsed as u32)
}
