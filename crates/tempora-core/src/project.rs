//! Project state shared between the sequencer store and its readers

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporaError};
use crate::grid::SnapType;
use crate::tempo::{Tempo, DEFAULT_BPM};
use crate::time_signature::TimeSignature;
use crate::Tick;

pub const DEFAULT_TPQN: u32 = 480;

/// Loop playback region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopRange {
    pub enabled: bool,
    pub start_tick: Option<Tick>,
    pub end_tick: Option<Tick>,
}

impl LoopRange {
    /// Both bounds set
    pub fn is_set(&self) -> bool {
        self.start_tick.is_some() && self.end_tick.is_some()
    }

    pub fn length(&self) -> Option<Tick> {
        Some(self.end_tick?.saturating_sub(self.start_tick?))
    }
}

/// Timeline slices of a sequencer project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub tpqn: u32,
    pub time_signatures: Vec<TimeSignature>,
    pub tempos: Vec<Tempo>,
    #[serde(default)]
    pub loop_range: LoopRange,
    #[serde(default)]
    pub snap_type: SnapType,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new(DEFAULT_TPQN)
    }
}

impl ProjectState {
    pub fn new(tpqn: u32) -> Self {
        Self {
            tpqn,
            time_signatures: vec![TimeSignature::default()],
            tempos: vec![Tempo::new(0, DEFAULT_BPM)],
            loop_range: LoopRange::default(),
            snap_type: SnapType::default(),
        }
    }

    /// Check the invariants resolvers rely on
    pub fn validate(&self) -> Result<()> {
        if self.tpqn == 0 {
            return Err(TemporaError::InvalidTpqn(self.tpqn));
        }
        for ts in &self.time_signatures {
            ts.validate()?;
        }
        if !self.time_signatures.iter().any(|ts| ts.measure_number == 1) {
            return Err(TemporaError::MissingInitialTimeSignature);
        }
        let mut measures: Vec<u32> = self.time_signatures.iter().map(|ts| ts.measure_number).collect();
        measures.sort_unstable();
        if measures.windows(2).any(|w| w[0] == w[1]) {
            return Err(TemporaError::InvalidTimeSignature(
                "duplicate measure number".into(),
            ));
        }
        for tempo in &self.tempos {
            tempo.validate()?;
        }
        self.snap_type.validate()
    }

    /// Insert or replace the time signature at its measure
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        match self
            .time_signatures
            .iter_mut()
            .find(|ts| ts.measure_number == time_signature.measure_number)
        {
            Some(existing) => *existing = time_signature,
            None => self.time_signatures.push(time_signature),
        }
    }

    pub fn remove_time_signature(&mut self, measure_number: u32) -> Option<TimeSignature> {
        let pos = self
            .time_signatures
            .iter()
            .position(|ts| ts.measure_number == measure_number)?;
        Some(self.time_signatures.remove(pos))
    }

    /// Insert or replace the tempo at its position
    pub fn set_tempo(&mut self, tempo: Tempo) {
        match self.tempos.iter_mut().find(|t| t.position == tempo.position) {
            Some(existing) => *existing = tempo,
            None => self.tempos.push(tempo),
        }
    }

    pub fn remove_tempo(&mut self, position: Tick) -> Option<Tempo> {
        let pos = self.tempos.iter().position(|t| t.position == position)?;
        Some(self.tempos.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ProjectState::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_first_measure() {
        let mut state = ProjectState::default();
        state.time_signatures = vec![TimeSignature::new(2, 4, 4)];
        assert!(matches!(
            state.validate(),
            Err(TemporaError::MissingInitialTimeSignature)
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut state = ProjectState::default();
        state.time_signatures.push(TimeSignature::new(1, 3, 4));
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_set_time_signature_replaces() {
        let mut state = ProjectState::default();
        state.set_time_signature(TimeSignature::new(1, 3, 4));
        state.set_time_signature(TimeSignature::new(5, 7, 8));
        assert_eq!(state.time_signatures.len(), 2);
        assert_eq!(state.time_signatures[0].beats, 3);
        assert_eq!(state.remove_time_signature(5), Some(TimeSignature::new(5, 7, 8)));
        assert_eq!(state.remove_time_signature(5), None);
    }

    #[test]
    fn test_loop_range_length() {
        let range = LoopRange {
            enabled: true,
            start_tick: Some(1920),
            end_tick: Some(3840),
        };
        assert!(range.is_set());
        assert_eq!(range.length(), Some(1920));
        assert_eq!(LoopRange::default().length(), None);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "tpqn": 480,
            "timeSignatures": [{"measureNumber": 1, "beats": 3, "beatType": 4}],
            "tempos": [{"position": 0, "bpm": 100.0}]
        }"#;
        let state: ProjectState = serde_json::from_str(json).unwrap();
        assert_eq!(state.time_signatures[0], TimeSignature::new(1, 3, 4));
        assert_eq!(state.loop_range, LoopRange::default());
        assert_eq!(state.snap_type, SnapType::SIXTEENTH);
    }
}
