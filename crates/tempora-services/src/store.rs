//! Sequencer store: a worker thread that owns project state and applies commands

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tempora_core::{ProjectState, SnapType, Tempo, TemporaError, Tick, TimeSignature};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Undo entries kept before the oldest is dropped
const MAX_HISTORY: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid project data: {0}")]
    Invalid(#[from] TemporaError),
    #[error("Loop start {start} is after loop end {end}")]
    InvalidLoopRange { start: Tick, end: Tick },
    #[error("No time signature at measure {0}")]
    TimeSignatureNotFound(u32),
    #[error("No tempo at tick {0}")]
    TempoNotFound(Tick),
    #[error("The time signature at measure 1 cannot be removed")]
    InitialTimeSignature,
    #[error("The tempo at tick 0 cannot be removed")]
    InitialTempo,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("Store is not running")]
    Disconnected,
    #[error("Failed to start store worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// State mutations the store accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetLoopEnabled { is_loop_enabled: bool },
    SetLoopRange { loop_start_tick: Tick, loop_end_tick: Tick },
    ClearLoopRange,
    SetTimeSignature(TimeSignature),
    RemoveTimeSignature { measure_number: u32 },
    SetTempo(Tempo),
    RemoveTempo { position: Tick },
    SetSnapType(SnapType),
    Undo,
    Redo,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetLoopEnabled { .. } => "SET_LOOP_ENABLED",
            Self::SetLoopRange { .. } => "SET_LOOP_RANGE",
            Self::ClearLoopRange => "CLEAR_LOOP_RANGE",
            Self::SetTimeSignature(_) => "SET_TIME_SIGNATURE",
            Self::RemoveTimeSignature { .. } => "REMOVE_TIME_SIGNATURE",
            Self::SetTempo(_) => "SET_TEMPO",
            Self::RemoveTempo { .. } => "REMOVE_TEMPO",
            Self::SetSnapType(_) => "SET_SNAP_TYPE",
            Self::Undo => "UNDO",
            Self::Redo => "REDO",
        }
    }

    /// Whether applying the command records an undo entry
    pub fn is_undoable(&self) -> bool {
        !matches!(self, Self::SetSnapType(_) | Self::Undo | Self::Redo)
    }
}

/// Completion signal for a dispatched command
#[must_use = "a dispatched command reports failure only through its completion"]
pub struct Completion {
    rx: Receiver<Result<(), StoreError>>,
}

impl Completion {
    /// An already-finished completion
    pub fn ready(result: Result<(), StoreError>) -> Self {
        let (tx, rx) = bounded(1);
        let _ = tx.send(result);
        Self { rx }
    }

    /// Block until the store has applied or rejected the command
    pub fn wait(self) -> Result<(), StoreError> {
        self.rx.recv().unwrap_or(Err(StoreError::Disconnected))
    }
}

/// Snapshot reads plus command dispatch
pub trait Store {
    fn state(&self) -> ProjectState;
    fn dispatch(&self, command: Command) -> Completion;
}

struct Request {
    command: Command,
    reply: Sender<Result<(), StoreError>>,
}

#[derive(Default)]
struct History {
    undo: VecDeque<ProjectState>,
    redo: Vec<ProjectState>,
}

impl History {
    fn record(&mut self, previous: ProjectState) {
        if self.undo.len() == MAX_HISTORY {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
        self.redo.clear();
    }
}

/// Single-writer store backed by a command queue
pub struct SequencerStore {
    state: Arc<Mutex<ProjectState>>,
    commands: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

fn lock(state: &Mutex<ProjectState>) -> MutexGuard<'_, ProjectState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Swap in a history snapshot, keeping the current snap type (view state)
fn restore(current: &mut ProjectState, snapshot: ProjectState) -> ProjectState {
    let snap_type = current.snap_type;
    let mut replaced = std::mem::replace(current, snapshot);
    current.snap_type = snap_type;
    replaced.snap_type = snap_type;
    replaced
}

impl SequencerStore {
    /// Validate the initial state and start the worker thread
    pub fn start(initial: ProjectState) -> Result<Self, StoreError> {
        initial.validate()?;

        let state = Arc::new(Mutex::new(initial));
        let (tx, rx) = unbounded::<Request>();
        let worker_state = state.clone();

        let worker = thread::Builder::new()
            .name("sequencer-store".into())
            .spawn(move || Self::run(&worker_state, rx))?;

        info!("Sequencer store started");
        Ok(Self {
            state,
            commands: Some(tx),
            worker: Some(worker),
        })
    }

    /// Stop accepting commands and wait for queued ones to finish
    pub fn shutdown(&mut self) {
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("Sequencer store stopped");
        }
    }

    fn run(state: &Mutex<ProjectState>, rx: Receiver<Request>) {
        let mut history = History::default();
        for Request { command, reply } in rx.iter() {
            let name = command.name();
            let result = Self::apply(state, &mut history, command);
            match &result {
                Ok(()) => debug!(command = name, "Applied command"),
                Err(e) => warn!(command = name, error = %e, "Command rejected"),
            }
            let _ = reply.send(result);
        }
    }

    fn apply(state: &Mutex<ProjectState>, history: &mut History, command: Command) -> Result<(), StoreError> {
        let mut current = lock(state);

        match command {
            Command::Undo => {
                let previous = history.undo.pop_back().ok_or(StoreError::NothingToUndo)?;
                history.redo.push(restore(&mut current, previous));
                return Ok(());
            }
            Command::Redo => {
                let next = history.redo.pop().ok_or(StoreError::NothingToRedo)?;
                history.undo.push_back(restore(&mut current, next));
                return Ok(());
            }
            _ => {}
        }

        let undoable = command.is_undoable();
        let mut next = current.clone();
        Self::mutate(&mut next, command)?;
        if undoable {
            history.record(std::mem::replace(&mut *current, next));
        } else {
            *current = next;
        }
        Ok(())
    }

    fn mutate(state: &mut ProjectState, command: Command) -> Result<(), StoreError> {
        match command {
            Command::SetLoopEnabled { is_loop_enabled } => {
                state.loop_range.enabled = is_loop_enabled;
            }
            Command::SetLoopRange {
                loop_start_tick,
                loop_end_tick,
            } => {
                if loop_start_tick > loop_end_tick {
                    return Err(StoreError::InvalidLoopRange {
                        start: loop_start_tick,
                        end: loop_end_tick,
                    });
                }
                state.loop_range.start_tick = Some(loop_start_tick);
                state.loop_range.end_tick = Some(loop_end_tick);
            }
            Command::ClearLoopRange => {
                state.loop_range.start_tick = None;
                state.loop_range.end_tick = None;
            }
            Command::SetTimeSignature(time_signature) => {
                time_signature.validate()?;
                state.set_time_signature(time_signature);
            }
            Command::RemoveTimeSignature { measure_number } => {
                if measure_number == 1 {
                    return Err(StoreError::InitialTimeSignature);
                }
                state
                    .remove_time_signature(measure_number)
                    .ok_or(StoreError::TimeSignatureNotFound(measure_number))?;
            }
            Command::SetTempo(tempo) => {
                tempo.validate()?;
                state.set_tempo(tempo);
            }
            Command::RemoveTempo { position } => {
                if position == 0 {
                    return Err(StoreError::InitialTempo);
                }
                state
                    .remove_tempo(position)
                    .ok_or(StoreError::TempoNotFound(position))?;
            }
            Command::SetSnapType(snap_type) => {
                snap_type.validate()?;
                state.snap_type = snap_type;
            }
            // handled by `apply`
            Command::Undo | Command::Redo => {}
        }
        Ok(())
    }
}

impl Store for SequencerStore {
    fn state(&self) -> ProjectState {
        lock(&self.state).clone()
    }

    fn dispatch(&self, command: Command) -> Completion {
        let Some(commands) = &self.commands else {
            return Completion::ready(Err(StoreError::Disconnected));
        };
        let (reply, rx) = bounded(1);
        if commands.send(Request { command, reply }).is_err() {
            return Completion::ready(Err(StoreError::Disconnected));
        }
        Completion { rx }
    }
}

impl Drop for SequencerStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SequencerStore {
        SequencerStore::start(ProjectState::default()).unwrap()
    }

    #[test]
    fn test_loop_commands() {
        let store = store();
        store.dispatch(Command::SetLoopEnabled { is_loop_enabled: true }).wait().unwrap();
        store
            .dispatch(Command::SetLoopRange {
                loop_start_tick: 480,
                loop_end_tick: 1920,
            })
            .wait()
            .unwrap();

        let state = store.state();
        assert!(state.loop_range.enabled);
        assert_eq!(state.loop_range.start_tick, Some(480));
        assert_eq!(state.loop_range.end_tick, Some(1920));

        store.dispatch(Command::ClearLoopRange).wait().unwrap();
        let state = store.state();
        assert!(state.loop_range.enabled);
        assert_eq!(state.loop_range.start_tick, None);
        assert_eq!(state.loop_range.end_tick, None);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let store = store();
        let err = store
            .dispatch(Command::SetLoopRange {
                loop_start_tick: 1920,
                loop_end_tick: 0,
            })
            .wait()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidLoopRange { start: 1920, end: 0 }));
        assert_eq!(store.state().loop_range.start_tick, None);
    }

    #[test]
    fn test_undo_redo() {
        let store = store();
        store
            .dispatch(Command::SetLoopRange {
                loop_start_tick: 0,
                loop_end_tick: 1920,
            })
            .wait()
            .unwrap();
        store
            .dispatch(Command::SetLoopRange {
                loop_start_tick: 1920,
                loop_end_tick: 3840,
            })
            .wait()
            .unwrap();

        store.dispatch(Command::Undo).wait().unwrap();
        assert_eq!(store.state().loop_range.start_tick, Some(0));

        store.dispatch(Command::Redo).wait().unwrap();
        assert_eq!(store.state().loop_range.start_tick, Some(1920));

        assert!(matches!(
            store.dispatch(Command::Redo).wait(),
            Err(StoreError::NothingToRedo)
        ));
    }

    #[test]
    fn test_snap_type_not_recorded() {
        let store = store();
        store.dispatch(Command::SetSnapType(SnapType::QUARTER)).wait().unwrap();
        assert_eq!(store.state().snap_type, SnapType::QUARTER);
        assert!(matches!(
            store.dispatch(Command::Undo).wait(),
            Err(StoreError::NothingToUndo)
        ));
    }

    #[test]
    fn test_undo_keeps_snap_type() {
        let store = store();
        store
            .dispatch(Command::SetLoopRange {
                loop_start_tick: 0,
                loop_end_tick: 1920,
            })
            .wait()
            .unwrap();
        store.dispatch(Command::SetSnapType(SnapType::QUARTER)).wait().unwrap();

        store.dispatch(Command::Undo).wait().unwrap();
        let state = store.state();
        assert_eq!(state.loop_range.start_tick, None);
        assert_eq!(state.snap_type, SnapType::QUARTER);

        store.dispatch(Command::SetSnapType(SnapType::EIGHTH)).wait().unwrap();
        store.dispatch(Command::Redo).wait().unwrap();
        let state = store.state();
        assert_eq!(state.loop_range.end_tick, Some(1920));
        assert_eq!(state.snap_type, SnapType::EIGHTH);
    }

    #[test]
    fn test_time_signature_commands() {
        let store = store();
        store
            .dispatch(Command::SetTimeSignature(TimeSignature::new(3, 3, 4)))
            .wait()
            .unwrap();
        assert_eq!(store.state().time_signatures.len(), 2);

        assert!(matches!(
            store.dispatch(Command::RemoveTimeSignature { measure_number: 1 }).wait(),
            Err(StoreError::InitialTimeSignature)
        ));
        assert!(matches!(
            store.dispatch(Command::SetTimeSignature(TimeSignature::new(4, 0, 4))).wait(),
            Err(StoreError::Invalid(_))
        ));

        store
            .dispatch(Command::RemoveTimeSignature { measure_number: 3 })
            .wait()
            .unwrap();
        assert_eq!(store.state().time_signatures.len(), 1);
    }

    #[test]
    fn test_tempo_commands() {
        let store = store();
        store.dispatch(Command::SetTempo(Tempo::new(1920, 90.0))).wait().unwrap();
        assert!(matches!(
            store.dispatch(Command::RemoveTempo { position: 0 }).wait(),
            Err(StoreError::InitialTempo)
        ));
        assert!(matches!(
            store.dispatch(Command::RemoveTempo { position: 5 }).wait(),
            Err(StoreError::TempoNotFound(5))
        ));
        store.dispatch(Command::RemoveTempo { position: 1920 }).wait().unwrap();
        assert_eq!(store.state().tempos.len(), 1);
    }

    #[test]
    fn test_commands_apply_in_order() {
        let store = store();
        let pending: Vec<Completion> = (1..=20)
            .map(|i| {
                store.dispatch(Command::SetLoopRange {
                    loop_start_tick: i,
                    loop_end_tick: i * 10,
                })
            })
            .collect();
        for completion in pending {
            completion.wait().unwrap();
        }
        assert_eq!(store.state().loop_range.start_tick, Some(20));
    }

    #[test]
    fn test_dispatch_after_shutdown() {
        let mut store = store();
        store.shutdown();
        assert!(matches!(
            store.dispatch(Command::ClearLoopRange).wait(),
            Err(StoreError::Disconnected)
        ));
    }

    #[test]
    fn test_start_rejects_invalid_state() {
        let mut state = ProjectState::default();
        state.tpqn = 0;
        assert!(SequencerStore::start(state).is_err());
    }
}
