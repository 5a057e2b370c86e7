//! Subcommand handlers

use std::path::Path;

use anyhow::Context;
use tempora_core::theme::{
    css_variables, evaluate_contrast, generate_color_scheme, Apca, ColorSpace, ContrastMetric,
    OklchSrgb, Wcag21,
};
use tempora_core::{
    measure_info, measure_length, measure_number_at_tick, tick_to_second, time_signature_spans,
    ProjectState,
};
use tempora_services::{LoopControl, SequencerStore, Store};
use tracing::{info, warn};

use crate::config::{save_config, AppConfig};
use crate::{Args, Commands, LoopAction};

pub(crate) fn load_project(path: Option<&Path>, config: &AppConfig) -> anyhow::Result<ProjectState> {
    let project: ProjectState = match path {
        None => config.new_project(),
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
    };
    project.validate()?;
    Ok(project)
}

pub(crate) fn save_project(path: &Path, project: &ProjectState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

pub(crate) fn run(args: Args, config: &AppConfig, config_path: &Path) -> anyhow::Result<()> {
    if let Commands::InitConfig = args.command {
        save_config(config_path, &AppConfig::default())?;
        println!("{}", config_path.display());
        return Ok(());
    }
    if let Commands::Theme {
        dark,
        css,
        check,
        apca,
    } = args.command
    {
        let metric: Option<&dyn ContrastMetric> = match (check, apca) {
            (false, _) => None,
            (true, false) => Some(&Wcag21),
            (true, true) => Some(&Apca),
        };
        return theme(config, dark, css, metric);
    }

    let project = load_project(args.project.as_deref(), config)?;
    let tpqn = project.tpqn;

    match args.command {
        Commands::Measure { tick } => {
            let info = measure_info(&project.time_signatures, tick, tpqn)
                .context("project has no time signatures")?;
            let number = measure_number_at_tick(&project.time_signatures, tick, tpqn).unwrap_or(0);
            let ts = info.time_signature;
            println!(
                "measure {} ({}/{}) starts at tick {}, length {}",
                number,
                ts.beats,
                ts.beat_type,
                info.start_tick,
                measure_length(&ts, tpqn)
            );
        }
        Commands::Spans => {
            for span in time_signature_spans(&project.time_signatures, tpqn) {
                let ts = span.time_signature;
                println!(
                    "measure {:>4}  {}/{}  tick {}",
                    ts.measure_number, ts.beats, ts.beat_type, span.start_tick
                );
            }
        }
        Commands::Time { tick } => {
            println!("{:.6}", tick_to_second(tick, &project.tempos, tpqn));
        }
        Commands::Snap { tick } => {
            let store = SequencerStore::start(project)?;
            println!("{}", LoopControl::new(&store).snap_to_grid(tick));
        }
        Commands::Loop { action } => {
            let store = SequencerStore::start(project)?;
            let changed = loop_action(&store, action)?;
            if changed {
                match args.project.as_deref() {
                    Some(path) => {
                        save_project(path, &store.state())?;
                        info!(project = %path.display(), "Saved loop range");
                    }
                    None => warn!("No --project given; loop change not saved"),
                }
            }
        }
        Commands::Theme { .. } | Commands::InitConfig => {}
    }
    Ok(())
}

/// Returns whether the project changed
fn loop_action(store: &SequencerStore, action: LoopAction) -> anyhow::Result<bool> {
    let control = LoopControl::new(store);
    let tpqn = store.state().tpqn;
    let pending = match action {
        LoopAction::Show => {
            let fmt_tick = |t: Option<u64>| t.map_or_else(|| "-".to_string(), |t| t.to_string());
            let fmt_time = |s: Option<f64>| s.map_or_else(|| "-".to_string(), |s| format!("{s:.3}s"));
            println!("enabled: {}", control.is_loop_enabled());
            println!(
                "start:   {} ({})",
                fmt_tick(control.loop_start_tick()),
                fmt_time(control.loop_start_time())
            );
            println!(
                "end:     {} ({})",
                fmt_tick(control.loop_end_tick()),
                fmt_time(control.loop_end_time())
            );
            return Ok(false);
        }
        LoopAction::Enable => control.set_loop_enabled(true),
        LoopAction::Disable => control.set_loop_enabled(false),
        LoopAction::Set { start, end } => control.set_loop_range(start, end),
        LoopAction::Clear => control.clear_loop_range(),
        LoopAction::Measure { x, offset, zoom } => control.add_one_measure_loop(x, offset, tpqn, zoom),
    };
    pending.wait()?;
    Ok(true)
}

fn theme(config: &AppConfig, dark: bool, css: bool, metric: Option<&dyn ContrastMetric>) -> anyhow::Result<()> {
    let space = OklchSrgb;
    let scheme_config = config.theme.scheme_config(&space, dark || config.theme.dark)?;
    let scheme = generate_color_scheme(&scheme_config);

    if css {
        for (name, value) in css_variables(&scheme, &space) {
            println!("{name}: {value};");
        }
    } else {
        for (name, color) in &scheme.roles {
            println!("{name:<24} {}  {}", space.to_hex(color), color.to_css());
        }
    }

    if let Some(metric) = metric {
        let failures = evaluate_contrast(&scheme, &scheme_config, metric, &space);
        if failures.is_empty() {
            info!(metric = metric.name(), "All color checks passed");
        }
        for f in &failures {
            warn!(
                metric = metric.name(),
                fg = %f.fg_name,
                bg = %f.bg_name,
                kind = ?f.kind,
                grade = ?f.grade,
                "Contrast {:.2} below {:.2}",
                f.value,
                f.expected
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempora_core::TimeSignature;

    use super::*;

    #[test]
    fn test_project_defaults_from_config() {
        let mut config = AppConfig::default();
        config.sequencer.tpqn = 960;
        config.sequencer.snap_type = 8;
        let project = load_project(None, &config).unwrap();
        assert_eq!(project.tpqn, 960);
        assert_eq!(project.snap_type.0, 8);
    }

    #[test]
    fn test_invalid_config_defaults_rejected() {
        let mut config = AppConfig::default();
        config.sequencer.tpqn = 0;
        assert!(load_project(None, &config).is_err());

        let mut config = AppConfig::default();
        config.sequencer.snap_type = 0;
        assert!(load_project(None, &config).is_err());
    }

    #[test]
    fn test_project_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.json");
        let mut project = ProjectState::default();
        project.set_time_signature(TimeSignature::new(3, 3, 4));
        save_project(&path, &project).unwrap();
        assert_eq!(load_project(Some(&path), &AppConfig::default()).unwrap(), project);
    }

    #[test]
    fn test_invalid_project_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"tpqn": 480, "timeSignatures": [{"measureNumber": 2, "beats": 4, "beatType": 4}], "tempos": []}"#,
        )
        .unwrap();
        assert!(load_project(Some(&path), &AppConfig::default()).is_err());
    }

    #[test]
    fn test_loop_measure_action() {
        let mut project = ProjectState::default();
        project.set_time_signature(TimeSignature::new(3, 3, 4));
        let store = SequencerStore::start(project).unwrap();

        let changed = loop_action(&store, LoopAction::Measure { x: 960.0, offset: 0.0, zoom: 1.0 }).unwrap();
        assert!(changed);
        let range = store.state().loop_range;
        assert_eq!(range.start_tick, Some(3840));
        assert_eq!(range.end_tick, Some(3840 + 1440));

        assert!(!loop_action(&store, LoopAction::Show).unwrap());
        assert!(loop_action(&store, LoopAction::Set { start: 10, end: 5 }).is_err());
        assert!(loop_action(&store, LoopAction::Measure { x: 100.0, offset: 0.0, zoom: 0.0 }).is_err());
        assert_eq!(store.state().loop_range.start_tick, Some(3840));
    }
}
