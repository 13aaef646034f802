//! Trace replay on a paused tokio clock

use crate::scripted::{Entry, Log, RecordingHost, ScriptedFactory};
use crate::trace::{Step, Trace};
use kino_vimeo::{
    PlaybackSnapshot, ReadinessGate, Source, TechEnv, TechError, TokioSpawner, VimeoTech,
};
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a replay
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub log: Vec<Entry>,
    pub snapshot: Option<PlaybackSnapshot>,
    pub paused: bool,
    pub error: Option<TechError>,
}

/// Let spawned confirmations run to completion
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Run `trace` against a fresh tech. Must be called inside a `LocalSet`.
pub async fn run(trace: &Trace) -> Report {
    let log = Log::new();
    let factory = Rc::new(ScriptedFactory::new(log.clone()));
    let gate = Rc::new(ReadinessGate::new());

    let env = TechEnv::new(
        Rc::new(RecordingHost::new(log.clone())),
        factory.clone(),
        Rc::new(TokioSpawner),
    )
    .with_gate(gate.clone())
    .with_platform(trace.platform.into())
    .with_policy(trace.policy());

    let tech = VimeoTech::new(trace.options.clone(), env);
    settle().await;

    for (index, step) in trace.steps.iter().enumerate() {
        debug!(index, ?step, "Replaying step");
        match step {
            Step::LibraryReady => gate.signal_ready(),
            Step::LibraryFailed { message } => gate.signal_failed(message.clone()),
            Step::Remote { event } => match factory.player() {
                Some(player) => {
                    log.push(format!("< {}", event.kind()));
                    if !player.emit(event.clone()) {
                        debug!(kind = %event.kind(), "No listener for remote event");
                    }
                }
                None => warn!(index, "Remote event before the player exists"),
            },
            Step::Reject { error } => match factory.player() {
                Some(player) => player.reject(error.clone()),
                None => warn!(index, "Rejection before the player exists"),
            },
            Step::Play => tech.play(),
            Step::Pause => tech.pause(),
            Step::Seek { seconds } => tech.set_current_time(*seconds),
            Step::Volume { volume } => tech.set_volume(*volume),
            Step::Mute { muted } => tech.set_muted(*muted),
            Step::Source { src } => tech.set_source(Source::new(src.clone())),
            Step::Advance { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            Step::Dispose => tech.dispose(),
        }
        settle().await;
    }

    Report {
        log: log.entries(),
        snapshot: tech.snapshot(),
        paused: tech.paused(),
        error: tech.error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kino_vimeo::PlaybackState;

    async fn replay(json: &str) -> Report {
        let trace = Trace::from_json(json).unwrap();
        tokio::task::LocalSet::new().run_until(run(&trace)).await
    }

    fn texts(report: &Report) -> Vec<&str> {
        report.log.iter().map(|e| e.text.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_trace() {
        let report = replay(include_str!("../traces/autoplay.json")).await;

        let log = texts(&report);
        let mute = log.iter().position(|t| *t == "> setMuted true").unwrap();
        let play = log.iter().position(|t| *t == "> play").unwrap();
        assert!(mute < play);
        assert!(report.log[play].at_ms >= 600);

        let snapshot = report.snapshot.unwrap();
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert!(snapshot.muted);
        assert!(!report.paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_play_keeps_tech_paused() {
        let report = replay(
            r#"{
                "options": { "techId": "t", "source": { "src": "1234", "type": "video/vimeo" } },
                "steps": [
                    { "action": "libraryReady" },
                    { "action": "remote", "event": { "event": "loaded" } },
                    { "action": "reject", "error": { "name": "NotAllowedError", "method": "play" } },
                    { "action": "play" }
                ]
            }"#,
        )
        .await;

        assert!(report.paused);
        let log = texts(&report);
        assert!(log.contains(&"> play"));
        assert!(!log.contains(&"play"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_library_failure_trace() {
        let report = replay(
            r#"{
                "options": { "techId": "t" },
                "steps": [ { "action": "libraryFailed", "message": "blocked" } ]
            }"#,
        )
        .await;

        let error = report.error.unwrap();
        assert_eq!(error.code, "LibraryLoadError load");
        assert!(report.snapshot.is_none());
    }
}
