//! CLI command implementations

use crate::output::{table, to_json, FieldRow, LogRow, OutputFormat};
use crate::replay::{self, Report};
use crate::trace::Trace;
use anyhow::Context;
use kino_vimeo::{RemotePlayerConfig, TechOptions, VimeoTech};
use serde_json::json;
use std::path::Path;

/// Replay a trace file
pub async fn replay(path: &Path, format: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading trace {}", path.display()))?;
    let trace = Trace::from_json(&json)?;

    // Settle delays and timeouts elapse instantly
    tokio::time::pause();
    let report = tokio::task::LocalSet::new()
        .run_until(replay::run(&trace))
        .await;

    print_report(&report, format);
    Ok(())
}

fn print_report(report: &Report, format: &str) {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(report)),
        OutputFormat::Table => {
            let rows = report
                .log
                .iter()
                .map(|e| LogRow { at_ms: e.at_ms, text: e.text.clone() })
                .collect();
            println!("{}", table::<LogRow>(rows));
            println!("{}", table(snapshot_rows(report)));
        }
        OutputFormat::Text => {
            for entry in &report.log {
                println!("{:>7}ms  {}", entry.at_ms, entry.text);
            }
            println!();
            for row in snapshot_rows(report) {
                println!("  {}: {}", row.field, row.value);
            }
        }
    }
}

fn snapshot_rows(report: &Report) -> Vec<FieldRow> {
    let mut rows = vec![FieldRow::new("paused", report.paused)];
    match &report.snapshot {
        Some(s) => {
            rows.push(FieldRow::new("state", s.state));
            rows.push(FieldRow::new("current_time", s.current_time));
            rows.push(FieldRow::new("duration", s.duration));
            rows.push(FieldRow::new("volume", s.volume));
            rows.push(FieldRow::new("muted", s.muted));
            rows.push(FieldRow::new("buffered", format!("0-{}", s.buffered().end)));
        }
        None => rows.push(FieldRow::new("state", "no player")),
    }
    if let Some(error) = &report.error {
        rows.push(FieldRow::new("error", format!("{}: {}", error.code, error.message)));
    }
    rows
}

/// Show the Vimeo constructor configuration for a set of tech options
pub fn config(path: &Path, format: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading options {}", path.display()))?;
    let options = TechOptions::from_json(&json)?;
    let config = RemotePlayerConfig::from_options(&options);
    let video_id = options.source.as_ref().and_then(|s| s.video_id());

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!(
                "{}",
                to_json(&json!({ "config": config, "videoId": video_id }))
            );
        }
        OutputFormat::Table | OutputFormat::Text => {
            let rows = vec![
                FieldRow::new("element", &options.tech_id),
                FieldRow::new("url", config.url.as_deref().unwrap_or("-")),
                FieldRow::new("video id", video_id.as_deref().unwrap_or("-")),
                FieldRow::new("autoplay", config.autoplay),
                FieldRow::new("muted", config.muted),
                FieldRow::new("loop", config.looping),
                FieldRow::new("controls", config.controls),
                FieldRow::new("responsive", config.responsive),
                FieldRow::new("pip", config.pip),
                FieldRow::new("dnt", config.dnt),
            ];
            println!("{}", table(rows));
        }
    }

    Ok(())
}

/// Report whether the tech plays `mime_type`
pub fn can_play(mime_type: &str, format: &str) {
    let answer = if VimeoTech::can_play_type(mime_type) { "probably" } else { "" };

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!("{}", to_json(&json!({ "type": mime_type, "canPlay": answer })));
        }
        OutputFormat::Table | OutputFormat::Text => {
            if answer.is_empty() {
                println!("{mime_type}: not supported");
            } else {
                println!("{mime_type}: {answer}");
            }
        }
    }
}
