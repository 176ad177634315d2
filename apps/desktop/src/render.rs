//! Plain-text rendering of outcomes for the terminal.

use std::fmt::Write as _;

use client_core::{
    severity, Catalog, ClientError, ComposeReport, HealthReport, Outcome, ScentProfile,
};
use shared::error::ErrorKind;

const BAR_WIDTH: usize = 20;

pub fn score_line(score: f64) -> String {
    gauge_line(score, severity::needle_angle(score))
}

fn gauge_line(score: f64, needle_angle: f64) -> String {
    format!("Severity: {score:.1}/10 (gauge {needle_angle:+.0}°)")
}

pub fn compose_report(report: &ComposeReport) -> String {
    match report {
        ComposeReport::Profile(profile) => profile_text(profile),
        ComposeReport::NoSequence { score } => format!(
            "{}\nNo scent sequence was produced; try rephrasing.\n",
            score_line(*score)
        ),
    }
}

fn profile_text(profile: &ScentProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", gauge_line(profile.score, profile.needle_angle));
    for note in &profile.notes {
        let filled = (note.strength as usize * BAR_WIDTH / 100).min(BAR_WIDTH);
        let _ = writeln!(
            out,
            "  {:<40} [{}{}] {}%",
            note.to_string(),
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            note.strength
        );
    }
    if let Some(justification) = &profile.justification {
        let _ = writeln!(out, "\n{justification}");
    }
    out
}

pub fn outcome(label: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Ok(message) => format!("{label}: ok. {message}"),
        Outcome::Failed(message) => format!("{label}: error. {message}"),
    }
}

pub fn health(report: &HealthReport) -> String {
    let mut out = String::new();
    for (name, result) in [
        ("composition service", &report.composition),
        ("playback service", &report.playback),
    ] {
        let line = match result {
            Ok(status) => outcome(name, status),
            Err(error) => format!("{name}: unreachable. {}", error.user_message()),
        };
        let _ = writeln!(out, "{line}");
    }
    out
}

pub fn catalog(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "Scent catalog is empty or could not be loaded.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} scents", catalog.len());
    for (name, entry) in catalog.iter() {
        let location = entry.device_location().unwrap_or("-");
        let _ = writeln!(out, "  {location:>3}  {name}");
    }
    for (location, names) in catalog.duplicate_locations() {
        let _ = writeln!(
            out,
            "warning: location {location} is shared by {}",
            names.join(", ")
        );
    }
    out
}

pub fn error(error: &ClientError) -> String {
    let prefix = match error.kind() {
        ErrorKind::UserInput => "Input",
        ErrorKind::Translation => "Cannot play sequence",
        ErrorKind::Protocol => "Service error",
        ErrorKind::Transport => "Connection problem",
    };
    format!("{prefix}: {}", error.user_message())
}
