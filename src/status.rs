use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{AttendanceRecord, AttendanceStatus, GradeRecord};

pub const PASSING_SCORE: f64 = 75.0;

const LATE_WEIGHT: f64 = 0.5;
const EXCUSED_WEIGHT: f64 = 0.8;

/// Ordered so that adding scores only moves a record forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TermStatus {
    NotSubmitted,
    Incomplete,
    Complete,
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotSubmitted => "Not Submitted",
            Self::Incomplete => "Incomplete",
            Self::Complete => "Complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Passed,
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("Passed"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

pub fn resolve_term_status<const N: usize>(scores: &[Option<f64>; N]) -> TermStatus {
    let present = scores.iter().filter(|s| s.is_some()).count();
    if present == 0 {
        TermStatus::NotSubmitted
    } else if present == N {
        TermStatus::Complete
    } else {
        TermStatus::Incomplete
    }
}

pub fn resolve_pass_fail(final_score: f64) -> Verdict {
    if final_score >= PASSING_SCORE {
        Verdict::Passed
    } else {
        Verdict::Failed
    }
}

fn round_1_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Weighted completion percentage. An empty slice yields 0.
pub fn resolve_attendance_rate(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let credited: f64 = records
        .iter()
        .map(|r| match r.status {
            AttendanceStatus::Present => 1.0,
            AttendanceStatus::Late => LATE_WEIGHT,
            AttendanceStatus::Excused => EXCUSED_WEIGHT,
            AttendanceStatus::Absent => 0.0,
        })
        .sum();

    round_1_decimal(credited / records.len() as f64 * 100.0)
}

pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{r:.1}%"),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAttendance {
    pub subject: String,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub total: usize,
    pub rate: f64,
}

/// Per-subject attendance, ordered by subject name.
pub fn summarize_attendance(records: &[AttendanceRecord]) -> Vec<SubjectAttendance> {
    let mut by_subject: BTreeMap<&str, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        by_subject
            .entry(record.subject.as_str())
            .or_default()
            .push(record.clone());
    }

    by_subject
        .into_iter()
        .map(|(subject, rows)| {
            let count = |status: AttendanceStatus| rows.iter().filter(|r| r.status == status).count();
            SubjectAttendance {
                subject: subject.to_string(),
                present: count(AttendanceStatus::Present),
                absent: count(AttendanceStatus::Absent),
                late: count(AttendanceStatus::Late),
                excused: count(AttendanceStatus::Excused),
                total: rows.len(),
                rate: resolve_attendance_rate(&rows),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradeSummary {
    pub passed: usize,
    pub failed: usize,
    pub incomplete: usize,
    pub not_submitted: usize,
}

pub fn summarize_grades(records: &[GradeRecord]) -> GradeSummary {
    let mut summary = GradeSummary::default();
    for record in records {
        match (record.status(), record.verdict()) {
            (_, Some(Verdict::Passed)) => summary.passed += 1,
            (_, Some(Verdict::Failed)) => summary.failed += 1,
            (TermStatus::NotSubmitted, None) => summary.not_submitted += 1,
            (_, None) => summary.incomplete += 1,
        }
    }
    summary
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("score '{0}' is not a number")]
    NotNumeric(String),
    #[error("score '{0}' is not a finite number")]
    NotFinite(String),
}

/// Parses a raw score cell. Empty text means the score is absent.
pub fn parse_score(raw: &str) -> Result<Option<f64>, ScoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ScoreError::NotNumeric(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(ScoreError::NotFinite(trimmed.to_string()));
    }
    Ok(Some(value))
}
