use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::status::{self, TermStatus, Verdict};

pub const PROGRAM_NOT_SPECIFIED: &str = "Program Not Specified";
pub const YEAR_NOT_SPECIFIED: &str = "Year Not Specified";
pub const UNSPECIFIED_DEPARTMENT: &str = "Unspecified Department";
pub const UNSPECIFIED_TYPE: &str = "Unspecified Type";

/// Records that carry a unique storage identity.
pub trait Identified {
    fn storage_id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub program: Option<String>,
    pub year_level: Option<String>,
    pub section: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Identified for Student {
    fn storage_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum EmploymentCategory {
    Teaching,
    Administrative,
}

impl FromStr for EmploymentCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teaching" => Ok(Self::Teaching),
            "administrative" => Ok(Self::Administrative),
            other => bail!("unknown employment category '{other}'"),
        }
    }
}

impl fmt::Display for EmploymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teaching => write!(f, "Teaching"),
            Self::Administrative => write!(f, "Administrative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub category: EmploymentCategory,
}

impl Faculty {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Identified for Faculty {
    fn storage_id(&self) -> i64 {
        self.id
    }
}

/// Reference row used to turn a program or department code into a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub code: String,
    pub name: String,
}

pub type Program = Lookup;
pub type Department = Lookup;

/// Display name for `key`, falling back to the key itself when no lookup matches.
pub fn display_name(lookups: &[Lookup], key: &str) -> String {
    lookups
        .iter()
        .find(|l| l.code == key)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| key.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub code: String,
    pub program: String,
    pub year_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: i64,
    pub subject: String,
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub final_grade: Option<f64>,
    pub remark: Option<String>,
}

impl GradeRecord {
    pub fn scores(&self) -> [Option<f64>; 3] {
        [self.prelim, self.midterm, self.final_grade]
    }

    pub fn status(&self) -> TermStatus {
        status::resolve_term_status(&self.scores())
    }

    /// Pass/fail is only defined once every period has a score.
    pub fn verdict(&self) -> Option<Verdict> {
        match (self.status(), self.final_grade) {
            (TermStatus::Complete, Some(score)) => Some(status::resolve_pass_fail(score)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            "excused" => Ok(Self::Excused),
            other => bail!("unknown attendance status '{other}'"),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
            Self::Excused => "Excused",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub subject: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub remark: Option<String>,
}

/// Collapses records sharing a storage id, last value wins.
///
/// Each surviving record keeps the position where its id was first seen.
pub fn dedup_by_id<T: Identified>(records: Vec<T>) -> Vec<T> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(&record.storage_id()) {
            Some(&idx) => {
                tracing::debug!(id = record.storage_id(), "replacing duplicate record");
                out[idx] = record;
            }
            None => {
                positions.insert(record.storage_id(), out.len());
                out.push(record);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, first_name: &str) -> Student {
        Student {
            id,
            first_name: first_name.to_string(),
            last_name: "Reyes".to_string(),
            email: format!("{}@campus.edu", first_name.to_lowercase()),
            program: Some("BSIT".to_string()),
            year_level: Some("1st Year".to_string()),
            section: None,
        }
    }

    fn grade(prelim: Option<f64>, midterm: Option<f64>, final_grade: Option<f64>) -> GradeRecord {
        GradeRecord {
            student_id: 1,
            subject: "Data Structures".to_string(),
            prelim,
            midterm,
            final_grade,
            remark: None,
        }
    }

    #[test]
    fn dedup_keeps_last_value_at_first_position() {
        let records = vec![student(1, "Ana"), student(2, "Ben"), student(1, "Andrea")];
        let deduped = dedup_by_id(records);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].first_name, "Andrea");
        assert_eq!(deduped[1].first_name, "Ben");
    }

    #[test]
    fn verdict_requires_complete_record() {
        assert_eq!(grade(Some(90.0), None, None).verdict(), None);
        assert_eq!(
            grade(Some(92.0), Some(88.0), Some(90.0)).verdict(),
            Some(Verdict::Passed)
        );
        assert_eq!(
            grade(Some(80.0), Some(70.0), Some(74.5)).verdict(),
            Some(Verdict::Failed)
        );
    }

    #[test]
    fn parses_attendance_status_case_insensitively() {
        assert_eq!("Late".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Late);
        assert_eq!(" excused ".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Excused);
        assert!("tardy".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn display_name_falls_back_to_code() {
        let programs = vec![Lookup {
            code: "BSIT".to_string(),
            name: "BS Information Technology".to_string(),
        }];
        assert_eq!(display_name(&programs, "BSIT"), "BS Information Technology");
        assert_eq!(display_name(&programs, "BSCS"), "BSCS");
    }
}
