use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::models::{EmploymentCategory, Section};

const STUDENT_ID_OFFSET: i64 = 100;
const STAFF_ID_OFFSET: i64 = 1000;
const SECTION_LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Dashboard a user lands on after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => f.write_str("Student"),
            Self::Teacher => f.write_str("Teacher"),
            Self::Admin => f.write_str("Admin"),
        }
    }
}

/// Offsets are applied in `i128` so no storage id can overflow.
fn offset_id(offset: i64, storage_id: i64) -> String {
    (i128::from(offset) + i128::from(storage_id)).to_string()
}

pub fn student_id(storage_id: i64) -> String {
    offset_id(STUDENT_ID_OFFSET, storage_id)
}

pub fn student_username(storage_id: i64) -> String {
    format!("s{}", student_id(storage_id))
}

/// Inverse of [`student_id`] for lookups by public id.
pub fn student_storage_id(public_id: &str) -> Option<i64> {
    let id: i64 = public_id.trim().parse().ok()?;
    let storage = id.checked_sub(STUDENT_ID_OFFSET)?;
    (storage > 0).then_some(storage)
}

pub fn teacher_id(storage_id: i64) -> String {
    offset_id(STAFF_ID_OFFSET, storage_id)
}

pub fn teacher_username(storage_id: i64, category: EmploymentCategory) -> String {
    let prefix = match category {
        EmploymentCategory::Teaching => 't',
        EmploymentCategory::Administrative => 'a',
    };
    format!("{prefix}{}", teacher_id(storage_id))
}

pub fn admin_username(storage_id: i64) -> String {
    format!("a{}", offset_id(STAFF_ID_OFFSET, storage_id))
}

pub fn role_for_username(username: &str) -> Option<Role> {
    match username.chars().next()? {
        's' => Some(Role::Student),
        't' => Some(Role::Teacher),
        'a' => Some(Role::Admin),
        _ => None,
    }
}

fn year_prefix(year_level: &str) -> &'static str {
    match year_level.trim() {
        "1st Year" => "10",
        "2nd Year" => "20",
        "3rd Year" => "30",
        "4th Year" => "40",
        _ => "10",
    }
}

/// Year prefix plus a letter cycling A..H by how many sections already exist.
pub fn section_code(year_level: &str, existing_count: usize) -> String {
    let letter = SECTION_LETTERS[existing_count % SECTION_LETTERS.len()];
    format!("{}{letter}", year_prefix(year_level))
}

pub fn next_section_code(existing: &[Section], program: &str, year_level: &str) -> String {
    let count = existing
        .iter()
        .filter(|s| s.program == program && s.year_level == year_level)
        .count();
    section_code(year_level, count)
}
