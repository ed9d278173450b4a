use std::io::Read;

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;

use crate::models::EmploymentCategory;
use crate::status::parse_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    Students,
    Faculty,
    Grades,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub program: Option<String>,
    pub year_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub category: EmploymentCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    pub student_email: String,
    pub subject: String,
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub final_grade: Option<f64>,
    pub remark: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

pub fn read_students<R: Read>(reader: R) -> anyhow::Result<Vec<StudentRow>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (idx, result) in csv.deserialize::<StudentRow>().enumerate() {
        let mut row = result.with_context(|| format!("student row {}", idx + 1))?;
        row.program = blank_to_none(row.program);
        row.year_level = blank_to_none(row.year_level);
        rows.push(row);
    }

    Ok(rows)
}

pub fn read_faculty<R: Read>(reader: R) -> anyhow::Result<Vec<FacultyRow>> {
    #[derive(Deserialize)]
    struct CsvRow {
        first_name: String,
        last_name: String,
        email: String,
        department: Option<String>,
        employment_type: Option<String>,
        category: String,
    }

    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (idx, result) in csv.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("faculty row {}", idx + 1))?;
        let category = row
            .category
            .parse::<EmploymentCategory>()
            .with_context(|| format!("faculty row {}", idx + 1))?;
        rows.push(FacultyRow {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department: blank_to_none(row.department),
            employment_type: blank_to_none(row.employment_type),
            category,
        });
    }

    Ok(rows)
}

/// Score cells are read as text so malformed values fail instead of becoming blanks.
pub fn read_grades<R: Read>(reader: R) -> anyhow::Result<Vec<GradeRow>> {
    #[derive(Deserialize)]
    struct CsvRow {
        student_email: String,
        subject: String,
        #[serde(default)]
        prelim: String,
        #[serde(default)]
        midterm: String,
        #[serde(default)]
        final_grade: String,
        remark: Option<String>,
    }

    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (idx, result) in csv.deserialize::<CsvRow>().enumerate() {
        let line = idx + 1;
        let row = result.with_context(|| format!("grade row {line}"))?;
        rows.push(GradeRow {
            student_email: row.student_email,
            subject: row.subject,
            prelim: parse_score(&row.prelim).with_context(|| format!("grade row {line}: prelim"))?,
            midterm: parse_score(&row.midterm)
                .with_context(|| format!("grade row {line}: midterm"))?,
            final_grade: parse_score(&row.final_grade)
                .with_context(|| format!("grade row {line}: final"))?,
            remark: blank_to_none(row.remark),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_students_with_blank_attributes() {
        let data = "first_name,last_name,email,program,year_level\n\
                    Ana,Reyes,ana@campus.edu,BSIT,1st Year\n\
                    Ben,Go,ben@campus.edu,,\n";
        let rows = read_students(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].program.as_deref(), Some("BSIT"));
        assert_eq!(rows[1].program, None);
        assert_eq!(rows[1].year_level, None);
    }

    #[test]
    fn reads_faculty_categories() {
        let data = "first_name,last_name,email,department,employment_type,category\n\
                    Grace,Tan,grace@campus.edu,CCS,Full-time,Teaching\n\
                    Irene,Bautista,irene@campus.edu,REG,,administrative\n";
        let rows = read_faculty(data.as_bytes()).unwrap();

        assert_eq!(rows[0].category, EmploymentCategory::Teaching);
        assert_eq!(rows[1].category, EmploymentCategory::Administrative);
        assert_eq!(rows[1].employment_type, None);
    }

    #[test]
    fn rejects_unknown_faculty_category() {
        let data = "first_name,last_name,email,department,employment_type,category\n\
                    Grace,Tan,grace@campus.edu,CCS,Full-time,Janitorial\n";
        assert!(read_faculty(data.as_bytes()).is_err());
    }

    #[test]
    fn reads_grades_with_absent_scores() {
        let data = "student_email,subject,prelim,midterm,final_grade,remark\n\
                    ana@campus.edu,Algebra,90,,,\n";
        let rows = read_grades(data.as_bytes()).unwrap();

        assert_eq!(
            rows,
            vec![GradeRow {
                student_email: "ana@campus.edu".to_string(),
                subject: "Algebra".to_string(),
                prelim: Some(90.0),
                midterm: None,
                final_grade: None,
                remark: None,
            }]
        );
    }

    #[test]
    fn malformed_score_fails_the_import() {
        let data = "student_email,subject,prelim,midterm,final_grade,remark\n\
                    ana@campus.edu,Algebra,90,eighty,,\n";
        let err = read_grades(data.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("grade row 1: midterm"));
        assert!(format!("{err:#}").contains("eighty"));
    }
}
