use std::fmt::Write;

use chrono::NaiveDate;

use crate::breakdown::{self, BreakdownTable};
use crate::ids;
use crate::models::{
    display_name, AttendanceRecord, Department, Faculty, GradeRecord, Program, Student,
    PROGRAM_NOT_SPECIFIED, UNSPECIFIED_DEPARTMENT, UNSPECIFIED_TYPE, YEAR_NOT_SPECIFIED,
};
use crate::ordering::{self, SecondaryOrder};
use crate::status::{self, format_rate};

/// Everything a campus report is computed from, fetched in one pass.
#[derive(Debug, Clone, Default)]
pub struct CampusSnapshot {
    pub students: Vec<Student>,
    pub faculty: Vec<Faculty>,
    pub programs: Vec<Program>,
    pub departments: Vec<Department>,
    pub grades: Vec<GradeRecord>,
    pub attendance: Vec<AttendanceRecord>,
}

pub fn sorted_student_population(students: &[Student], programs: &[Program]) -> BreakdownTable {
    ordering::sort_breakdown(
        breakdown::student_population(students),
        PROGRAM_NOT_SPECIFIED,
        YEAR_NOT_SPECIFIED,
        SecondaryOrder::YearLevel,
        |key| display_name(programs, key),
    )
}

pub fn sorted_faculty_population(faculty: &[Faculty], departments: &[Department]) -> BreakdownTable {
    ordering::sort_breakdown(
        breakdown::faculty_population(faculty),
        UNSPECIFIED_DEPARTMENT,
        UNSPECIFIED_TYPE,
        SecondaryOrder::Lexicographic,
        |key| display_name(departments, key),
    )
}

/// Renders a sorted breakdown as an indented list.
pub fn render_breakdown<F>(output: &mut String, table: &BreakdownTable, display: F)
where
    F: Fn(&str) -> String,
{
    if table.is_empty() {
        let _ = writeln!(output, "No records.");
        return;
    }

    for row in &table.rows {
        let _ = writeln!(output, "- {} ({}): {}", display(&row.key), row.key, row.total);
        for cell in &row.cells {
            let _ = writeln!(output, "  - {}: {}", cell.key, cell.count);
        }
    }
    let _ = writeln!(output, "Total: {}", table.grand_total());
}

pub fn build_report(generated_on: NaiveDate, snapshot: &CampusSnapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Campus Report");
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Student Population");
    let students = sorted_student_population(&snapshot.students, &snapshot.programs);
    render_breakdown(&mut output, &students, |key| {
        display_name(&snapshot.programs, key)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Faculty Population");
    let faculty = sorted_faculty_population(&snapshot.faculty, &snapshot.departments);
    render_breakdown(&mut output, &faculty, |key| {
        display_name(&snapshot.departments, key)
    });

    let grades = status::summarize_grades(&snapshot.grades);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Standing");
    if snapshot.grades.is_empty() {
        let _ = writeln!(output, "No grades recorded.");
    } else {
        let _ = writeln!(output, "- Passed: {}", grades.passed);
        let _ = writeln!(output, "- Failed: {}", grades.failed);
        let _ = writeln!(output, "- Incomplete: {}", grades.incomplete);
        let _ = writeln!(output, "- Not Submitted: {}", grades.not_submitted);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Faculty Accounts");
    if snapshot.faculty.is_empty() {
        let _ = writeln!(output, "No faculty recorded.");
    }
    for member in &snapshot.faculty {
        let _ = writeln!(
            output,
            "- {}: {} ({})",
            member.full_name(),
            ids::teacher_username(member.id, member.category),
            member.category
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance by Student");
    let mut any_attendance = false;
    for student in &snapshot.students {
        let records: Vec<AttendanceRecord> = snapshot
            .attendance
            .iter()
            .filter(|r| r.student_id == student.id)
            .cloned()
            .collect();
        if records.is_empty() {
            continue;
        }
        any_attendance = true;
        let _ = writeln!(
            output,
            "- {} ({})",
            student.full_name(),
            ids::student_id(student.id)
        );
        for summary in status::summarize_attendance(&records) {
            let _ = writeln!(
                output,
                "  - {}: {} over {} days",
                summary.subject,
                format_rate(Some(summary.rate)),
                summary.total
            );
        }
    }
    if !any_attendance {
        let _ = writeln!(output, "No attendance recorded.");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use crate::models::dedup_by_id;

    fn mock_snapshot() -> CampusSnapshot {
        CampusSnapshot {
            students: dedup_by_id(mock::students()),
            faculty: dedup_by_id(mock::faculty()),
            programs: mock::programs(),
            departments: mock::departments(),
            grades: mock::grades(),
            attendance: mock::attendance(),
        }
    }

    #[test]
    fn student_population_sorts_by_program_name() {
        let snapshot = mock_snapshot();
        let table = sorted_student_population(&snapshot.students, &snapshot.programs);
        let keys: Vec<&str> = table.rows.iter().map(|r| r.key.as_str()).collect();

        assert_eq!(keys, vec!["BSBA", "BSCS", "BSIT", "BSEd", PROGRAM_NOT_SPECIFIED]);
        assert_eq!(table.grand_total(), 8);
    }

    #[test]
    fn faculty_population_keeps_unspecified_last() {
        let snapshot = mock_snapshot();
        let table = sorted_faculty_population(&snapshot.faculty, &snapshot.departments);
        let last = table.rows.last().unwrap();

        assert_eq!(last.key, UNSPECIFIED_DEPARTMENT);
        let coe = table.row("COE").unwrap();
        let cells: Vec<&str> = coe.cells.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(cells, vec!["Full-time", UNSPECIFIED_TYPE]);
    }

    #[test]
    fn report_contains_every_section() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let report = build_report(date, &mock_snapshot());

        assert!(report.contains("# Campus Report"));
        assert!(report.contains("Generated on 2026-06-20"));
        assert!(report.contains("- BS Information Technology (BSIT): 3"));
        assert!(report.contains("Total: 8"));
        assert!(report.contains("- Passed: 4"));
        assert!(report.contains("- Avery Lim (101)\n"));
        assert!(report.contains("  - Discrete Mathematics: 60.0% over 3 days"));
        assert!(report.contains("  - Introduction to Computing: 87.5% over 4 days"));
        assert!(!report.contains("75.7%"));
    }

    #[test]
    fn report_lists_faculty_accounts() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let report = build_report(date, &mock_snapshot());

        assert!(report.contains("## Faculty Accounts"));
        assert!(report.contains("- Grace Tan: t1001 (Teaching)"));
        assert!(report.contains("- Irene Bautista: a1005 (Administrative)"));
    }

    #[test]
    fn empty_snapshot_reports_without_failing() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let report = build_report(date, &CampusSnapshot::default());

        assert!(report.contains("No records."));
        assert!(report.contains("No grades recorded."));
        assert!(report.contains("No faculty recorded."));
        assert!(report.contains("No attendance recorded."));
    }
}
