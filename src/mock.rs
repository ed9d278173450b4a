use chrono::NaiveDate;

use crate::models::{
    AttendanceRecord, AttendanceStatus, Department, EmploymentCategory, Faculty, GradeRecord,
    Lookup, Program, Section, Student,
};

fn opt(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn lookup(code: &str, name: &str) -> Lookup {
    Lookup {
        code: code.to_string(),
        name: name.to_string(),
    }
}

pub fn programs() -> Vec<Program> {
    vec![
        lookup("BSIT", "BS Information Technology"),
        lookup("BSCS", "BS Computer Science"),
        lookup("BSEd", "Bachelor of Secondary Education"),
        lookup("BSBA", "BS Business Administration"),
    ]
}

pub fn departments() -> Vec<Department> {
    vec![
        lookup("CCS", "College of Computer Studies"),
        lookup("COE", "College of Education"),
        lookup("CBA", "College of Business and Accountancy"),
        lookup("REG", "Office of the Registrar"),
    ]
}

/// Raw student rows as the front-end mock served them, one stale duplicate included.
pub fn students() -> Vec<Student> {
    let rows = [
        (1, "Avery", "Lim", "BSIT", "1st Year", "10A"),
        (2, "Jules", "Moreno", "BSIT", "2nd Year", "20A"),
        (3, "Kiara", "Patel", "BSCS", "1st Year", "10A"),
        (4, "Paolo", "Dizon", "BSCS", "3rd Year", "30A"),
        (5, "Mika", "Santos", "BSEd", "4th Year", "40A"),
        (6, "Rafael", "Cruz", "BSIT", "2nd Year", "20B"),
        (7, "Noor", "Haddad", "", "1st Year", ""),
        (8, "Tess", "Villanueva", "BSBA", "", ""),
        (3, "Kiara", "Patel", "BSCS", "2nd Year", "20A"),
    ];

    rows.into_iter()
        .map(|(id, first, last, program, year, section)| Student {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@campus.edu", first.to_lowercase(), last.to_lowercase()),
            program: opt(program),
            year_level: opt(year),
            section: opt(section),
        })
        .collect()
}

pub fn faculty() -> Vec<Faculty> {
    use EmploymentCategory::{Administrative, Teaching};

    let rows = [
        (1, "Grace", "Tan", "CCS", "Full-time", Teaching),
        (2, "Miguel", "Ramos", "CCS", "Part-time", Teaching),
        (3, "Lorna", "Aquino", "COE", "Full-time", Teaching),
        (4, "Dante", "Flores", "CBA", "Full-time", Teaching),
        (5, "Irene", "Bautista", "REG", "Full-time", Administrative),
        (6, "Oscar", "Mendoza", "", "Part-time", Teaching),
        (7, "Cora", "Reyes", "COE", "", Teaching),
    ];

    rows.into_iter()
        .map(|(id, first, last, department, employment_type, category)| Faculty {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@campus.edu", first.to_lowercase(), last.to_lowercase()),
            department: opt(department),
            employment_type: opt(employment_type),
            category,
        })
        .collect()
}

pub fn sections() -> Vec<Section> {
    [
        ("10A", "BSIT", "1st Year"),
        ("20A", "BSIT", "2nd Year"),
        ("20B", "BSIT", "2nd Year"),
        ("10A", "BSCS", "1st Year"),
        ("20A", "BSCS", "2nd Year"),
        ("30A", "BSCS", "3rd Year"),
        ("40A", "BSEd", "4th Year"),
    ]
    .into_iter()
    .map(|(code, program, year_level)| Section {
        code: code.to_string(),
        program: program.to_string(),
        year_level: year_level.to_string(),
    })
    .collect()
}

pub fn grades() -> Vec<GradeRecord> {
    let rows = [
        (1, "Introduction to Computing", Some(88.0), Some(91.0), Some(90.0), ""),
        (1, "Discrete Mathematics", Some(72.0), Some(70.0), Some(71.5), "Needs review"),
        (1, "Purposive Communication", Some(85.0), None, None, ""),
        (2, "Data Structures", Some(92.0), Some(88.0), Some(90.0), ""),
        (2, "Web Development", None, None, None, ""),
        (3, "Computer Programming 1", Some(79.0), Some(81.0), Some(75.0), ""),
        (4, "Operating Systems", Some(68.0), Some(74.0), None, "Missed midterm project"),
        (5, "Assessment of Learning", Some(93.0), Some(95.0), Some(94.0), ""),
    ];

    rows.into_iter()
        .map(|(student_id, subject, prelim, midterm, final_grade, remark)| GradeRecord {
            student_id,
            subject: subject.to_string(),
            prelim,
            midterm,
            final_grade,
            remark: opt(remark),
        })
        .collect()
}

pub fn attendance() -> Vec<AttendanceRecord> {
    use AttendanceStatus::{Absent, Excused, Late, Present};

    let rows = [
        (1, "Introduction to Computing", (2026, 6, 8), Present, ""),
        (1, "Introduction to Computing", (2026, 6, 10), Present, ""),
        (1, "Introduction to Computing", (2026, 6, 12), Late, "Traffic"),
        (1, "Introduction to Computing", (2026, 6, 15), Present, ""),
        (1, "Discrete Mathematics", (2026, 6, 9), Absent, ""),
        (1, "Discrete Mathematics", (2026, 6, 11), Excused, "Medical certificate"),
        (1, "Discrete Mathematics", (2026, 6, 16), Present, ""),
        (2, "Data Structures", (2026, 6, 8), Present, ""),
        (2, "Data Structures", (2026, 6, 10), Present, ""),
        (2, "Data Structures", (2026, 6, 12), Present, ""),
        (3, "Computer Programming 1", (2026, 6, 9), Late, ""),
        (3, "Computer Programming 1", (2026, 6, 11), Absent, ""),
    ];

    rows.into_iter()
        .filter_map(|(student_id, subject, (y, m, d), status, remark)| {
            Some(AttendanceRecord {
                student_id,
                subject: subject.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                status,
                remark: opt(remark),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dedup_by_id;

    #[test]
    fn mock_students_collapse_to_unique_ids() {
        let raw = students();
        let unique = dedup_by_id(raw.clone());
        assert_eq!(raw.len(), 9);
        assert_eq!(unique.len(), 8);
        assert_eq!(unique[2].year_level.as_deref(), Some("2nd Year"));
    }

    #[test]
    fn every_mock_date_is_valid() {
        assert_eq!(attendance().len(), 12);
    }
}
