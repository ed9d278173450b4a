use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Row};

use crate::import::{self, ImportKind};
use crate::mock;
use crate::models::{
    dedup_by_id, AttendanceRecord, Faculty, GradeRecord, Lookup, Section, Student,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_lookup(pool: &PgPool, table: &str, lookup: &Lookup) -> anyhow::Result<()> {
    let query = format!(
        "INSERT INTO campus.{table} (code, name) VALUES ($1, $2) \
         ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name"
    );
    sqlx::query(&query)
        .bind(&lookup.code)
        .bind(&lookup.name)
        .execute(pool)
        .await?;
    Ok(())
}

async fn upsert_student(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    program: Option<&str>,
    year_level: Option<&str>,
    section: Option<&str>,
) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query(
        r#"
        INSERT INTO campus.students (first_name, last_name, email, program, year_level, section)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE
        SET first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            program = EXCLUDED.program,
            year_level = EXCLUDED.year_level,
            section = COALESCE(EXCLUDED.section, campus.students.section)
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(program)
    .bind(year_level)
    .bind(section)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

async fn upsert_faculty(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    department: Option<&str>,
    employment_type: Option<&str>,
    category: &str,
) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query(
        r#"
        INSERT INTO campus.faculty
        (first_name, last_name, email, department, employment_type, category)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE
        SET first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            department = EXCLUDED.department,
            employment_type = EXCLUDED.employment_type,
            category = EXCLUDED.category
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(department)
    .bind(employment_type)
    .bind(category)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

async fn upsert_grade(pool: &PgPool, student_id: i64, grade: &GradeRecord) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO campus.grades (student_id, subject, prelim, midterm, final_grade, remark)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (student_id, subject) DO UPDATE
        SET prelim = EXCLUDED.prelim,
            midterm = EXCLUDED.midterm,
            final_grade = EXCLUDED.final_grade,
            remark = EXCLUDED.remark
        "#,
    )
    .bind(student_id)
    .bind(&grade.subject)
    .bind(grade.prelim)
    .bind(grade.midterm)
    .bind(grade.final_grade)
    .bind(grade.remark.as_deref())
    .execute(pool)
    .await?;
    Ok(())
}

/// Loads the mock dataset, remapping mock ids onto the ids Postgres assigns.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    for program in mock::programs() {
        upsert_lookup(pool, "programs", &program).await?;
    }
    for department in mock::departments() {
        upsert_lookup(pool, "departments", &department).await?;
    }

    let mut student_ids: HashMap<i64, i64> = HashMap::new();
    for student in dedup_by_id(mock::students()) {
        let id = upsert_student(
            pool,
            &student.first_name,
            &student.last_name,
            &student.email,
            student.program.as_deref(),
            student.year_level.as_deref(),
            student.section.as_deref(),
        )
        .await?;
        student_ids.insert(student.id, id);
    }

    for member in dedup_by_id(mock::faculty()) {
        upsert_faculty(
            pool,
            &member.first_name,
            &member.last_name,
            &member.email,
            member.department.as_deref(),
            member.employment_type.as_deref(),
            &member.category.to_string(),
        )
        .await?;
    }

    for section in mock::sections() {
        sqlx::query(
            r#"
            INSERT INTO campus.sections (code, program, year_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (code, program) DO NOTHING
            "#,
        )
        .bind(&section.code)
        .bind(&section.program)
        .bind(&section.year_level)
        .execute(pool)
        .await?;
    }

    for grade in mock::grades() {
        let student_id = *student_ids
            .get(&grade.student_id)
            .context("grade refers to an unknown mock student")?;
        upsert_grade(pool, student_id, &grade).await?;
    }

    for record in mock::attendance() {
        let student_id = *student_ids
            .get(&record.student_id)
            .context("attendance refers to an unknown mock student")?;
        sqlx::query(
            r#"
            INSERT INTO campus.attendance (student_id, subject, attended_on, status, remark)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, subject, attended_on) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(&record.subject)
        .bind(record.date)
        .bind(record.status.to_string())
        .bind(record.remark.as_deref())
        .execute(pool)
        .await?;
    }

    tracing::info!(students = student_ids.len(), "seeded campus schema");
    Ok(())
}

pub async fn fetch_students(pool: &PgPool) -> anyhow::Result<Vec<Student>> {
    let rows = sqlx::query(
        "SELECT id, first_name, last_name, email, program, year_level, section \
         FROM campus.students ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Student {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            program: row.get("program"),
            year_level: row.get("year_level"),
            section: row.get("section"),
        })
        .collect())
}

pub async fn fetch_faculty(pool: &PgPool) -> anyhow::Result<Vec<Faculty>> {
    let rows = sqlx::query(
        "SELECT id, first_name, last_name, email, department, employment_type, category \
         FROM campus.faculty ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut faculty = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.get("id");
        let category: String = row.get("category");
        faculty.push(Faculty {
            id,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            department: row.get("department"),
            employment_type: row.get("employment_type"),
            category: category
                .parse()
                .with_context(|| format!("faculty {id} has an invalid category"))?,
        });
    }
    Ok(faculty)
}

pub async fn fetch_lookups(pool: &PgPool, table: &str) -> anyhow::Result<Vec<Lookup>> {
    let query = format!("SELECT code, name FROM campus.{table} ORDER BY code");
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| Lookup {
            code: row.get("code"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn fetch_sections(pool: &PgPool) -> anyhow::Result<Vec<Section>> {
    let rows = sqlx::query("SELECT code, program, year_level FROM campus.sections")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| Section {
            code: row.get("code"),
            program: row.get("program"),
            year_level: row.get("year_level"),
        })
        .collect())
}

pub async fn fetch_grades(
    pool: &PgPool,
    student_id: Option<i64>,
) -> anyhow::Result<Vec<GradeRecord>> {
    let mut query = String::from(
        "SELECT student_id, subject, prelim, midterm, final_grade, remark FROM campus.grades",
    );
    if student_id.is_some() {
        query.push_str(" WHERE student_id = $1");
    }

    let mut rows = sqlx::query(&query);
    if let Some(id) = student_id {
        rows = rows.bind(id);
    }

    Ok(rows
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| GradeRecord {
            student_id: row.get("student_id"),
            subject: row.get("subject"),
            prelim: row.get("prelim"),
            midterm: row.get("midterm"),
            final_grade: row.get("final_grade"),
            remark: row.get("remark"),
        })
        .collect())
}

pub async fn fetch_attendance(
    pool: &PgPool,
    student_id: Option<i64>,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut query = String::from(
        "SELECT student_id, subject, attended_on, status, remark FROM campus.attendance",
    );
    if student_id.is_some() {
        query.push_str(" WHERE student_id = $1");
    }
    query.push_str(" ORDER BY attended_on");

    let mut rows = sqlx::query(&query);
    if let Some(id) = student_id {
        rows = rows.bind(id);
    }

    let mut records = Vec::new();
    for row in rows.fetch_all(pool).await? {
        let status: String = row.get("status");
        records.push(AttendanceRecord {
            student_id: row.get("student_id"),
            subject: row.get("subject"),
            date: row.get("attended_on"),
            status: status
                .parse()
                .context("attendance row has an invalid status")?,
            remark: row.get("remark"),
        });
    }
    Ok(records)
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    kind: ImportKind,
) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut imported = 0usize;

    match kind {
        ImportKind::Students => {
            for row in import::read_students(file)? {
                upsert_student(
                    pool,
                    &row.first_name,
                    &row.last_name,
                    &row.email,
                    row.program.as_deref(),
                    row.year_level.as_deref(),
                    None,
                )
                .await?;
                imported += 1;
            }
        }
        ImportKind::Faculty => {
            for row in import::read_faculty(file)? {
                upsert_faculty(
                    pool,
                    &row.first_name,
                    &row.last_name,
                    &row.email,
                    row.department.as_deref(),
                    row.employment_type.as_deref(),
                    &row.category.to_string(),
                )
                .await?;
                imported += 1;
            }
        }
        ImportKind::Grades => {
            for row in import::read_grades(file)? {
                let student_id: i64 =
                    sqlx::query("SELECT id FROM campus.students WHERE email = $1")
                        .bind(&row.student_email)
                        .fetch_optional(pool)
                        .await?
                        .with_context(|| format!("no student with email {}", row.student_email))?
                        .get("id");
                let grade = GradeRecord {
                    student_id,
                    subject: row.subject,
                    prelim: row.prelim,
                    midterm: row.midterm,
                    final_grade: row.final_grade,
                    remark: row.remark,
                };
                upsert_grade(pool, student_id, &grade).await?;
                imported += 1;
            }
        }
    }

    tracing::info!(imported, path = %csv_path.display(), "csv import finished");
    Ok(imported)
}
