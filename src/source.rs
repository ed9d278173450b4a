use anyhow::Context;
use clap::ValueEnum;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::db;
use crate::mock;
use crate::models::{
    dedup_by_id, AttendanceRecord, Department, Faculty, GradeRecord, Program, Section, Student,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Mock,
    Postgres,
}

/// Where entity lists come from. Both variants hand back deduplicated lists.
pub enum DataSource {
    Mock,
    Postgres(PgPool),
}

impl DataSource {
    pub async fn connect(kind: SourceKind, database_url: Option<&str>) -> anyhow::Result<Self> {
        match kind {
            SourceKind::Mock => Ok(Self::Mock),
            SourceKind::Postgres => {
                let url = database_url
                    .context("DATABASE_URL must be set when --source postgres is used")?;
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(url)
                    .await
                    .context("failed to connect to Postgres")?;
                Ok(Self::Postgres(pool))
            }
        }
    }

    pub fn pool(&self) -> anyhow::Result<&PgPool> {
        match self {
            Self::Postgres(pool) => Ok(pool),
            Self::Mock => anyhow::bail!("this command needs --source postgres"),
        }
    }

    pub async fn students(&self) -> anyhow::Result<Vec<Student>> {
        let raw = match self {
            Self::Mock => mock::students(),
            Self::Postgres(pool) => db::fetch_students(pool).await?,
        };
        let students = dedup_by_id(raw);
        tracing::debug!(count = students.len(), "loaded students");
        Ok(students)
    }

    pub async fn faculty(&self) -> anyhow::Result<Vec<Faculty>> {
        let raw = match self {
            Self::Mock => mock::faculty(),
            Self::Postgres(pool) => db::fetch_faculty(pool).await?,
        };
        let faculty = dedup_by_id(raw);
        tracing::debug!(count = faculty.len(), "loaded faculty");
        Ok(faculty)
    }

    pub async fn programs(&self) -> anyhow::Result<Vec<Program>> {
        match self {
            Self::Mock => Ok(mock::programs()),
            Self::Postgres(pool) => db::fetch_lookups(pool, "programs").await,
        }
    }

    pub async fn departments(&self) -> anyhow::Result<Vec<Department>> {
        match self {
            Self::Mock => Ok(mock::departments()),
            Self::Postgres(pool) => db::fetch_lookups(pool, "departments").await,
        }
    }

    pub async fn sections(&self) -> anyhow::Result<Vec<Section>> {
        match self {
            Self::Mock => Ok(mock::sections()),
            Self::Postgres(pool) => db::fetch_sections(pool).await,
        }
    }

    pub async fn grades(&self, student_id: Option<i64>) -> anyhow::Result<Vec<GradeRecord>> {
        let grades = match self {
            Self::Mock => mock::grades()
                .into_iter()
                .filter(|g| student_id.map_or(true, |id| g.student_id == id))
                .collect(),
            Self::Postgres(pool) => db::fetch_grades(pool, student_id).await?,
        };
        tracing::debug!(count = grades.len(), ?student_id, "loaded grades");
        Ok(grades)
    }

    pub async fn attendance(
        &self,
        student_id: Option<i64>,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let records = match self {
            Self::Mock => mock::attendance()
                .into_iter()
                .filter(|r| student_id.map_or(true, |id| r.student_id == id))
                .collect(),
            Self::Postgres(pool) => db::fetch_attendance(pool, student_id).await?,
        };
        tracing::debug!(count = records.len(), ?student_id, "loaded attendance");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_deduplicates_students() {
        let source = DataSource::connect(SourceKind::Mock, None).await.unwrap();
        let students = source.students().await.unwrap();
        assert_eq!(students.len(), 8);
    }

    #[tokio::test]
    async fn mock_source_filters_by_student() {
        let source = DataSource::Mock;
        let grades = source.grades(Some(1)).await.unwrap();
        assert_eq!(grades.len(), 3);
        assert!(grades.iter().all(|g| g.student_id == 1));
        assert_eq!(source.attendance(None).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn postgres_without_url_is_an_error() {
        let err = DataSource::connect(SourceKind::Postgres, None)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
        assert!(DataSource::Mock.pool().is_err());
    }
}
