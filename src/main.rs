use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use campus_report::ids::{self, Role};
use campus_report::import::ImportKind;
use campus_report::models::{display_name, EmploymentCategory, GradeRecord, Student};
use campus_report::source::{DataSource, SourceKind};
use campus_report::{db, ordering, report, status};

#[derive(Parser)]
#[command(name = "campus-report")]
#[command(about = "Population, grade and attendance reporting for the campus dashboards", long_about = None)]
struct Cli {
    /// Where campus records are read from
    #[arg(long, value_enum, default_value_t = SourceKind::Mock, global = true)]
    source: SourceKind,
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Population {
    Students,
    Faculty,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the mock dataset into Postgres
    Seed,
    /// Import students, faculty or grades from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: ImportKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Population breakdown by program/year or department/employment type
    Population {
        #[arg(long, value_enum, default_value_t = Population::Students)]
        of: Population,
        #[arg(long)]
        json: bool,
    },
    /// Grades with derived status for one student
    Grades {
        /// Public student id, e.g. 101
        #[arg(long)]
        student: String,
        #[arg(long)]
        json: bool,
    },
    /// Per-subject attendance rates for one student
    Attendance {
        #[arg(long)]
        student: String,
        #[arg(long)]
        json: bool,
    },
    /// Public id and username for a storage id
    Ids {
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        storage_id: i64,
        #[arg(long, value_enum)]
        role: Role,
        #[arg(long, value_enum, default_value_t = EmploymentCategory::Teaching)]
        category: EmploymentCategory,
    },
    /// Next free section code for a program and year level
    SectionCode {
        #[arg(long)]
        program: String,
        #[arg(long)]
        year: String,
    },
    /// Generate a markdown campus report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
}

async fn find_student(source: &DataSource, public_id: &str) -> anyhow::Result<Student> {
    let storage_id = ids::student_storage_id(public_id)
        .with_context(|| format!("'{public_id}' is not a student id"))?;
    source
        .students()
        .await?
        .into_iter()
        .find(|s| s.id == storage_id)
        .with_context(|| format!("no student with id {public_id}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = DataSource::connect(cli.source, cli.database_url.as_deref()).await?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(source.pool()?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(source.pool()?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv } => {
            let imported = db::import_csv(source.pool()?, &csv, kind).await?;
            println!("Imported {imported} rows from {}.", csv.display());
        }
        Commands::Population { of, json } => {
            let (table, lookups) = match of {
                Population::Students => {
                    let programs = source.programs().await?;
                    let students = source.students().await?;
                    (report::sorted_student_population(&students, &programs), programs)
                }
                Population::Faculty => {
                    let departments = source.departments().await?;
                    let faculty = source.faculty().await?;
                    (report::sorted_faculty_population(&faculty, &departments), departments)
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                let mut output = String::new();
                report::render_breakdown(&mut output, &table, |key| display_name(&lookups, key));
                print!("{output}");
            }
        }
        Commands::Grades { student, json } => {
            let student = find_student(&source, &student).await?;
            let mut grades: Vec<GradeRecord> = source.grades(Some(student.id)).await?;
            ordering::sort_grades(&mut grades);

            if json {
                let rows: Vec<serde_json::Value> = grades
                    .iter()
                    .map(|g| {
                        serde_json::json!({
                            "subject": g.subject,
                            "prelim": g.prelim,
                            "midterm": g.midterm,
                            "final": g.final_grade,
                            "remark": g.remark,
                            "status": g.status(),
                            "verdict": g.verdict(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            println!("Grades for {} ({}):", student.full_name(), ids::student_id(student.id));
            if grades.is_empty() {
                println!("No grades recorded.");
            }
            for grade in &grades {
                println!(
                    "- {}: {} / {} / {} [{}{}]{}",
                    grade.subject,
                    format_score(grade.prelim),
                    format_score(grade.midterm),
                    format_score(grade.final_grade),
                    grade.status(),
                    grade
                        .verdict()
                        .map(|v| format!(", {v}"))
                        .unwrap_or_default(),
                    grade
                        .remark
                        .as_deref()
                        .map(|r| format!(" {r}"))
                        .unwrap_or_default(),
                );
            }
        }
        Commands::Attendance { student, json } => {
            let student = find_student(&source, &student).await?;
            let records = source.attendance(Some(student.id)).await?;
            let summaries = status::summarize_attendance(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }

            println!(
                "Attendance for {} ({}):",
                student.full_name(),
                ids::student_id(student.id)
            );
            if summaries.is_empty() {
                println!("Overall: {}", status::format_rate(None));
            }
            for summary in &summaries {
                println!(
                    "- {}: {} ({} present, {} late, {} excused, {} absent)",
                    summary.subject,
                    status::format_rate(Some(summary.rate)),
                    summary.present,
                    summary.late,
                    summary.excused,
                    summary.absent
                );
            }
        }
        Commands::Ids {
            storage_id,
            role,
            category,
        } => {
            let (public_id, username) = match role {
                Role::Student => (ids::student_id(storage_id), ids::student_username(storage_id)),
                Role::Teacher => (
                    ids::teacher_id(storage_id),
                    ids::teacher_username(storage_id, category),
                ),
                Role::Admin => (ids::teacher_id(storage_id), ids::admin_username(storage_id)),
            };
            let dashboard = ids::role_for_username(&username)
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!("id {public_id}, username {username}, dashboard {dashboard}");
        }
        Commands::SectionCode { program, year } => {
            let sections = source.sections().await?;
            println!("{}", ids::next_section_code(&sections, &program, &year));
        }
        Commands::Report { out } => {
            let snapshot = report::CampusSnapshot {
                students: source.students().await?,
                faculty: source.faculty().await?,
                programs: source.programs().await?,
                departments: source.departments().await?,
                grades: source.grades(None).await?,
                attendance: source.attendance(None).await?,
            };
            let report = report::build_report(chrono::Local::now().date_naive(), &snapshot);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
