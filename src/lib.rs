//! Population breakdowns, derived grade and attendance status, and
//! identifier generation for the campus dashboards.

pub mod breakdown;
pub mod db;
pub mod ids;
pub mod import;
pub mod mock;
pub mod models;
pub mod ordering;
pub mod report;
pub mod source;
pub mod status;
