//! CSV and JSON export of admin lists.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::company::Company;
use crate::error::ParseEnumError;
use crate::job::Job;
use crate::profile::Profile;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ParseEnumError::new("export format", s)),
        }
    }
}

/// Exportable lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportEntity {
    Users,
    Companies,
    Jobs,
    Applications,
}

impl ExportEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportEntity::Users => "users",
            ExportEntity::Companies => "companies",
            ExportEntity::Jobs => "jobs",
            ExportEntity::Applications => "applications",
        }
    }
}

impl fmt::Display for ExportEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportEntity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(ExportEntity::Users),
            "companies" => Ok(ExportEntity::Companies),
            "jobs" => Ok(ExportEntity::Jobs),
            "applications" => Ok(ExportEntity::Applications),
            other => Err(ParseEnumError::new("export entity", other)),
        }
    }
}

/// `<entity>_export_<YYYY-MM-DD>.<ext>`
pub fn export_filename(entity: ExportEntity, format: ExportFormat, date: NaiveDate) -> String {
    format!("{}_export_{}.{}", entity, date.format("%Y-%m-%d"), format.extension())
}

/// A row that can be written as a CSV line.
pub trait CsvRecord {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

/// Quote a field when it holds a comma, a double quote or a line break.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Header line plus one line per row.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> String {
    let mut out = csv_line(T::header());
    for row in rows {
        out.push_str(&csv_line(&row.fields()));
    }
    out
}

/// Pretty-printed JSON array.
pub fn to_json<T: Serialize>(rows: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

/// A rendered export ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Render `rows` in `format`.
pub fn render<T: CsvRecord + Serialize>(
    entity: ExportEntity,
    format: ExportFormat,
    rows: &[T],
    today: NaiveDate,
) -> Result<ExportFile, serde_json::Error> {
    let body = match format {
        ExportFormat::Csv => to_csv(rows),
        ExportFormat::Json => to_json(rows)?,
    };
    Ok(ExportFile {
        filename: export_filename(entity, format, today),
        content_type: format.content_type(),
        body,
    })
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

impl CsvRecord for Profile {
    fn header() -> &'static [&'static str] {
        &["id", "email", "full_name", "role", "active", "created_at"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt(&self.email),
            opt(&self.full_name),
            self.role.to_string(),
            self.active.to_string(),
            ts(&self.created_at),
        ]
    }
}

impl CsvRecord for Company {
    fn header() -> &'static [&'static str] {
        &["id", "name", "owner_id", "industry_id", "website", "verified", "created_at"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.owner_id.to_string(),
            opt(&self.industry_id),
            opt(&self.website),
            self.verified.to_string(),
            ts(&self.created_at),
        ]
    }
}

impl CsvRecord for Job {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "company_id",
            "title",
            "status",
            "employment_type",
            "experience_level",
            "salary_min",
            "salary_max",
            "salary_currency",
            "created_at",
            "published_at",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.company_id.to_string(),
            self.title.clone(),
            self.status.to_string(),
            self.employment_type.to_string(),
            self.experience_level.to_string(),
            opt(&self.salary_min),
            opt(&self.salary_max),
            self.salary_currency.clone(),
            ts(&self.created_at),
            self.published_at.as_ref().map(ts).unwrap_or_default(),
        ]
    }
}

impl CsvRecord for Application {
    fn header() -> &'static [&'static str] {
        &["id", "job_id", "applicant_id", "status", "created_at", "reviewed_at"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.job_id.to_string(),
            self.applicant_id.to_string(),
            self.status.to_string(),
            ts(&self.created_at),
            self.reviewed_at.as_ref().map(ts).unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;

    struct Row(&'static str, &'static str);

    impl CsvRecord for Row {
        fn header() -> &'static [&'static str] {
            &["name", "note"]
        }

        fn fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_has_header_plus_rows() {
        let rows = vec![Row("Acme, Inc.", "ok"), Row("Globex", "\"best\""), Row("Initech", "")];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(lines[0], "name,note");
        assert_eq!(lines[1], "\"Acme, Inc.\",ok");
        assert_eq!(lines[2], "Globex,\"\"\"best\"\"\"");
    }

    #[test]
    fn test_filename_and_mime() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            export_filename(ExportEntity::Jobs, ExportFormat::Csv, date),
            "jobs_export_2024-07-01.csv"
        );
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv; charset=utf-8");
    }

    #[test]
    fn test_render_json_is_pretty() {
        let profile = Profile::first_seen(UserId::from("u1"), Some("a@b.c".into()), Utc::now());
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let file = render(ExportEntity::Users, ExportFormat::Json, &[profile], date).unwrap();
        assert_eq!(file.filename, "users_export_2024-07-01.json");
        assert!(file.body.starts_with("[\n"));
        let parsed: serde_json::Value = serde_json::from_str(&file.body).unwrap();
        assert_eq!(parsed[0]["id"], "u1");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!("companies".parse::<ExportEntity>().unwrap(), ExportEntity::Companies);
    }
}
