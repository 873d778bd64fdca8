//! Dashboard aggregates and table exports (CSV or XLSX).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};

use crate::config::TOP_N;
use crate::models::{AgeGroup, PatientRecord, PublicDiagnosis};
use crate::store::{self, CsvStore, StoreError, StoreRecord};

#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error("Invalid filter {field}: {value}")]
    InvalidFilter { field: &'static str, value: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

// ═══════════════════════════════════════════════════════════
// Public dashboard
// ═══════════════════════════════════════════════════════════

/// Raw query parameters. Blank year or month means "current".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub age_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilter {
    pub year: i32,
    pub month: u32,
    pub age_group: Option<AgeGroup>,
}

impl DashboardQuery {
    pub fn resolve(&self, today: NaiveDate) -> Result<DashboardFilter, ReportingError> {
        let invalid = |field, value: &str| ReportingError::InvalidFilter {
            field,
            value: value.to_string(),
        };

        let year = match self.year.trim() {
            "" => today.year(),
            raw => raw.parse().map_err(|_| invalid("year", raw))?,
        };
        let month = match self.month.trim() {
            "" => today.month(),
            raw => raw
                .parse()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| invalid("month", raw))?,
        };
        let age_group = match self.age_group.trim() {
            "" => None,
            raw => Some(raw.parse().map_err(|_| invalid("age_group", raw))?),
        };
        Ok(DashboardFilter {
            year,
            month,
            age_group,
        })
    }
}

impl DashboardFilter {
    fn matches(&self, at: &NaiveDateTime, age_group: Option<AgeGroup>) -> bool {
        at.year() == self.year
            && at.month() == self.month
            && self.age_group.map_or(true, |wanted| age_group == Some(wanted))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseCount {
    pub diagnosis: String,
    pub cases: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicDashboard {
    pub today: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub age_group: Option<AgeGroup>,
    /// Years present in either data set, for the year selector.
    pub available_years: Vec<i32>,
    /// Modification time of the patient-record file.
    #[serde(with = "optional_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
    pub top_from_health_workers: Vec<DiseaseCount>,
    pub top_from_public: Vec<DiseaseCount>,
}

/// Most frequent labels, highest count first, ties by label.
pub fn top_diagnoses<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<DiseaseCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut ranked: Vec<DiseaseCount> = counts
        .into_iter()
        .map(|(diagnosis, cases)| DiseaseCount {
            diagnosis: diagnosis.to_string(),
            cases,
        })
        .collect();
    ranked.sort_by(|a, b| b.cases.cmp(&a.cases).then_with(|| a.diagnosis.cmp(&b.diagnosis)));
    ranked.truncate(TOP_N);
    ranked
}

pub fn public_dashboard(
    store: &CsvStore,
    query: &DashboardQuery,
    today: NaiveDate,
) -> Result<PublicDashboard, ReportingError> {
    let filter = query.resolve(today)?;
    let patients: Vec<PatientRecord> = store.read_records()?;
    let public: Vec<PublicDiagnosis> = store.read_records()?;

    let available_years: BTreeSet<i32> = patients
        .iter()
        .map(|p| p.recorded_at.year())
        .chain(public.iter().map(|p| p.submitted_at.year()))
        .collect();

    let top_from_health_workers = top_diagnoses(
        patients
            .iter()
            .filter(|p| filter.matches(&p.recorded_at, p.age_group))
            .map(|p| p.diagnosis.as_str()),
    );
    let top_from_public = top_diagnoses(
        public
            .iter()
            .filter(|p| filter.matches(&p.submitted_at, p.age_group))
            .map(|p| p.diagnosis.as_str()),
    );

    let last_updated = store.modified(PatientRecord::FILE).map(|t| {
        let local = DateTime::<Local>::from(t).naive_local();
        local.with_nanosecond(0).unwrap_or(local)
    });

    Ok(PublicDashboard {
        today,
        year: filter.year,
        month: filter.month,
        age_group: filter.age_group,
        available_years: available_years.into_iter().collect(),
        last_updated,
        top_from_health_workers,
        top_from_public,
    })
}

mod optional_timestamp {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => crate::models::timestamp::serialize(at, serializer),
            None => serializer.serialize_none(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tables and exports
// ═══════════════════════════════════════════════════════════

/// A full listing with its row count, as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub total: usize,
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(rows: Vec<T>) -> Self {
        Self {
            total: rows.len(),
            rows,
        }
    }
}

/// Download format, chosen with `?format=`. CSV unless asked otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// A download: suggested file name, format and body.
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub format: ExportFormat,
    pub body: Vec<u8>,
}

/// Serialize `rows` for download as `<stem>.<ext>`.
pub fn export<T: StoreRecord>(
    stem: &str,
    format: ExportFormat,
    rows: &[T],
) -> Result<Export, ReportingError> {
    let body = match format {
        ExportFormat::Csv => store::records_to_csv(rows)?,
        ExportFormat::Xlsx => records_to_xlsx(rows)?,
    };
    Ok(Export {
        filename: format!("{stem}.{}", format.extension()),
        format,
        body,
    })
}

/// One worksheet: bold header row, then every field as text.
fn records_to_xlsx<T: StoreRecord>(rows: &[T]) -> Result<Vec<u8>, ReportingError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in (0u16..).zip(T::COLUMNS.iter()) {
        sheet.write_string_with_format(0, col, *name, &header)?;
    }
    for (row, record) in (1u32..).zip(rows.iter()) {
        for (col, value) in (0u16..).zip(store::record_to_row(record)?) {
            sheet.write_string(row, col, value)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}
