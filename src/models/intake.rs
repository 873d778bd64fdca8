use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{AgeGroup, Sex};
use crate::store::StoreRecord;

/// A self-reported complaint from the public form, with the keyword-derived label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDiagnosis {
    pub name: String,
    pub national_id: String,
    pub age_group: Option<AgeGroup>,
    pub sex: Sex,
    pub address: String,
    pub complaint: String,
    pub diagnosis: String,
    #[serde(with = "super::timestamp")]
    pub submitted_at: NaiveDateTime,
}

impl StoreRecord for PublicDiagnosis {
    const FILE: &'static str = crate::config::PUBLIC_DIAGNOSES_FILE;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "national_id",
        "age_group",
        "sex",
        "address",
        "complaint",
        "diagnosis",
        "submitted_at",
    ];
}

/// A patient visit logged by a health worker. `diagnosis` is free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub national_id: String,
    pub age_group: Option<AgeGroup>,
    pub sex: Sex,
    pub address: String,
    pub complaint: String,
    pub diagnosis: String,
    #[serde(with = "super::timestamp")]
    pub recorded_at: NaiveDateTime,
    pub recorded_by: String,
}

impl StoreRecord for PatientRecord {
    const FILE: &'static str = crate::config::PATIENT_RECORDS_FILE;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "national_id",
        "age_group",
        "sex",
        "address",
        "complaint",
        "diagnosis",
        "recorded_at",
        "recorded_by",
    ];
}

/// Visitor comment on the public dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub text: String,
    #[serde(with = "super::timestamp")]
    pub posted_at: NaiveDateTime,
}

impl StoreRecord for Comment {
    const FILE: &'static str = crate::config::COMMENTS_FILE;
    const COLUMNS: &'static [&'static str] = &["name", "text", "posted_at"];
}
