use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::StoreRecord;

/// A company social-responsibility activity. `status` is free text
/// ("Selesai", "Direncanakan", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrActivity {
    pub date: NaiveDate,
    pub company: String,
    pub activity_type: String,
    pub description: String,
    pub beneficiaries: u32,
    pub status: String,
    pub notes: String,
}

impl StoreRecord for CsrActivity {
    const FILE: &'static str = crate::config::CSR_LOG_FILE;
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "company",
        "activity_type",
        "description",
        "beneficiaries",
        "status",
        "notes",
    ];
}
