use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ReportStatus, Urgency};
use crate::store::StoreRecord;

/// A village-level health problem escalated by a health worker.
///
/// `id` is assigned at creation and is the only handle used for updates
/// and log joins; the row position in the file carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageReport {
    pub id: Uuid,
    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
    pub village: String,
    pub disease: String,
    pub case_count: u32,
    pub urgency: Urgency,
    pub narrative: String,
    pub status: ReportStatus,
    pub reported_by: String,
}

impl StoreRecord for VillageReport {
    const FILE: &'static str = crate::config::VILLAGE_REPORTS_FILE;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "village",
        "disease",
        "case_count",
        "urgency",
        "narrative",
        "status",
        "reported_by",
    ];
}

/// One authority action on a report. The government and company logs
/// share this layout; see `Authority::log_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    #[serde(with = "super::timestamp")]
    pub timestamp: NaiveDateTime,
    pub report_id: Uuid,
    pub feedback: String,
    pub new_status: ReportStatus,
    pub actor: String,
}

impl StoreRecord for ActionLogEntry {
    const FILE: &'static str = crate::config::GOVERNMENT_LOG_FILE;
    const COLUMNS: &'static [&'static str] =
        &["timestamp", "report_id", "feedback", "new_status", "actor"];
}
