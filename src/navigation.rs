//! Role-gated navigation and per-action authorization.
//!
//! Each role sees a fixed, ordered list of menus. Every protected action
//! belongs to one or more menus and is permitted only for roles whose list
//! contains one of them. Handlers call [`authorize`] themselves, so hiding a
//! menu in the client is never the only gate.

use serde::Serialize;

use crate::models::Role;

// ═══════════════════════════════════════════════════════════
// Menus
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    PublicDashboard,
    NakesDashboard,
    PatientData,
    VillageProblemReport,
    GovernmentDashboard,
    CompanyDashboard,
    CompanyCsr,
    AdminDashboard,
    ManageUsers,
    ActivityLog,
}

impl Menu {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PublicDashboard => "Dashboard Publik",
            Self::NakesDashboard => "Dashboard Nakes",
            Self::PatientData => "Data Pasien",
            Self::VillageProblemReport => "Laporan Masalah Desa",
            Self::GovernmentDashboard => "Dashboard Pemerintah",
            Self::CompanyDashboard => "Dashboard PT",
            Self::CompanyCsr => "CSR Perusahaan",
            Self::AdminDashboard => "Dashboard Admin",
            Self::ManageUsers => "Kelola Pengguna",
            Self::ActivityLog => "Log Aktivitas",
        }
    }
}

impl Serialize for Menu {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Menus visible to a role, in display order. `None` is an anonymous visitor.
pub fn menus_for(role: Option<Role>) -> &'static [Menu] {
    use Menu::*;
    match role {
        Some(Role::Developer) => &[
            NakesDashboard,
            GovernmentDashboard,
            CompanyDashboard,
            AdminDashboard,
        ],
        Some(Role::Admin) => &[AdminDashboard, ManageUsers, ActivityLog],
        Some(Role::Nakes) => &[NakesDashboard, PatientData, VillageProblemReport],
        Some(Role::Pt) => &[CompanyDashboard, CompanyCsr],
        Some(Role::Pemerintah) => &[GovernmentDashboard],
        Some(Role::Unknown) | None => &[PublicDashboard],
    }
}

// ═══════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════

/// Every state-reading or state-changing operation behind a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewPublicDiagnoses,
    ViewAllPatients,
    EditAnnouncement,
    UploadBanner,
    ListUsers,
    ViewActivityLog,
    RecordPatient,
    ListPatients,
    CreateVillageReport,
    ListVillageReports,
    ViewReportHistory,
    GovernmentTriage,
    CompanyTriage,
    ViewCompanyLog,
    ManageCsr,
}

impl Action {
    /// Menus that grant this action.
    pub fn menus(&self) -> &'static [Menu] {
        use Menu::*;
        match self {
            Self::ViewPublicDiagnoses
            | Self::ViewAllPatients
            | Self::EditAnnouncement
            | Self::UploadBanner => &[AdminDashboard],
            Self::ListUsers => &[ManageUsers],
            Self::ViewActivityLog => &[ActivityLog],
            Self::RecordPatient | Self::ListPatients => &[PatientData],
            Self::CreateVillageReport | Self::ListVillageReports => &[VillageProblemReport],
            Self::ViewReportHistory => &[
                VillageProblemReport,
                GovernmentDashboard,
                CompanyDashboard,
            ],
            Self::GovernmentTriage => &[GovernmentDashboard],
            Self::CompanyTriage | Self::ViewCompanyLog => &[CompanyDashboard],
            Self::ManageCsr => &[CompanyCsr],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Role {role} may not perform {action:?}")]
pub struct Forbidden {
    pub role: Role,
    pub action: Action,
}

/// Permit `action` iff one of its menus is visible to `role`.
pub fn authorize(role: Role, action: Action) -> Result<(), Forbidden> {
    let visible = menus_for(Some(role));
    if action.menus().iter().any(|m| visible.contains(m)) {
        Ok(())
    } else {
        Err(Forbidden { role, action })
    }
}
