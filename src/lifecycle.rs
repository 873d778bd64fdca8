//! Village report workflow.
//!
//! A report starts at "Menunggu Pemerintah". The government may set any
//! status from its menu at any time. The company only acts on reports
//! currently forwarded to it. Every action appends one row to the acting
//! authority's log, then rewrites the report's status by id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActionLogEntry, Authority, ReportStatus, Urgency, VillageReport};
use crate::store::{CsvStore, StoreError, StoreRecord};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),
    #[error("{authority} cannot set status '{status}'")]
    StatusNotAllowed { authority: Authority, status: String },
    #[error("Report {id} is '{status}', not forwarded to the company")]
    NotForwarded { id: Uuid, status: ReportStatus },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Health-worker input for a new report.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub village: String,
    pub disease: String,
    #[serde(default)]
    pub case_count: u32,
    pub urgency: Urgency,
    #[serde(default)]
    pub narrative: String,
}

/// An authority's decision on one report.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub feedback: String,
    pub status: ReportStatus,
}

/// Both action logs, filtered to one report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportHistory {
    pub government: Vec<ActionLogEntry>,
    pub company: Vec<ActionLogEntry>,
}

/// Create the report file and both log files if absent.
pub fn ensure_files(store: &CsvStore) -> Result<(), StoreError> {
    store.ensure_records::<VillageReport>()?;
    for authority in Authority::ALL {
        store.ensure(authority.log_file(), ActionLogEntry::COLUMNS)?;
    }
    Ok(())
}

pub fn create_report(
    store: &CsvStore,
    input: NewReport,
    reported_by: &str,
) -> Result<VillageReport, LifecycleError> {
    let village = required("village", &input.village)?;
    let disease = required("disease", &input.disease)?;

    let report = VillageReport {
        id: Uuid::new_v4(),
        created_at: crate::models::timestamp::now(),
        village,
        disease,
        case_count: input.case_count,
        urgency: input.urgency,
        narrative: input.narrative.trim().to_string(),
        status: ReportStatus::AwaitingGovernment,
        reported_by: reported_by.to_string(),
    };
    store.append_record(&report)?;

    tracing::info!(
        report_id = %report.id,
        village = %report.village,
        urgency = %report.urgency,
        "Village report created"
    );
    Ok(report)
}

/// All reports in creation order.
pub fn list_reports(store: &CsvStore) -> Result<Vec<VillageReport>, LifecycleError> {
    Ok(store.read_records()?)
}

pub fn get_report(store: &CsvStore, id: Uuid) -> Result<VillageReport, LifecycleError> {
    list_reports(store)?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or(LifecycleError::ReportNotFound(id))
}

/// Reports the company may act on.
pub fn company_queue(store: &CsvStore) -> Result<Vec<VillageReport>, LifecycleError> {
    Ok(list_reports(store)?
        .into_iter()
        .filter(|r| r.status == ReportStatus::ForwardedToCompany)
        .collect())
}

/// Government action. The prior status is not checked.
pub fn government_action(
    store: &CsvStore,
    id: Uuid,
    action: ActionRequest,
    actor: &str,
) -> Result<VillageReport, LifecycleError> {
    apply_action(store, Authority::Government, id, action, actor)
}

/// Company action. Rejected unless the report is currently forwarded.
pub fn company_action(
    store: &CsvStore,
    id: Uuid,
    action: ActionRequest,
    actor: &str,
) -> Result<VillageReport, LifecycleError> {
    apply_action(store, Authority::Company, id, action, actor)
}

fn apply_action(
    store: &CsvStore,
    authority: Authority,
    id: Uuid,
    action: ActionRequest,
    actor: &str,
) -> Result<VillageReport, LifecycleError> {
    if !authority.allowed_statuses().contains(&action.status) {
        return Err(LifecycleError::StatusNotAllowed {
            authority,
            status: action.status.to_string(),
        });
    }

    // Status check, log append and status rewrite commit as one unit.
    let report = store.transaction(|store| {
        let report = get_report(store, id)?;
        if authority == Authority::Company && report.status != ReportStatus::ForwardedToCompany {
            return Err(LifecycleError::NotForwarded {
                id,
                status: report.status,
            });
        }

        let entry = ActionLogEntry {
            timestamp: crate::models::timestamp::now(),
            report_id: id,
            feedback: action.feedback.trim().to_string(),
            new_status: action.status.clone(),
            actor: actor.to_string(),
        };
        store.append_record_in(authority.log_file(), &entry)?;
        store.update_field_where(
            VillageReport::FILE,
            "id",
            &id.to_string(),
            "status",
            action.status.as_str(),
        )?;
        Ok(report)
    })?;

    tracing::info!(
        report_id = %id,
        authority = %authority,
        from = %report.status,
        to = %action.status,
        "Report status changed"
    );
    Ok(VillageReport {
        status: action.status,
        ..report
    })
}

/// Government and company log rows for one report, oldest first.
pub fn history(store: &CsvStore, id: Uuid) -> Result<ReportHistory, LifecycleError> {
    let for_report = |authority: Authority| -> Result<Vec<ActionLogEntry>, StoreError> {
        Ok(store
            .read_records_in::<ActionLogEntry>(authority.log_file())?
            .into_iter()
            .filter(|e| e.report_id == id)
            .collect())
    };
    Ok(ReportHistory {
        government: for_report(Authority::Government)?,
        company: for_report(Authority::Company)?,
    })
}

/// The complete company log.
pub fn company_log(store: &CsvStore) -> Result<Vec<ActionLogEntry>, LifecycleError> {
    Ok(store.read_records_in(Authority::Company.log_file())?)
}

fn required(field: &'static str, value: &str) -> Result<String, LifecycleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (CsvStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        ensure_files(&store).unwrap();
        (store, dir)
    }

    fn desa_a() -> NewReport {
        NewReport {
            village: "Desa A".into(),
            disease: "Diare".into(),
            case_count: 5,
            urgency: Urgency::High,
            narrative: "Banyak warga diare setelah banjir".into(),
        }
    }

    fn action(feedback: &str, status: ReportStatus) -> ActionRequest {
        ActionRequest {
            feedback: feedback.into(),
            status,
        }
    }

    #[test]
    fn new_report_awaits_government_with_empty_history() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "nakes1").unwrap();

        assert_eq!(report.status, ReportStatus::AwaitingGovernment);
        assert_eq!(report.reported_by, "nakes1");
        let history = history(&store, report.id).unwrap();
        assert!(history.government.is_empty());
        assert!(history.company.is_empty());
    }

    #[test]
    fn create_requires_village_and_disease() {
        let (store, _dir) = test_store();
        let mut input = desa_a();
        input.village = "  ".into();
        assert!(matches!(
            create_report(&store, input, "n"),
            Err(LifecycleError::MissingField("village"))
        ));

        let mut input = desa_a();
        input.disease = String::new();
        assert!(matches!(
            create_report(&store, input, "n"),
            Err(LifecycleError::MissingField("disease"))
        ));
        assert!(list_reports(&store).unwrap().is_empty());
    }

    #[test]
    fn end_to_end_government_then_company() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "nakes1").unwrap();
        assert!(company_queue(&store).unwrap().is_empty());

        let updated = government_action(
            &store,
            report.id,
            action("diproses", ReportStatus::ForwardedToCompany),
            "pemda",
        )
        .unwrap();
        assert_eq!(updated.status, ReportStatus::ForwardedToCompany);

        let history_after_gov = history(&store, report.id).unwrap();
        assert_eq!(history_after_gov.government.len(), 1);
        assert_eq!(history_after_gov.government[0].feedback, "diproses");
        assert_eq!(
            get_report(&store, report.id).unwrap().status,
            ReportStatus::ForwardedToCompany
        );

        let queue = company_queue(&store).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, report.id);

        company_action(
            &store,
            report.id,
            action("ditangani", ReportStatus::Done),
            "pt_abc",
        )
        .unwrap();

        let final_history = history(&store, report.id).unwrap();
        assert_eq!(final_history.company.len(), 1);
        assert_eq!(final_history.company[0].feedback, "ditangani");
        assert_eq!(final_history.company[0].actor, "pt_abc");
        assert_eq!(
            get_report(&store, report.id).unwrap().status,
            ReportStatus::Done
        );
        assert!(company_queue(&store).unwrap().is_empty());
        assert_eq!(company_log(&store).unwrap().len(), 1);
    }

    #[test]
    fn government_may_jump_straight_to_done() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "n").unwrap();
        let updated =
            government_action(&store, report.id, action("", ReportStatus::Done), "g").unwrap();
        assert_eq!(updated.status, ReportStatus::Done);

        // and back again, still permitted
        let updated = government_action(
            &store,
            report.id,
            action("dibuka lagi", ReportStatus::GovernmentProcessing),
            "g",
        )
        .unwrap();
        assert_eq!(updated.status, ReportStatus::GovernmentProcessing);
        assert_eq!(history(&store, report.id).unwrap().government.len(), 2);
    }

    #[test]
    fn government_action_touches_only_target_report() {
        let (store, _dir) = test_store();
        let first = create_report(&store, desa_a(), "n").unwrap();
        let second = create_report(&store, desa_a(), "n").unwrap();

        government_action(
            &store,
            second.id,
            action("cek", ReportStatus::GovernmentProcessing),
            "g",
        )
        .unwrap();

        let reports = list_reports(&store).unwrap();
        assert_eq!(reports[0], first);
        assert_eq!(reports[1].status, ReportStatus::GovernmentProcessing);
        assert!(history(&store, first.id).unwrap().government.is_empty());
    }

    #[test]
    fn company_rejected_unless_forwarded() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "n").unwrap();

        let err = company_action(&store, report.id, action("x", ReportStatus::Done), "pt")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotForwarded { .. }));
        assert!(company_log(&store).unwrap().is_empty());
        assert_eq!(
            get_report(&store, report.id).unwrap().status,
            ReportStatus::AwaitingGovernment
        );
    }

    #[test]
    fn status_outside_role_menu_rejected() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "n").unwrap();

        let err = government_action(
            &store,
            report.id,
            action("", ReportStatus::CompanyProcessing),
            "g",
        )
        .unwrap_err();
        assert!(matches!(err, LifecycleError::StatusNotAllowed { .. }));

        government_action(
            &store,
            report.id,
            action("", ReportStatus::ForwardedToCompany),
            "g",
        )
        .unwrap();
        let err = company_action(
            &store,
            report.id,
            action("", ReportStatus::ForwardedToCompany),
            "pt",
        )
        .unwrap_err();
        assert!(matches!(err, LifecycleError::StatusNotAllowed { .. }));
        assert!(history(&store, report.id).unwrap().company.is_empty());
    }

    #[test]
    fn concurrent_company_actions_on_one_report_commit_once() {
        let (store, _dir) = test_store();
        let report = create_report(&store, desa_a(), "n").unwrap();
        government_action(
            &store,
            report.id,
            action("teruskan", ReportStatus::ForwardedToCompany),
            "g",
        )
        .unwrap();

        let results: Vec<Result<VillageReport, LifecycleError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let store = &store;
                    scope.spawn(move || {
                        company_action(
                            store,
                            report.id,
                            action("ditangani", ReportStatus::Done),
                            &format!("pt{t}"),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, LifecycleError::NotForwarded { status: ReportStatus::Done, .. })));
        assert_eq!(company_log(&store).unwrap().len(), 1);
        assert_eq!(
            get_report(&store, report.id).unwrap().status,
            ReportStatus::Done
        );
    }

    #[test]
    fn unknown_report_writes_nothing() {
        let (store, _dir) = test_store();
        let missing = Uuid::new_v4();
        let err = government_action(&store, missing, action("x", ReportStatus::Done), "g")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::ReportNotFound(id) if id == missing));
        let gov: Vec<ActionLogEntry> = store
            .read_records_in(Authority::Government.log_file())
            .unwrap();
        assert!(gov.is_empty());
    }
}
