//! CSR tracker: company social-responsibility activities with filtering,
//! summary cards, progress against an annual target and a monthly trend.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::CSR_ANNUAL_TARGET;
use crate::models::CsrActivity;
use crate::store::{CsvStore, StoreError, StoreRecord};

#[derive(Debug, thiserror::Error)]
pub enum CsrError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn sample_activities() -> Vec<CsrActivity> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        CsrActivity {
            date: date(2025, 10, 1),
            company: "PT ABC".into(),
            activity_type: "Kesehatan".into(),
            description: "Bakti kesehatan & pengobatan gratis".into(),
            beneficiaries: 120,
            status: "Selesai".into(),
            notes: "Kerjasama puskesmas setempat".into(),
        },
        CsrActivity {
            date: date(2025, 10, 15),
            company: "PT XYZ".into(),
            activity_type: "Lingkungan".into(),
            description: "Penanaman 300 bibit pohon".into(),
            beneficiaries: 0,
            status: "Selesai".into(),
            notes: "Masyarakat dilibatkan".into(),
        },
        CsrActivity {
            date: date(2025, 11, 5),
            company: "PT DEF".into(),
            activity_type: "Pendidikan".into(),
            description: "Donasi alat tulis & beasiswa kecil".into(),
            beneficiaries: 45,
            status: "Direncanakan".into(),
            notes: "Jadwal belum final".into(),
        },
    ]
}

/// Write the sample activities when the log does not exist yet.
/// Returns `true` if seeding happened.
pub fn seed_if_missing(store: &CsvStore) -> Result<bool, CsrError> {
    if store
        .path(CsrActivity::FILE)
        .try_exists()
        .map_err(StoreError::from)?
    {
        return Ok(false);
    }
    store.ensure_records::<CsrActivity>()?;
    for activity in sample_activities() {
        store.append_record(&activity)?;
    }
    tracing::info!("Seeded CSR log with sample activities");
    Ok(true)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Defaults to the submitting user's display name.
    #[serde(default)]
    pub company: String,
    pub activity_type: String,
    pub description: String,
    #[serde(default)]
    pub beneficiaries: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

pub fn add_activity(
    store: &CsvStore,
    input: NewActivity,
    company_fallback: &str,
) -> Result<CsrActivity, CsrError> {
    let company = match input.company.trim() {
        "" => company_fallback.trim(),
        given => given,
    };
    if company.is_empty() {
        return Err(CsrError::MissingField("company"));
    }
    let activity_type = input.activity_type.trim();
    if activity_type.is_empty() {
        return Err(CsrError::MissingField("activity_type"));
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(CsrError::MissingField("description"));
    }
    let status = match input.status.trim() {
        "" => "Direncanakan",
        given => given,
    };

    let activity = CsrActivity {
        date: input
            .date
            .unwrap_or_else(|| crate::models::timestamp::now().date()),
        company: company.to_string(),
        activity_type: activity_type.to_string(),
        description: description.to_string(),
        beneficiaries: input.beneficiaries,
        status: status.to_string(),
        notes: input.notes.trim().to_string(),
    };
    store.append_record(&activity)?;
    tracing::info!(company = %activity.company, "CSR activity added");
    Ok(activity)
}

pub fn list_activities(store: &CsvStore) -> Result<Vec<CsrActivity>, CsrError> {
    Ok(store.read_records()?)
}

// ═══════════════════════════════════════════════════════════
// Filtering and aggregates
// ═══════════════════════════════════════════════════════════

/// `None` fields select everything.
#[derive(Debug, Clone, Default)]
pub struct CsrFilter {
    pub companies: Option<Vec<String>>,
    pub activity_types: Option<Vec<String>>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CsrFilter {
    fn matches(&self, activity: &CsrActivity) -> bool {
        let in_list = |list: &Option<Vec<String>>, value: &str| {
            list.as_ref().map_or(true, |l| l.iter().any(|v| v == value))
        };
        in_list(&self.companies, &activity.company)
            && in_list(&self.activity_types, &activity.activity_type)
            && self.from.map_or(true, |from| activity.date >= from)
            && self.to.map_or(true, |to| activity.date <= to)
    }
}

/// Values available to the filter controls, from the unfiltered log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub companies: Vec<String>,
    pub activity_types: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsrSummary {
    pub total_activities: usize,
    pub most_active_company: Option<String>,
    pub total_beneficiaries: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyProgress {
    pub company: String,
    pub done: u32,
    pub target: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub company: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CsrView {
    pub options: FilterOptions,
    pub activities: Vec<CsrActivity>,
    pub summary: CsrSummary,
    pub progress: Vec<CompanyProgress>,
    pub monthly_trend: Vec<MonthlyCount>,
}

pub fn filter_options(activities: &[CsrActivity]) -> FilterOptions {
    let companies: BTreeSet<&str> = activities.iter().map(|a| a.company.as_str()).collect();
    let types: BTreeSet<&str> = activities
        .iter()
        .map(|a| a.activity_type.as_str())
        .collect();
    FilterOptions {
        companies: companies.into_iter().map(str::to_string).collect(),
        activity_types: types.into_iter().map(str::to_string).collect(),
        first_date: activities.iter().map(|a| a.date).min(),
        last_date: activities.iter().map(|a| a.date).max(),
    }
}

pub fn apply_filter(activities: Vec<CsrActivity>, filter: &CsrFilter) -> Vec<CsrActivity> {
    activities.into_iter().filter(|a| filter.matches(a)).collect()
}

fn counts_by_company(activities: &[CsrActivity]) -> BTreeMap<&str, u32> {
    let mut counts = BTreeMap::new();
    for activity in activities {
        *counts.entry(activity.company.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Ties for the most active company go to the alphabetically first name.
pub fn summarize(activities: &[CsrActivity]) -> CsrSummary {
    let most_active_company = counts_by_company(activities)
        .into_iter()
        .fold(None::<(&str, u32)>, |best, (company, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((company, count)),
        })
        .map(|(company, _)| company.to_string());

    CsrSummary {
        total_activities: activities.len(),
        most_active_company,
        total_beneficiaries: activities.iter().map(|a| u64::from(a.beneficiaries)).sum(),
    }
}

/// Activity count per company against the annual target, capped at 100%.
pub fn progress(activities: &[CsrActivity]) -> Vec<CompanyProgress> {
    counts_by_company(activities)
        .into_iter()
        .map(|(company, done)| CompanyProgress {
            company: company.to_string(),
            done,
            target: CSR_ANNUAL_TARGET,
            percent: (done * 100 / CSR_ANNUAL_TARGET).min(100),
        })
        .collect()
}

/// Activities per `YYYY-MM` per company, ordered by month then company.
pub fn monthly_trend(activities: &[CsrActivity]) -> Vec<MonthlyCount> {
    let mut counts: BTreeMap<(String, &str), u32> = BTreeMap::new();
    for activity in activities {
        let month = activity.date.format("%Y-%m").to_string();
        *counts.entry((month, activity.company.as_str())).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((month, company), count)| MonthlyCount {
            month,
            company: company.to_string(),
            count,
        })
        .collect()
}

/// Everything the CSR page shows for one filter selection.
pub fn view(store: &CsvStore, filter: &CsrFilter) -> Result<CsrView, CsrError> {
    let all = list_activities(store)?;
    let options = filter_options(&all);
    let activities = apply_filter(all, filter);
    Ok(CsrView {
        options,
        summary: summarize(&activities),
        progress: progress(&activities),
        monthly_trend: monthly_trend(&activities),
        activities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn activity(date: NaiveDate, company: &str, kind: &str, beneficiaries: u32) -> CsrActivity {
        CsrActivity {
            date,
            company: company.into(),
            activity_type: kind.into(),
            description: "kegiatan".into(),
            beneficiaries,
            status: "Selesai".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        assert!(seed_if_missing(&store).unwrap());
        assert!(!seed_if_missing(&store).unwrap());

        let all = list_activities(&store).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].company, "PT ABC");
        assert_eq!(all[0].beneficiaries, 120);
        assert_eq!(all[2].status, "Direncanakan");
    }

    #[test]
    fn seeded_view_summary() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        seed_if_missing(&store).unwrap();

        let view = view(&store, &CsrFilter::default()).unwrap();
        assert_eq!(view.summary.total_activities, 3);
        assert_eq!(view.summary.total_beneficiaries, 165);
        assert_eq!(view.options.first_date, Some(d(2025, 10, 1)));
        assert_eq!(view.options.last_date, Some(d(2025, 11, 5)));
        assert_eq!(view.options.companies, vec!["PT ABC", "PT DEF", "PT XYZ"]);
    }

    #[test]
    fn add_activity_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let added = add_activity(
            &store,
            NewActivity {
                date: Some(d(2025, 12, 1)),
                company: "  ".into(),
                activity_type: "Kesehatan".into(),
                description: "Posyandu keliling".into(),
                beneficiaries: 30,
                status: String::new(),
                notes: String::new(),
            },
            "PT ABC",
        )
        .unwrap();
        assert_eq!(added.company, "PT ABC");
        assert_eq!(added.status, "Direncanakan");
        assert_eq!(list_activities(&store).unwrap(), vec![added]);
    }

    #[test]
    fn add_activity_requires_description() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let err = add_activity(
            &store,
            NewActivity {
                date: None,
                company: "PT ABC".into(),
                activity_type: "Kesehatan".into(),
                description: "".into(),
                beneficiaries: 0,
                status: String::new(),
                notes: String::new(),
            },
            "",
        )
        .unwrap_err();
        assert!(matches!(err, CsrError::MissingField("description")));
    }

    #[test]
    fn filter_by_company_type_and_range() {
        let all = vec![
            activity(d(2025, 1, 10), "PT A", "Kesehatan", 10),
            activity(d(2025, 2, 10), "PT B", "Lingkungan", 20),
            activity(d(2025, 3, 10), "PT A", "Lingkungan", 30),
        ];

        let only_a = CsrFilter {
            companies: Some(vec!["PT A".into()]),
            ..Default::default()
        };
        assert_eq!(apply_filter(all.clone(), &only_a).len(), 2);

        let env_from_feb = CsrFilter {
            activity_types: Some(vec!["Lingkungan".into()]),
            from: Some(d(2025, 2, 10)),
            to: Some(d(2025, 2, 28)),
            ..Default::default()
        };
        let view = apply_filter(all, &env_from_feb);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company, "PT B");
    }

    #[test]
    fn summary_of_empty_view() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_activities, 0);
        assert_eq!(summary.most_active_company, None);
        assert_eq!(summary.total_beneficiaries, 0);
    }

    #[test]
    fn most_active_breaks_ties_alphabetically() {
        let all = vec![
            activity(d(2025, 1, 1), "PT Z", "K", 0),
            activity(d(2025, 1, 2), "PT B", "K", 0),
            activity(d(2025, 1, 3), "PT Z", "K", 0),
            activity(d(2025, 1, 4), "PT B", "K", 0),
        ];
        assert_eq!(summarize(&all).most_active_company.as_deref(), Some("PT B"));

        let mut more = all.clone();
        more.push(activity(d(2025, 1, 5), "PT Z", "K", 0));
        assert_eq!(summarize(&more).most_active_company.as_deref(), Some("PT Z"));
    }

    #[test]
    fn progress_caps_at_hundred() {
        let mut all: Vec<CsrActivity> = (1..=15)
            .map(|day| activity(d(2025, 1, day), "PT A", "K", 0))
            .collect();
        all.extend((1..=3).map(|day| activity(d(2025, 2, day), "PT B", "K", 0)));

        let progress = progress(&all);
        assert_eq!(
            progress,
            vec![
                CompanyProgress {
                    company: "PT A".into(),
                    done: 15,
                    target: 12,
                    percent: 100,
                },
                CompanyProgress {
                    company: "PT B".into(),
                    done: 3,
                    target: 12,
                    percent: 25,
                },
            ]
        );
    }

    #[test]
    fn monthly_trend_groups_by_month_and_company() {
        let all = vec![
            activity(d(2025, 10, 1), "PT B", "K", 0),
            activity(d(2025, 10, 20), "PT A", "K", 0),
            activity(d(2025, 10, 25), "PT A", "K", 0),
            activity(d(2025, 11, 5), "PT B", "K", 0),
        ];
        let trend = monthly_trend(&all);
        let flat: Vec<(&str, &str, u32)> = trend
            .iter()
            .map(|m| (m.month.as_str(), m.company.as_str(), m.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("2025-10", "PT A", 2),
                ("2025-10", "PT B", 1),
                ("2025-11", "PT B", 1),
            ]
        );
    }
}
