//! Form intake: public self-diagnosis, health-worker patient records and
//! public comments. Each submission is validated, stamped and appended.

use serde::{Deserialize, Serialize};

use crate::classifier::{self, Diagnosis};
use crate::models::{AgeGroup, Comment, PatientRecord, PublicDiagnosis, Sex};
use crate::store::{CsvStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfDiagnosisForm {
    pub name: String,
    pub national_id: String,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    pub sex: Sex,
    #[serde(default)]
    pub address: String,
    pub complaint: String,
}

/// What the public form shows after a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SelfDiagnosisResult {
    pub diagnosis: Diagnosis,
    pub label: &'static str,
    pub english_name: &'static str,
    pub disclaimer: &'static str,
    /// Number of public submissions stored, including this one.
    pub total_submissions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub national_id: String,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    pub sex: Sex,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub complaint: String,
    pub diagnosis: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    pub name: String,
    pub text: String,
}

pub fn ensure_files(store: &CsvStore) -> Result<(), StoreError> {
    store.ensure_records::<PublicDiagnosis>()?;
    store.ensure_records::<PatientRecord>()?;
    store.ensure_records::<Comment>()?;
    Ok(())
}

/// Classify and store a public complaint. Nothing is written when a
/// required field is blank.
pub fn submit_self_diagnosis(
    store: &CsvStore,
    form: SelfDiagnosisForm,
) -> Result<SelfDiagnosisResult, IntakeError> {
    let name = required("name", &form.name)?;
    let national_id = required("national_id", &form.national_id)?;
    let complaint = required("complaint", &form.complaint)?;

    let diagnosis = classifier::classify(&complaint);
    let record = PublicDiagnosis {
        name,
        national_id,
        age_group: form.age_group,
        sex: form.sex,
        address: form.address.trim().to_string(),
        complaint,
        diagnosis: diagnosis.label().to_string(),
        submitted_at: crate::models::timestamp::now(),
    };
    let index = store.append_record(&record)?;

    tracing::info!(diagnosis = diagnosis.english_name(), "Self-diagnosis submitted");
    Ok(SelfDiagnosisResult {
        diagnosis,
        label: diagnosis.label(),
        english_name: diagnosis.english_name(),
        disclaimer: classifier::DISCLAIMER,
        total_submissions: index + 1,
    })
}

pub fn list_public_diagnoses(store: &CsvStore) -> Result<Vec<PublicDiagnosis>, IntakeError> {
    Ok(store.read_records()?)
}

pub fn record_patient(
    store: &CsvStore,
    form: PatientForm,
    recorded_by: &str,
) -> Result<PatientRecord, IntakeError> {
    let record = PatientRecord {
        name: required("name", &form.name)?,
        national_id: required("national_id", &form.national_id)?,
        age_group: form.age_group,
        sex: form.sex,
        address: form.address.trim().to_string(),
        complaint: form.complaint.trim().to_string(),
        diagnosis: required("diagnosis", &form.diagnosis)?,
        recorded_at: crate::models::timestamp::now(),
        recorded_by: recorded_by.to_string(),
    };
    store.append_record(&record)?;
    tracing::info!(recorded_by, "Patient record added");
    Ok(record)
}

pub fn list_patients(store: &CsvStore) -> Result<Vec<PatientRecord>, IntakeError> {
    Ok(store.read_records()?)
}

pub fn post_comment(store: &CsvStore, form: CommentForm) -> Result<Comment, IntakeError> {
    let comment = Comment {
        name: required("name", &form.name)?,
        text: required("text", &form.text)?,
        posted_at: crate::models::timestamp::now(),
    };
    store.append_record(&comment)?;
    Ok(comment)
}

/// All comments in insertion order.
pub fn list_comments(store: &CsvStore) -> Result<Vec<Comment>, IntakeError> {
    Ok(store.read_records()?)
}

fn required(field: &'static str, value: &str) -> Result<String, IntakeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        tracing::warn!(field, "Rejected form with blank required field");
        return Err(IntakeError::MissingField(field));
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

    fn self_form(complaint: &str) -> SelfDiagnosisForm {
        SelfDiagnosisForm {
            name: "Rina".into(),
            national_id: "6401010101010001".into(),
            age_group: Some(AgeGroup::ReproductiveAge),
            sex: Sex::Female,
            address: "RT 02 Desa A".into(),
            complaint: complaint.into(),
        }
    }

    #[test]
    fn cough_and_cold_is_stored_as_respiratory() {
        let (store, _dir) = test_store();
        let result = submit_self_diagnosis(&store, self_form("batuk dan pilek")).unwrap();

        assert_eq!(result.diagnosis, Diagnosis::RespiratoryInfection);
        assert_eq!(result.english_name, "Acute Respiratory Infection");
        assert_eq!(result.total_submissions, 1);
        assert!(!result.disclaimer.is_empty());

        let stored = list_public_diagnoses(&store).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].diagnosis, "ISPA (Infeksi Saluran Pernapasan Akut)");
        assert_eq!(stored[0].age_group, Some(AgeGroup::ReproductiveAge));
    }

    #[test]
    fn blank_complaint_writes_nothing() {
        let (store, _dir) = test_store();
        let err = submit_self_diagnosis(&store, self_form("   ")).unwrap_err();
        assert!(matches!(err, IntakeError::MissingField("complaint")));
        assert!(list_public_diagnoses(&store).unwrap().is_empty());
    }

    #[test]
    fn missing_age_group_round_trips_as_none() {
        let (store, _dir) = test_store();
        let mut form = self_form("gatal");
        form.age_group = None;
        submit_self_diagnosis(&store, form).unwrap();
        assert_eq!(list_public_diagnoses(&store).unwrap()[0].age_group, None);
    }

    #[test]
    fn total_counts_all_submissions() {
        let (store, _dir) = test_store();
        submit_self_diagnosis(&store, self_form("diare")).unwrap();
        let second = submit_self_diagnosis(&store, self_form("lemas")).unwrap();
        assert_eq!(second.total_submissions, 2);
        assert_eq!(second.diagnosis, Diagnosis::Unidentified);
    }

    #[test]
    fn patient_requires_diagnosis() {
        let (store, _dir) = test_store();
        let form = PatientForm {
            name: "Budi".into(),
            national_id: "1".into(),
            age_group: None,
            sex: Sex::Male,
            address: String::new(),
            complaint: "demam".into(),
            diagnosis: "".into(),
        };
        assert!(matches!(
            record_patient(&store, form.clone(), "siti"),
            Err(IntakeError::MissingField("diagnosis"))
        ));

        let form = PatientForm {
            diagnosis: "Malaria".into(),
            ..form
        };
        let record = record_patient(&store, form, "siti").unwrap();
        assert_eq!(record.recorded_by, "siti");
        assert_eq!(list_patients(&store).unwrap(), vec![record]);
    }

    #[test]
    fn comments_keep_insertion_order() {
        let (store, _dir) = test_store();
        for (name, text) in [("A", "pertama"), ("B", "kedua, dengan koma")] {
            post_comment(
                &store,
                CommentForm {
                    name: name.into(),
                    text: text.into(),
                },
            )
            .unwrap();
        }
        let comments = list_comments(&store).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].text, "kedua, dengan koma");
    }

    #[test]
    fn comment_requires_text() {
        let (store, _dir) = test_store();
        let err = post_comment(
            &store,
            CommentForm {
                name: "A".into(),
                text: "\n".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, IntakeError::MissingField("text")));
    }
}
