//! Keyword-based complaint classifier for the public self-diagnosis form.
//!
//! This is a screening aid, not a medical classifier. Every result shown
//! to a user must carry [`DISCLAIMER`].

use serde::Serialize;

/// Shown alongside every classification result.
pub const DISCLAIMER: &str = "Hasil ini bukan diagnosis medis. Segera lakukan pemeriksaan ke \
fasilitas kesehatan terdekat untuk memastikan diagnosa dan mendapatkan pengobatan yang tepat.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    RespiratoryInfection,
    DigestiveDisorder,
    Fever,
    Hypertension,
    SkinDisease,
    Unidentified,
}

impl Diagnosis {
    /// Stored label, in Indonesian.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RespiratoryInfection => "ISPA (Infeksi Saluran Pernapasan Akut)",
            Self::DigestiveDisorder => "Gangguan Pencernaan",
            Self::Fever => "Demam / Infeksi Umum",
            Self::Hypertension => "Hipertensi",
            Self::SkinDisease => "Penyakit Kulit",
            Self::Unidentified => "Belum teridentifikasi (segera periksa ke fasilitas kesehatan)",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Self::RespiratoryInfection => "Acute Respiratory Infection",
            Self::DigestiveDisorder => "Digestive Disorder",
            Self::Fever => "Fever / General Infection",
            Self::Hypertension => "Hypertension",
            Self::SkinDisease => "Skin Disease",
            Self::Unidentified => "Unidentified, refer to a health facility",
        }
    }
}

/// Keyword sets in precedence order. The first set with any keyword
/// contained in the lower-cased complaint wins.
const RULES: &[(Diagnosis, &[&str])] = &[
    (
        Diagnosis::RespiratoryInfection,
        &["batuk", "pilek", "bersin", "tenggorokan", "flu"],
    ),
    (
        Diagnosis::DigestiveDisorder,
        &["diare", "mual", "muntah", "perut", "pencernaan"],
    ),
    (Diagnosis::Fever, &["demam", "panas", "nyeri kepala", "meriang"]),
    (
        Diagnosis::Hypertension,
        &["pusing", "tekanan darah", "darah tinggi", "jantung"],
    ),
    (Diagnosis::SkinDisease, &["gatal", "ruam", "bintik", "kulit"]),
];

/// Classify a free-text complaint. Pure and deterministic.
pub fn classify(complaint: &str) -> Diagnosis {
    let text = complaint.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(diagnosis, _)| *diagnosis)
        .unwrap_or(Diagnosis::Unidentified)
}
