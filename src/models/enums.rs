use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A label that matched none of an enum's known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for {field}: {value}")]
pub struct InvalidLabel {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the same labels, so CSV cells and JSON bodies
/// carry the human-readable label.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidLabel {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Urgency {
    Low => "Rendah",
    Medium => "Sedang",
    High => "Tinggi",
});

str_enum!(Sex {
    Male => "Laki-laki",
    Female => "Perempuan",
});

str_enum!(AgeGroup {
    Pregnant => "Ibu Hamil",
    Toddler => "Bayi/Balita (0–5 tahun)",
    Child => "Anak-anak (6–11 tahun)",
    Adolescent => "Remaja (12–18 tahun)",
    ReproductiveAge => "PUS/WUS (19–49 tahun)",
    Elderly => "Lansia (50+ tahun)",
});

// The two authorities that act on village reports.
str_enum!(Authority {
    Government => "Pemerintah",
    Company => "PT",
});

// ═══════════════════════════════════════════════════════════
// ReportStatus
// ═══════════════════════════════════════════════════════════

/// Status of a village report. Known workflow labels parse into named
/// variants; anything else found in the file is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    AwaitingGovernment,
    GovernmentProcessing,
    ForwardedToCompany,
    CompanyProcessing,
    Done,
    Other(String),
}

impl ReportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AwaitingGovernment => "Menunggu Pemerintah",
            Self::GovernmentProcessing => "Diproses Pemerintah",
            Self::ForwardedToCompany => "Diteruskan ke PT",
            Self::CompanyProcessing => "Diproses PT",
            Self::Done => "Selesai",
            Self::Other(label) => label,
        }
    }

    pub fn parse(label: &str) -> Self {
        match label {
            "Menunggu Pemerintah" => Self::AwaitingGovernment,
            "Diproses Pemerintah" => Self::GovernmentProcessing,
            "Diteruskan ke PT" => Self::ForwardedToCompany,
            "Diproses PT" => Self::CompanyProcessing,
            "Selesai" => Self::Done,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl Authority {
    /// Statuses this authority may set, in menu order.
    pub fn allowed_statuses(&self) -> &'static [ReportStatus] {
        const GOVERNMENT: &[ReportStatus] = &[
            ReportStatus::GovernmentProcessing,
            ReportStatus::ForwardedToCompany,
            ReportStatus::Done,
        ];
        const COMPANY: &[ReportStatus] = &[ReportStatus::CompanyProcessing, ReportStatus::Done];
        match self {
            Self::Government => GOVERNMENT,
            Self::Company => COMPANY,
        }
    }

    /// Store file holding this authority's action log.
    pub fn log_file(&self) -> &'static str {
        match self {
            Self::Government => crate::config::GOVERNMENT_LOG_FILE,
            Self::Company => crate::config::COMPANY_LOG_FILE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn urgency_round_trip() {
        for (variant, s) in [
            (Urgency::Low, "Rendah"),
            (Urgency::Medium, "Sedang"),
            (Urgency::High, "Tinggi"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Urgency::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn age_group_labels_keep_en_dash() {
        assert_eq!(AgeGroup::Toddler.as_str(), "Bayi/Balita (0–5 tahun)");
        assert_eq!(AgeGroup::ALL.len(), 6);
    }

    #[test]
    fn invalid_label_reports_enum_name() {
        let err = Sex::from_str("X").unwrap_err();
        assert_eq!(err.field, "Sex");
        assert_eq!(err.value, "X");
    }

    #[test]
    fn report_status_known_labels() {
        for status in [
            ReportStatus::AwaitingGovernment,
            ReportStatus::GovernmentProcessing,
            ReportStatus::ForwardedToCompany,
            ReportStatus::CompanyProcessing,
            ReportStatus::Done,
        ] {
            assert_eq!(ReportStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn report_status_unknown_label_preserved() {
        let status = ReportStatus::parse("Ditunda");
        assert_eq!(status, ReportStatus::Other("Ditunda".into()));
        assert_eq!(status.as_str(), "Ditunda");
    }

    #[test]
    fn report_status_serializes_as_label() {
        let json = serde_json::to_string(&ReportStatus::ForwardedToCompany).unwrap();
        assert_eq!(json, "\"Diteruskan ke PT\"");
        let back: ReportStatus = serde_json::from_str("\"Selesai\"").unwrap();
        assert!(back.is_terminal());
    }

    #[test]
    fn authority_status_menus() {
        assert_eq!(Authority::Government.allowed_statuses().len(), 3);
        assert!(!Authority::Company
            .allowed_statuses()
            .contains(&ReportStatus::ForwardedToCompany));
    }

    #[test]
    fn urgency_deserialize_rejects_unknown() {
        let result: Result<Urgency, _> = serde_json::from_str("\"Darurat\"");
        assert!(result.is_err());
    }
}
