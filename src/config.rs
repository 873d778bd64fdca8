use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "SIPETUALANG";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Store file names, relative to the data directory.
pub const USERS_FILE: &str = "users.csv";
pub const VILLAGE_REPORTS_FILE: &str = "village_reports.csv";
pub const GOVERNMENT_LOG_FILE: &str = "government_log.csv";
pub const COMPANY_LOG_FILE: &str = "company_log.csv";
pub const PATIENT_RECORDS_FILE: &str = "patient_records.csv";
pub const PUBLIC_DIAGNOSES_FILE: &str = "public_diagnoses.csv";
pub const COMMENTS_FILE: &str = "comments.csv";
pub const CSR_LOG_FILE: &str = "csr_log.csv";
pub const ANNOUNCEMENT_FILE: &str = "announcement.txt";
pub const BANNER_FILE: &str = "banner.jpg";

/// Activities per company per year the CSR progress bars are measured against.
pub const CSR_ANNUAL_TARGET: u32 = 12;

/// Number of rows in the "top diseases" dashboard tables.
pub const TOP_N: usize = 10;

const DEFAULT_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "sipetualang_lib=info,tower_http=warn"
}

/// Default data directory: `<local data dir>/sipetualang`, or `./data`
/// when the platform has no notion of one.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("sipetualang"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub session_idle_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

impl AppConfig {
    /// Build the configuration from `SIPETUALANG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("SIPETUALANG_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let addr = lookup("SIPETUALANG_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| ConfigError::Invalid {
            var: "SIPETUALANG_ADDR",
            value: addr.clone(),
        })?;

        let session_idle_secs = match lookup("SIPETUALANG_SESSION_IDLE_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "SIPETUALANG_SESSION_IDLE_SECS",
                value: raw.clone(),
            })?,
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            data_dir,
            bind_addr,
            session_idle_secs,
        })
    }

    /// Configuration rooted at an explicit data directory, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}
