use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::store::StoreRecord;

/// Role column of the credential file. Unrecognised values fall back to
/// `Unknown` instead of failing the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Developer,
    Admin,
    Nakes,
    Pt,
    Pemerintah,
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Developer => "Developer",
            Self::Admin => "Admin",
            Self::Nakes => "Nakes",
            Self::Pt => "PT",
            Self::Pemerintah => "Pemerintah",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Developer" => Self::Developer,
            "Admin" => Self::Admin,
            "Nakes" => Self::Nakes,
            "PT" => Self::Pt,
            "Pemerintah" => Self::Pemerintah,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One row of `users.csv`. The password is plaintext by contract of the file.
/// The legacy `nama`/`kategori` headers are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    #[serde(alias = "nama")]
    pub name: String,
    #[serde(alias = "kategori")]
    pub role: Role,
}

impl StoreRecord for User {
    const FILE: &'static str = crate::config::USERS_FILE;
    const COLUMNS: &'static [&'static str] = &["username", "password", "name", "role"];
}

/// User listing without the credential column.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
