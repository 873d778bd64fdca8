pub mod csr;
pub mod enums;
pub mod intake;
pub mod report;
pub mod timestamp;
pub mod user;

pub use csr::CsrActivity;
pub use enums::{AgeGroup, Authority, InvalidLabel, ReportStatus, Sex, Urgency};
pub use intake::{Comment, PatientRecord, PublicDiagnosis};
pub use report::{ActionLogEntry, VillageReport};
pub use user::{Role, User, UserSummary};
