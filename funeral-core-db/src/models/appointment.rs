use chrono::{NaiveDate, NaiveDateTime};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::models::temporal::BusinessKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "appointment_kind", rename_all = "PascalCase"))]
pub enum AppointmentKind {
    Arrangement,
    Viewing,
    Service,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "appointment_status", rename_all = "PascalCase"))]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

/// Director calendar entry. Appointments are plain rows, not versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentModel {
    pub id: Uuid,
    pub director_id: Uuid,
    pub case_key: Option<BusinessKey>,
    /// Local wall-clock time of the funeral home
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub title: HeaplessString<100>,
}

impl Identifiable for AppointmentModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl AppointmentModel {
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}
