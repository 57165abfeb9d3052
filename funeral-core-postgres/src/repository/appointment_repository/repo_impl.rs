use funeral_core_db::models::appointment::AppointmentModel;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

pub(super) const APPOINTMENT_COLUMNS: &str =
    "id, director_id, case_key, start_time, end_time, kind, status, title";

pub struct AppointmentRepositoryImpl {
    pub executor: Executor,
}

impl AppointmentRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for AppointmentModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(AppointmentModel {
            id: row.try_get("id")?,
            director_id: row.try_get("director_id")?,
            case_key: get_optional_heapless_string(row, "case_key")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            kind: row.try_get("kind")?,
            status: row.try_get("status")?,
            title: get_heapless_string(row, "title")?,
        })
    }
}
