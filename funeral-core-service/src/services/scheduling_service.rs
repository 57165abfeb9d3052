use chrono::{Duration, NaiveDate, NaiveDateTime};
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{compute_availability, validate_range, TimeSlot};
use funeral_core_db::models::appointment::{AppointmentModel, AppointmentStatus};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::{AppointmentRepository, CreateBatch, FindAppointmentsByDirector};
use funeral_core_db::utils::to_heapless;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::policy_service::PolicyService;
use crate::commands::ScheduleAppointmentCommand;

fn day_bounds(from: NaiveDate, to: NaiveDate) -> ApiResult<(NaiveDateTime, NaiveDateTime)> {
    let start = from
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ApiError::validation(format!("invalid date {from}")))?;
    let end = to
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ApiError::validation(format!("invalid date {to}")))?
        + Duration::days(1);
    Ok((start, end))
}

pub struct SchedulingService {
    appointments: Arc<dyn AppointmentRepository>,
    policies: Arc<PolicyService>,
}

impl SchedulingService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, policies: Arc<PolicyService>) -> Self {
        Self { appointments, policies }
    }

    async fn appointments_between(&self, director_id: Uuid, from: NaiveDate, to: NaiveDate) -> ApiResult<Vec<AppointmentModel>> {
        let (start, end) = day_bounds(from, to)?;
        self.appointments
            .find_appointments_by_director(director_id, start, end)
            .await
            .map_err(ApiError::persistence)
    }

    /// Bookable slots of a director over an inclusive date range.
    pub async fn director_availability(&self, director_id: Uuid, from: NaiveDate, to: NaiveDate) -> ApiResult<Vec<TimeSlot>> {
        validate_range(from, to)?;
        let policy = self.policies.scheduling_policy().await?;
        let booked = self.appointments_between(director_id, from, to).await?;
        debug!(%director_id, %from, %to, booked = booked.len(), "Computing availability");
        compute_availability(from, to, &booked, &policy)
    }

    /// Books an appointment into free slots only.
    pub async fn schedule_appointment(&self, cmd: ScheduleAppointmentCommand) -> ApiResult<AppointmentModel> {
        cmd.validate()?;
        if cmd.end_time <= cmd.start_time {
            return Err(ApiError::validation("appointment must end after it starts"));
        }
        let day = cmd.start_time.date();
        let slots = self.director_availability(cmd.director_id, day, day).await?;
        let covering: Vec<&TimeSlot> = slots
            .iter()
            .filter(|s| s.start < cmd.end_time && cmd.start_time < s.end)
            .collect();
        let fits = covering.first().is_some_and(|s| s.start <= cmd.start_time)
            && covering.last().is_some_and(|s| s.end >= cmd.end_time)
            && covering.windows(2).all(|w| w[0].end == w[1].start);
        if !fits {
            return Err(ApiError::rule("appointment falls outside working hours"));
        }
        if let Some(taken) = covering.iter().find(|s| !s.available) {
            return Err(ApiError::rule(format!(
                "slot at {} is unavailable: {}",
                taken.start,
                taken.reason.as_deref().unwrap_or("unavailable")
            )));
        }

        let appointment = AppointmentModel {
            id: Uuid::new_v4(),
            director_id: cmd.director_id,
            case_key: cmd.case_key.as_deref().map(parse_business_key).transpose()?,
            start_time: cmd.start_time,
            end_time: cmd.end_time,
            kind: cmd.kind,
            status: AppointmentStatus::Scheduled,
            title: to_heapless(&cmd.title, "title")?,
        };
        let saved = self
            .appointments
            .create_batch(vec![appointment])
            .await
            .map_err(ApiError::persistence)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::PersistenceError("appointment insert returned no row".into()))?;
        info!(appointment = %saved.id, director = %saved.director_id, start = %saved.start_time, "Appointment scheduled");
        Ok(saved)
    }
}
