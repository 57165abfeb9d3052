use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use funeral_core_api::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

use crate::models::appointment::AppointmentModel;
use crate::models::policy::SchedulingPolicy;

/// Longest range a single availability query may cover.
pub const MAX_AVAILABILITY_DAYS: i64 = 31;

pub const REASON_AT_CAPACITY: &str = "Director at capacity";
pub const REASON_BOOKED: &str = "Existing appointment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub available: bool,
    pub reason: Option<String>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Slot start times of one working day, lunch hour excluded.
fn day_slots(date: NaiveDate, policy: &SchedulingPolicy) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let step = Duration::minutes(i64::from(policy.slot_minutes));
    let mut slots = Vec::new();
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return slots;
    };
    let close = midnight + Duration::hours(i64::from(policy.day_end_hour));
    let mut start = midnight + Duration::hours(i64::from(policy.day_start_hour));
    while start + step <= close {
        let end = start + step;
        let in_lunch = policy.lunch_hour.is_some_and(|lunch| {
            let lunch_start = midnight + Duration::hours(i64::from(lunch));
            start < lunch_start + Duration::hours(1) && lunch_start < end
        });
        if !in_lunch {
            slots.push((start, end));
        }
        start = end;
    }
    slots
}

pub fn validate_range(from: NaiveDate, to: NaiveDate) -> ApiResult<()> {
    if to < from {
        return Err(ApiError::validation("end date is before start date"));
    }
    if (to - from).num_days() + 1 > MAX_AVAILABILITY_DAYS {
        return Err(ApiError::validation(format!(
            "availability range may cover at most {MAX_AVAILABILITY_DAYS} days"
        )));
    }
    Ok(())
}

/// Computes the bookable slots of one director over an inclusive date range.
///
/// Weekends are skipped entirely. A day that already holds the policy's
/// maximum number of non-cancelled appointments is fully unavailable;
/// otherwise only slots overlapping an appointment are.
pub fn compute_availability(
    from: NaiveDate,
    to: NaiveDate,
    appointments: &[AppointmentModel],
    policy: &SchedulingPolicy,
) -> ApiResult<Vec<TimeSlot>> {
    validate_range(from, to)?;

    let mut slots = Vec::new();
    for date in from.iter_days().take_while(|d| *d <= to) {
        if is_weekend(date) {
            continue;
        }
        let booked: Vec<&AppointmentModel> = appointments
            .iter()
            .filter(|a| a.is_active() && a.date() == date)
            .collect();
        let at_capacity = booked.len() as i64 >= i64::from(policy.max_appointments_per_day);

        for (start, end) in day_slots(date, policy) {
            let (available, reason) = if at_capacity {
                (false, Some(REASON_AT_CAPACITY.to_string()))
            } else if booked.iter().any(|a| a.overlaps(start, end)) {
                (false, Some(REASON_BOOKED.to_string()))
            } else {
                (true, None)
            };
            slots.push(TimeSlot {
                start,
                end,
                available,
                reason,
            });
        }
    }
    Ok(slots)
}
