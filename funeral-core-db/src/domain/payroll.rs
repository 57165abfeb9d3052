use chrono::NaiveDate;
use funeral_core_api::{ApiError, ApiResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weekly hours paid at the regular rate.
pub const REGULAR_HOURS_PER_WEEK: Decimal = Decimal::from_parts(40, 0, 0, false, 0);
/// 1.5x
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
const HOURS_PER_WEEK: Decimal = Decimal::from_parts(168, 0, 0, false, 0);

/// Hours one employee worked on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLine {
    pub employee_id: String,
    /// Monday of the pay week
    pub week_start: NaiveDate,
    pub regular_hours: Decimal,
    pub overtime_hours: Decimal,
    pub hourly_rate: Decimal,
    pub gross_pay: Decimal,
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(chrono::Weekday::Mon).first_day()
}

/// Aggregates timesheets into one payroll line per employee and week.
///
/// Hours above 40 in a week are paid at 1.5x the hourly rate.
pub fn calculate_payroll(entries: &[TimesheetEntry]) -> ApiResult<Vec<PayrollLine>> {
    let mut weeks: BTreeMap<(String, NaiveDate), (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries {
        if entry.hours < Decimal::ZERO {
            return Err(ApiError::validation(format!(
                "negative hours for employee {} on {}",
                entry.employee_id, entry.work_date
            )));
        }
        if entry.hourly_rate < Decimal::ZERO {
            return Err(ApiError::validation(format!(
                "negative hourly rate for employee {}",
                entry.employee_id
            )));
        }
        let slot = weeks
            .entry((entry.employee_id.clone(), week_start(entry.work_date)))
            .or_insert((Decimal::ZERO, entry.hourly_rate));
        if slot.1 != entry.hourly_rate {
            return Err(ApiError::validation(format!(
                "employee {} has more than one hourly rate in the same week",
                entry.employee_id
            )));
        }
        slot.0 += entry.hours;
    }

    weeks
        .into_iter()
        .map(|((employee_id, week_start), (hours, hourly_rate))| {
            if hours > HOURS_PER_WEEK {
                return Err(ApiError::validation(format!(
                    "employee {employee_id} reported {hours} hours in the week of {week_start}"
                )));
            }
            let regular_hours = hours.min(REGULAR_HOURS_PER_WEEK);
            let overtime_hours = hours - regular_hours;
            let gross_pay = (regular_hours * hourly_rate + overtime_hours * hourly_rate * OVERTIME_MULTIPLIER)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            Ok(PayrollLine {
                employee_id,
                week_start,
                regular_hours,
                overtime_hours,
                hourly_rate,
                gross_pay,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(employee: &str, day: u32, hours: i64) -> TimesheetEntry {
        TimesheetEntry {
            employee_id: employee.into(),
            // October 2026: the 19th is a Monday
            work_date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            hours: Decimal::from(hours),
            hourly_rate: Decimal::from(20),
        }
    }

    #[test]
    fn test_overtime_above_forty_hours() {
        let entries: Vec<TimesheetEntry> = (19..=23).map(|d| entry("E-1", d, 9)).collect();
        let lines = calculate_payroll(&entries).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.week_start, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(line.regular_hours, Decimal::from(40));
        assert_eq!(line.overtime_hours, Decimal::from(5));
        // 40 * 20 + 5 * 30
        assert_eq!(line.gross_pay, Decimal::from(950));
    }

    #[test]
    fn test_weeks_are_separate() {
        let entries = vec![entry("E-1", 23, 30), entry("E-1", 26, 30), entry("E-2", 20, 8)];
        let lines = calculate_payroll(&entries).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.overtime_hours.is_zero()));
    }

    #[test]
    fn test_invalid_hours() {
        assert!(calculate_payroll(&[entry("E-1", 19, -1)]).is_err());
        let entries: Vec<TimesheetEntry> = (19..=25).map(|d| entry("E-1", d, 25)).collect();
        assert!(matches!(calculate_payroll(&entries), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_conflicting_rates() {
        let mut second = entry("E-1", 20, 8);
        second.hourly_rate = Decimal::from(25);
        assert!(calculate_payroll(&[entry("E-1", 19, 8), second]).is_err());
    }
}
