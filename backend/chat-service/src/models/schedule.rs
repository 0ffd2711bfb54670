use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Weekly availability window for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayWindow {
    pub day: String,
    pub start: String,
    pub end: String,
    pub available: bool,
}

/// A member's declared working hours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub timezone: String,
    pub days: Vec<DayWindow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkScheduleRecord {
    pub member_id: String,
    pub schedule: WorkSchedule,
    pub updated_at: DateTime<Utc>,
}

impl WorkSchedule {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timezone.trim().is_empty() {
            return Err(AppError::Validation("timezone is required".into()));
        }
        for window in &self.days {
            if !DAYS.contains(&window.day.to_lowercase().as_str()) {
                return Err(AppError::Validation(format!(
                    "unknown day '{}'",
                    window.day
                )));
            }
            let start = parse_hhmm(&window.start)?;
            let end = parse_hhmm(&window.end)?;
            if window.available && start >= end {
                return Err(AppError::Validation(format!(
                    "day '{}' has start >= end",
                    window.day
                )));
            }
        }
        Ok(())
    }
}

/// Minutes since midnight for an "HH:MM" string
fn parse_hhmm(value: &str) -> Result<u32, AppError> {
    let invalid = || AppError::Validation(format!("invalid time '{value}', expected HH:MM"));
    let (h, m) = value.split_once(':').ok_or_else(invalid)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(invalid());
    }
    let h: u32 = h.parse().map_err(|_| invalid())?;
    let m: u32 = m.parse().map_err(|_| invalid())?;
    if h > 23 || m > 59 {
        return Err(invalid());
    }
    Ok(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(day: &str, start: &str, end: &str, available: bool) -> DayWindow {
        DayWindow {
            day: day.into(),
            start: start.into(),
            end: end.into(),
            available,
        }
    }

    #[test]
    fn accepts_a_normal_week() {
        let schedule = WorkSchedule {
            timezone: "Europe/Berlin".into(),
            days: vec![
                window("mon", "09:00", "17:30", true),
                window("sat", "00:00", "00:00", false),
            ],
        };
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_window_and_bad_times() {
        let inverted = WorkSchedule {
            timezone: "UTC".into(),
            days: vec![window("tue", "18:00", "09:00", true)],
        };
        assert!(inverted.validate().is_err());

        let bad_time = WorkSchedule {
            timezone: "UTC".into(),
            days: vec![window("wed", "9am", "17:00", true)],
        };
        assert!(bad_time.validate().is_err());

        let bad_day = WorkSchedule {
            timezone: "UTC".into(),
            days: vec![window("someday", "09:00", "17:00", true)],
        };
        assert!(bad_day.validate().is_err());
    }

    #[test]
    fn parse_hhmm_bounds() {
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("23:59").unwrap(), 23 * 60 + 59);
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("1:05").is_err());
    }
}
