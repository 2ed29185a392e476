//! Monday-to-Sunday week boundaries.

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};

/// Inclusive calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub monday: Date,
    pub sunday: Date,
}

impl WeekRange {
    pub fn contains(&self, day: Date) -> bool {
        self.monday <= day && day <= self.sunday
    }

    /// Short label such as `03/03 – 09/03`.
    pub fn label(&self) -> String {
        format!(
            "{:02}/{:02} – {:02}/{:02}",
            self.monday.day(),
            u8::from(self.monday.month()),
            self.sunday.day(),
            u8::from(self.sunday.month()),
        )
    }
}

/// Week containing `reference`, moved back by `weeks_ago` whole weeks.
pub fn current_week_range(reference: Date, weeks_ago: u32) -> WeekRange {
    let since_monday = i64::from(reference.weekday().number_days_from_monday());
    let monday = reference
        .saturating_sub(Duration::days(since_monday))
        .saturating_sub(Duration::weeks(i64::from(weeks_ago)));
    let sunday = monday.saturating_add(Duration::days(6));
    WeekRange { monday, sunday }
}

/// Today in the local timezone, falling back to UTC when the offset cannot
/// be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
