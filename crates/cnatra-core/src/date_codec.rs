//! Conversion between calendar dates and the schedule site's wire values.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;

use crate::error::ScheduleError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const FRONT_PAGE_BASE_URL: &str = "https://www.cnatra.navy.mil/scheds/tw1";

/// Days elapsed since 2000-01-01, as sent in `__EVENTARGUMENT` by the calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateNumber(i64);

impl DateNumber {
    pub fn from_days(days: i64) -> Self {
        Self(days)
    }

    pub fn days(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EPOCH: LazyLock<NaiveDate> =
    LazyLock::new(|| NaiveDate::from_ymd_opt(2000, 1, 1).expect("2000-01-01 is a valid date"));

/// Strict `YYYY-MM-DD` parse. Surrounding whitespace is malformed, since the input is
/// reused verbatim as the result key and inside the front page URL.
pub fn parse_date(date_string: &str) -> Result<NaiveDate, ScheduleError> {
    if date_string != date_string.trim() {
        return Err(ScheduleError::malformed_date(date_string));
    }
    NaiveDate::parse_from_str(date_string, DATE_FORMAT)
        .map_err(|_| ScheduleError::malformed_date(date_string))
}

/// Encode a `YYYY-MM-DD` date as its date number.
pub fn encode(date_string: &str) -> Result<DateNumber, ScheduleError> {
    let date = parse_date(date_string)?;
    Ok(DateNumber((date - *EPOCH).num_days()))
}

/// Inverse of [`encode`].
pub fn decode(number: DateNumber) -> Option<String> {
    EPOCH
        .checked_add_signed(chrono::Duration::days(number.0))
        .map(|date| date.format(DATE_FORMAT).to_string())
}

/// URL of the per-day "front page" PDF. The squadron id is not validated.
pub fn front_page_url(squadron_id: &str, date_string: &str) -> String {
    let sid = squadron_id.to_uppercase();
    let ds = date_string.to_uppercase();
    format!("{FRONT_PAGE_BASE_URL}/SQ-{sid}/!{ds}!{sid}!Frontpage.pdf")
}
