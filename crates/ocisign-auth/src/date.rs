//! `date` header formatting.

use chrono::{DateTime, Utc};

/// Format `time` as an RFC 7231 IMF-fixdate, e.g. `Thu, 05 Jan 2014 21:31:40 GMT`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ocisign_auth::date::http_date;
///
/// let time = Utc.with_ymd_and_hms(2014, 1, 5, 21, 31, 40).unwrap();
/// assert_eq!(http_date(time), "Sun, 05 Jan 2014 21:31:40 GMT");
/// ```
#[must_use]
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_should_zero_pad_day_and_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 4, 5, 6).unwrap();
        assert_eq!(http_date(time), "Fri, 01 Mar 2024 04:05:06 GMT");
    }
}
