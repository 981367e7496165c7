/// Date helpers for the boundary between form inputs and stored instants.
///
/// Two representations of the same calendar day are in play:
///   - **Instants**: `DateTime<Utc>`, used by persistence and business logic.
///   - **Date inputs**: `YYYY-MM-DD` strings, as read from and written to
///     `<input type="date">` fields.
///
/// Converting an instant to a date input keeps only its UTC calendar day.
/// Neither direction fails: absent and unparseable values both collapse to
/// the "no value" of the target side (`""` for date inputs, `None` for
/// instants). Callers that need to tell "never set" from "invalid" must check
/// before calling in.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Format an instant as the value of a date input.
///
/// Returns `""` for `None`, and for instants whose year does not fit in four
/// digits.
pub fn to_date_input_value(date: Option<DateTime<Utc>>) -> String {
    let Some(date) = date else {
        return String::new();
    };

    if !(0..=9999).contains(&date.year()) {
        return String::new();
    }

    date.format(DATE_INPUT_FORMAT).to_string()
}

/// Like [`to_date_input_value`], for a date that arrives as text (for example
/// a timestamp column already rendered to a string).
pub fn text_to_date_input_value(date: Option<&str>) -> String {
    to_date_input_value(date.and_then(parse_instant))
}

/// Parse the value of a date input into an instant.
///
/// Returns `None` if the value is missing, blank, or not a recognizable date.
pub fn parse_date_input(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    parse_instant(value)
}

/// General-purpose date parser.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, date-times without an
/// offset (read as UTC) and RFC 2822. Date-only forms resolve to midnight UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(date) = parse_date_only(s) {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    if s.len() > 10 && has_canonical_date_prefix(s) {
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// `%Y` alone takes any number of digits and a sign, so the shape is checked
/// first: `YYYY-MM-DD` with exactly four year digits.
fn has_canonical_date_prefix(s: &str) -> bool {
    let Some(prefix) = s.get(..10) else {
        return false;
    };
    let b = prefix.as_bytes();
    b[4] == b'-'
        && b[7] == b'-'
        && is_digits(&prefix[..4])
        && is_digits(&prefix[5..7])
        && is_digits(&prefix[8..])
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    if s.len() == 10 && has_canonical_date_prefix(s) {
        return NaiveDate::parse_from_str(s, DATE_INPUT_FORMAT).ok();
    }

    match s.split_once('-') {
        // YYYY-MM
        Some((year, month)) if year.len() == 4 && month.len() == 2 => {
            if !is_digits(year) || !is_digits(month) {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        Some(_) => None,
        // YYYY
        None if s.len() == 4 && is_digits(s) => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, sec).unwrap()
    }

    #[test]
    fn absent_instant_is_empty_string() {
        assert_eq!(to_date_input_value(None), "");
    }

    #[test]
    fn absent_text_is_empty_string() {
        assert_eq!(text_to_date_input_value(None), "");
        assert_eq!(text_to_date_input_value(Some("")), "");
    }

    #[test]
    fn formats_utc_day() {
        assert_eq!(
            to_date_input_value(Some(utc(2024, 3, 15, 0, 0, 0))),
            "2024-03-15"
        );
    }

    #[test]
    fn truncates_time_of_day() {
        assert_eq!(
            to_date_input_value(Some(utc(2024, 3, 15, 23, 59, 59))),
            "2024-03-15"
        );
    }

    #[test]
    fn pads_single_digit_components() {
        assert_eq!(to_date_input_value(Some(utc(987, 1, 5, 3, 4, 9))), "0987-01-05");
    }

    #[test]
    fn year_beyond_four_digits_is_empty() {
        assert_eq!(to_date_input_value(Some(utc(12345, 1, 1, 0, 0, 0))), "");
    }

    #[test]
    fn parses_date_input_to_midnight_utc() {
        assert_eq!(
            parse_date_input(Some("2024-03-15")),
            Some(utc(2024, 3, 15, 0, 0, 0))
        );
    }

    #[test]
    fn canonical_date_round_trips() {
        for s in ["2024-03-15", "2000-02-29", "1999-12-31", "0001-01-01"] {
            assert_eq!(to_date_input_value(parse_date_input(Some(s))), s);
        }
    }

    #[test]
    fn instant_round_trip_keeps_the_day() {
        let t = utc(2024, 3, 15, 17, 42, 8);
        let back = parse_date_input(Some(&to_date_input_value(Some(t)))).unwrap();
        assert_eq!(back.date_naive(), t.date_naive());
    }

    #[test]
    fn blank_input_is_no_value() {
        assert_eq!(parse_date_input(None), None);
        assert_eq!(parse_date_input(Some("")), None);
        assert_eq!(parse_date_input(Some("   ")), None);
        assert_eq!(parse_date_input(Some("\t\n")), None);
    }

    #[test]
    fn malformed_input_is_no_value() {
        assert_eq!(parse_date_input(Some("not-a-date")), None);
        assert_eq!(text_to_date_input_value(Some("not-a-date")), "");
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        assert_eq!(parse_date_input(Some("2024-02-30")), None);
        assert_eq!(parse_date_input(Some("2024-13-01")), None);
        assert_eq!(parse_date_input(Some("2024-00")), None);
    }

    #[test]
    fn short_or_signed_years_are_rejected() {
        assert_eq!(parse_date_input(Some("24-03-15")), None);
        assert_eq!(parse_date_input(Some("+2024-03-15")), None);
        assert_eq!(parse_date_input(Some("2024-3-5")), None);
        assert_eq!(parse_date_input(Some("24-03-15T10:00:00")), None);
        assert_eq!(text_to_date_input_value(Some("24-03-15")), "");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            parse_date_input(Some("  2024-03-15 ")),
            Some(utc(2024, 3, 15, 0, 0, 0))
        );
    }

    #[test]
    fn rfc3339_offset_converts_to_utc_day() {
        assert_eq!(
            text_to_date_input_value(Some("2024-03-15T23:30:00-02:00")),
            "2024-03-16"
        );
    }

    #[test]
    fn accepts_partial_dates() {
        assert_eq!(parse_instant("2024-03"), Some(utc(2024, 3, 1, 0, 0, 0)));
        assert_eq!(parse_instant("2024"), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn naive_datetime_is_read_as_utc() {
        assert_eq!(
            parse_instant("2024-03-15T10:20:30"),
            Some(utc(2024, 3, 15, 10, 20, 30))
        );
        assert_eq!(
            parse_instant("2024-03-15 10:20"),
            Some(utc(2024, 3, 15, 10, 20, 0))
        );
    }

    #[test]
    fn accepts_rfc2822() {
        assert_eq!(
            parse_instant("Fri, 15 Mar 2024 10:00:00 +0100"),
            Some(utc(2024, 3, 15, 9, 0, 0))
        );
    }
}
