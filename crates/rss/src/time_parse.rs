// ABOUTME: Flexible pubDate parsing and canonical formatting for RSS documents.
// ABOUTME: Tries an ordered ladder of RFC-822-style and ISO-like formats.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::DateFormatError;

/// How a pattern expects the trailing timezone to be spelled.
enum Zone {
    /// A named abbreviation such as `GMT` or `EST`, resolved through
    /// [`NAMED_ZONES`]. chrono cannot parse these, so the token is split off
    /// and the rest parsed as a naive datetime.
    Named,
    /// A numeric offset such as `+0300`, handled by chrono's `%z`.
    Offset,
}

struct PubDateFormat {
    format: &'static str,
    weekday: bool,
    two_digit_year: bool,
    zone: Zone,
}

const fn row(
    format: &'static str,
    weekday: bool,
    two_digit_year: bool,
    zone: Zone,
) -> PubDateFormat {
    PubDateFormat {
        format,
        weekday,
        two_digit_year,
        zone,
    }
}

/// The RFC-822 family, tried in order with early exit on first match.
///
/// Real publishers drop the weekday, write single-digit days, truncate the
/// year, or name the timezone instead of giving an offset; every combination
/// of those four axes gets a row. Named-zone rows come before offset rows.
const PUB_DATE_FORMATS: &[PubDateFormat] = &[
    // Named timezone, e.g. "Sat, 04 Apr 2015 07:00:13 GMT".
    row("%a, %d %b %Y %H:%M:%S", true, false, Zone::Named),
    row("%d %b %Y %H:%M:%S", false, false, Zone::Named),
    row("%a, %e %b %Y %H:%M:%S", true, false, Zone::Named),
    row("%e %b %Y %H:%M:%S", false, false, Zone::Named),
    row("%a, %d %b %y %H:%M:%S", true, true, Zone::Named),
    row("%d %b %y %H:%M:%S", false, true, Zone::Named),
    row("%a, %e %b %y %H:%M:%S", true, true, Zone::Named),
    row("%e %b %y %H:%M:%S", false, true, Zone::Named),
    // Numeric offset, e.g. "Sat, 04 Apr 2015 07:00:13 +0300".
    row("%a, %d %b %Y %H:%M:%S %z", true, false, Zone::Offset),
    row("%d %b %Y %H:%M:%S %z", false, false, Zone::Offset),
    row("%a, %e %b %Y %H:%M:%S %z", true, false, Zone::Offset),
    row("%e %b %Y %H:%M:%S %z", false, false, Zone::Offset),
    row("%a, %d %b %y %H:%M:%S %z", true, true, Zone::Offset),
    row("%d %b %y %H:%M:%S %z", false, true, Zone::Offset),
    row("%a, %e %b %y %H:%M:%S %z", true, true, Zone::Offset),
    row("%e %b %y %H:%M:%S %z", false, true, Zone::Offset),
];

/// ISO-like spellings tried after the RFC-822 family.
const ISO_FORMATS: &[&str] = &[
    // "2015-04-04 07:00:13 +0300"
    "%Y-%m-%d %H:%M:%S %z",
    // "2015-04-04T07:00:13-00:00"
    "%Y-%m-%dT%H:%M:%S%:z",
    // "2015-04-04T07:00:13.000-00:00"
    "%Y-%m-%dT%H:%M:%S%.3f%:z",
];

/// Timezone abbreviations and their offsets from UTC in seconds.
/// Where an abbreviation is ambiguous (CST, IST) the North American /
/// European reading wins.
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UT", 0),
    ("UTC", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("HST", -10 * 3600),
    ("AST", -4 * 3600),
    ("ADT", -3 * 3600),
    ("NST", -(3 * 3600 + 1800)),
    ("NDT", -(2 * 3600 + 1800)),
    ("WET", 0),
    ("WEST", 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("EET", 2 * 3600),
    ("EEST", 3 * 3600),
    ("BST", 3600),
    ("IST", 3600),
    ("JST", 9 * 3600),
    ("KST", 9 * 3600),
    ("AWST", 8 * 3600),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
    ("NZST", 12 * 3600),
    ("NZDT", 13 * 3600),
];

/// Parses a pubDate string against the format ladder; first match wins.
pub fn parse_pub_date(text: &str) -> Result<DateTime<Utc>, DateFormatError> {
    let trimmed = text.trim();
    for format in PUB_DATE_FORMATS {
        if let Some(date) = try_pub_date_format(trimmed, format) {
            return Ok(date);
        }
    }
    for format in ISO_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(trimmed, format) {
            return Ok(date.with_timezone(&Utc));
        }
    }
    Err(DateFormatError(text.to_string()))
}

/// Formats a timestamp in the single canonical output form,
/// e.g. "Sat, 04 Apr 2015 07:00:13 GMT".
pub fn format_pub_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn try_pub_date_format(text: &str, format: &PubDateFormat) -> Option<DateTime<Utc>> {
    if !year_width_matches(text, format) {
        return None;
    }
    match format.zone {
        Zone::Offset => DateTime::parse_from_str(text, format.format)
            .ok()
            .map(|date| date.with_timezone(&Utc)),
        Zone::Named => {
            let (base, zone) = text.rsplit_once(' ')?;
            let offset = named_zone_offset(zone)?;
            let naive = NaiveDateTime::parse_from_str(base.trim_end(), format.format).ok()?;
            let local = offset.from_local_datetime(&naive).single()?;
            Some(local.with_timezone(&Utc))
        }
    }
}

// chrono's %Y happily consumes a 2-digit year, so each row checks that the
// year token has exactly the digit count its pattern declares before parsing.
fn year_width_matches(text: &str, format: &PubDateFormat) -> bool {
    let index = if format.weekday { 3 } else { 2 };
    let Some(year) = text.split_whitespace().nth(index) else {
        return false;
    };
    let expected = if format.two_digit_year { 2 } else { 4 };
    year.len() == expected && year.bytes().all(|b| b.is_ascii_digit())
}

fn named_zone_offset(zone: &str) -> Option<FixedOffset> {
    NAMED_ZONES
        .iter()
        .find(|(name, _)| *name == zone)
        .and_then(|(_, seconds)| FixedOffset::east_opt(*seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_canonical_form() {
        let date = parse_pub_date("Sat, 04 Apr 2015 07:00:13 GMT").unwrap();
        assert_eq!(date, utc(2015, 4, 4, 7, 0, 13));
    }

    #[test]
    fn test_equivalent_spellings_agree() {
        let expected = parse_pub_date("Sat, 04 Apr 2015 07:00:13 GMT").unwrap();
        for spelling in [
            "04 Apr 2015 07:00:13 GMT",
            "Sat, 4 Apr 2015 07:00:13 GMT",
            "Sat, 4 Apr 15 07:00:13 GMT",
            "4 Apr 15 07:00:13 GMT",
            "Sat, 04 Apr 2015 07:00:13 +0000",
            "2015-04-04 07:00:13 +0000",
            "2015-04-04T07:00:13-00:00",
            "2015-04-04T07:00:13.000-00:00",
        ] {
            assert_eq!(parse_pub_date(spelling).unwrap(), expected, "{spelling}");
        }
    }

    #[test]
    fn test_numeric_offset_is_applied() {
        let date = parse_pub_date("Sat, 04 Apr 2015 10:00:13 +0300").unwrap();
        assert_eq!(date, utc(2015, 4, 4, 7, 0, 13));
    }

    #[test]
    fn test_named_zone_is_applied() {
        // 15:04:05 MST is 22:04:05 UTC.
        let date = parse_pub_date("Mon, 02 Jan 2006 15:04:05 MST").unwrap();
        assert_eq!(date, utc(2006, 1, 2, 22, 4, 5));
    }

    #[test]
    fn test_two_digit_year_maps_to_current_century() {
        let date = parse_pub_date("Mon, 02 Jan 06 15:04:05 UTC").unwrap();
        assert_eq!(date, utc(2006, 1, 2, 15, 4, 5));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(parse_pub_date("  Sat, 04 Apr 2015 07:00:13 GMT\n").is_ok());
    }

    #[test]
    fn test_unknown_zone_fails() {
        assert!(parse_pub_date("Sat, 04 Apr 2015 07:00:13 XYZ").is_err());
    }

    #[test]
    fn test_unparseable_text_names_the_input() {
        let err = parse_pub_date("not a date").unwrap_err();
        assert_eq!(err, DateFormatError("not a date".to_string()));
    }

    #[test]
    fn test_empty_text_fails() {
        assert!(parse_pub_date("").is_err());
    }

    #[test]
    fn test_format_is_canonical() {
        let date = utc(2015, 4, 4, 7, 0, 13);
        assert_eq!(format_pub_date(&date), "Sat, 04 Apr 2015 07:00:13 GMT");
    }

    #[test]
    fn test_parse_format_round_trip() {
        let date = parse_pub_date("4 Apr 15 09:00:13 CEST").unwrap();
        assert_eq!(format_pub_date(&date), "Sat, 04 Apr 2015 07:00:13 GMT");
    }
}
