use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Parse the date formats WordPress upstreams send.
///
/// WordPress.com sends RFC 3339 with an offset, self-hosted sites send a
/// naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), and older local records may
/// carry just a date.
pub fn parse_wp_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }

    if let Ok(dt) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(dt.assume_utc());
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// RFC 3339 rendering of `dt`, empty if the value can't be represented.
pub fn format_rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_default()
}

/// Milliseconds since the Unix epoch, used for locally minted ids.
pub fn unix_millis(dt: OffsetDateTime) -> u64 {
    u64::try_from(dt.unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
}
