use time::OffsetDateTime;

use crate::date;

const AVG_DAYS_PER_MONTH: f64 = 30.44;

fn plural(n: i64, unit: &str) -> String {
    if n < 2 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Relative age of an upstream date string (e.g. "5 minutes ago").
///
/// Returns an empty string when `date` can't be parsed, and "just now" for
/// dates in the future.
pub fn format_time_ago(date: &str, now: OffsetDateTime) -> String {
    let Some(posted) = date::parse_wp_date(date) else {
        return String::new();
    };

    let seconds = (now - posted).whole_seconds();
    if seconds < 0 {
        return "just now".to_owned();
    }
    if seconds < 2 {
        return "1 second ago".to_owned();
    }
    if seconds < 60 {
        return format!("{seconds} seconds ago");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return plural(days, "day");
    }
    if (days as f64) < AVG_DAYS_PER_MONTH {
        return plural(days / 7, "week");
    }
    if days < 365 {
        return plural((days as f64 / AVG_DAYS_PER_MONTH) as i64, "month");
    }
    plural(days / 365, "year")
}

/// Cut `text` to `limit` characters, appending `...` when shortened.
pub fn truncate_title(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

/// Display name for a slug: `tech-news` becomes `Tech News`.
pub fn format_category_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2024-06-15 12:00:00 UTC);

    fn ago(d: Duration) -> String {
        format_time_ago(&date::format_rfc3339(NOW - d), NOW)
    }

    #[test]
    fn time_ago_buckets() {
        assert_eq!(ago(Duration::seconds(-30)), "just now");
        assert_eq!(ago(Duration::seconds(1)), "1 second ago");
        assert_eq!(ago(Duration::seconds(45)), "45 seconds ago");
        assert_eq!(ago(Duration::seconds(90)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(59)), "59 minutes ago");
        assert_eq!(ago(Duration::hours(1)), "1 hour ago");
        assert_eq!(ago(Duration::hours(23)), "23 hours ago");
        assert_eq!(ago(Duration::days(1)), "1 day ago");
        assert_eq!(ago(Duration::days(6)), "6 days ago");
        assert_eq!(ago(Duration::days(7)), "1 week ago");
        assert_eq!(ago(Duration::days(29)), "4 weeks ago");
        assert_eq!(ago(Duration::days(31)), "1 month ago");
        assert_eq!(ago(Duration::days(200)), "6 months ago");
        assert_eq!(ago(Duration::days(365)), "1 year ago");
        assert_eq!(ago(Duration::days(1000)), "2 years ago");
    }

    #[test]
    fn time_ago_of_garbage_is_empty() {
        assert_eq!(format_time_ago("not a date", NOW), "");
        assert_eq!(format_time_ago("", NOW), "");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_title("short", 10), "short");
        assert_eq!(truncate_title("exactly ten", 11), "exactly ten");
        assert_eq!(truncate_title("a longer headline", 8), "a longer...");
        assert_eq!(truncate_title("ünïcödé", 3), "ünï...");
    }

    #[test]
    fn category_names() {
        assert_eq!(format_category_name("tech"), "Tech");
        assert_eq!(format_category_name("tech-news"), "Tech News");
        assert_eq!(format_category_name("--odd--slug"), "Odd Slug");
        assert_eq!(format_category_name(""), "");
    }
}
