//! Text formatting shared by the screens.

use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Formats a publish date as `dd.mm.yyyy` in the given time zone.
pub fn publish_date_in(published_at: Timestamp, tz: &TimeZone) -> String {
    published_at
        .to_zoned(tz.clone())
        .strftime("%d.%m.%Y")
        .to_string()
}

/// Formats a publish date as `dd.mm.yyyy` in the system time zone.
pub fn publish_date(published_at: Timestamp) -> String {
    publish_date_in(published_at, &TimeZone::system())
}

/// `"<n> views"`, or a placeholder when the owner hides the count.
pub fn views_label(views: Option<u64>) -> String {
    count_label(views, "views")
}

/// `"<n> likes"`, or a placeholder when the owner hides the count.
pub fn likes_label(likes: Option<u64>) -> String {
    count_label(likes, "likes")
}

fn count_label(count: Option<u64>, noun: &str) -> String {
    match count {
        Some(n) => format!("{n} {noun}"),
        None => format!("{noun} hidden"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dates_are_day_first_with_dots() {
        let ts: Timestamp = "2024-05-07T14:30:00Z".parse().unwrap();
        assert_eq!(publish_date_in(ts, &TimeZone::UTC), "07.05.2024");
    }

    #[test]
    fn dates_follow_the_time_zone() {
        let ts: Timestamp = "2023-12-31T23:30:00Z".parse().unwrap();
        assert_eq!(publish_date_in(ts, &TimeZone::UTC), "31.12.2023");
        let warsaw = TimeZone::fixed(jiff::tz::offset(1));
        assert_eq!(publish_date_in(ts, &warsaw), "01.01.2024");
    }

    #[test]
    fn counts() {
        assert_eq!(views_label(Some(25268952)), "25268952 views");
        assert_eq!(likes_label(Some(12345)), "12345 likes");
        assert_eq!(likes_label(None), "likes hidden");
    }
}
