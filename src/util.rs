use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::time::Duration;

pub fn normalize_dir(dir: &str) -> Option<&str> {
    let mut d = dir.trim();
    while let Some(rest) = d.strip_prefix("./") {
        d = rest;
    }
    let d = d.trim_end_matches('/');
    if d.is_empty() || d == "." {
        None
    } else {
        Some(d)
    }
}

/// Segment-aware prefix test: `src` matches `src/a.rs` and `src`, never `src2/a.rs`.
pub fn path_under(path: &str, dir: &str) -> bool {
    match path.strip_prefix(dir) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

pub fn aggregate_path(path: &str, depth: u32) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if depth == 0 || parts.len() <= depth as usize {
        path.to_string()
    } else {
        parts[..depth as usize].join("/")
    }
}

/// Truncates from the left so the tail of long paths stays visible.
pub fn truncate_left(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max || max <= 3 {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (max - 3)).collect();
    format!("...{tail}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Since,
    Until,
}

pub fn parse_date_bound(
    input: &str,
    kind: BoundKind,
    now: DateTime<Utc>,
) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let time = match kind {
            BoundKind::Since => date.and_hms_opt(0, 0, 0),
            BoundKind::Until => date.and_hms_opt(23, 59, 59),
        }?;
        return Some(time.and_utc().fixed_offset());
    }

    let duration = parse_natural_duration(input).or_else(|| humantime::parse_duration(input).ok())?;
    let delta = chrono::Duration::from_std(duration).ok()?;
    now.checked_sub_signed(delta).map(|dt| dt.fixed_offset())
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    let units: [(&str, u64); 6] = [
        (" days ago", 86400),
        (" day ago", 86400),
        (" weeks ago", 7 * 86400),
        (" week ago", 7 * 86400),
        (" months ago", 30 * 86400),
        (" month ago", 30 * 86400),
    ];
    for (suffix, secs) in units {
        if let Some(n) = input.strip_suffix(suffix) {
            if let Ok(n) = n.trim().parse::<u64>() {
                return n.checked_mul(secs).map(Duration::from_secs);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn path_under_respects_segments() {
        assert!(path_under("src/a.go", "src"));
        assert!(path_under("src", "src"));
        assert!(path_under("src/nested/b.go", "src/nested"));
        assert!(!path_under("src2/file.go", "src"));
        assert!(!path_under("lib/src/a.go", "src"));
    }

    #[test]
    fn normalize_dir_handles_root_and_slashes() {
        assert_eq!(normalize_dir("./src/"), Some("src"));
        assert_eq!(normalize_dir("."), None);
        assert_eq!(normalize_dir("./"), None);
        assert_eq!(normalize_dir(""), None);
    }

    #[test]
    fn aggregate_path_collapses_to_depth() {
        assert_eq!(aggregate_path("src/a/b.rs", 1), "src");
        assert_eq!(aggregate_path("src/a/b.rs", 2), "src/a");
        assert_eq!(aggregate_path("README.md", 2), "README.md");
        assert_eq!(aggregate_path("src/a/b.rs", 0), "src/a/b.rs");
    }

    #[test]
    fn truncate_left_keeps_tail() {
        assert_eq!(truncate_left("short.rs", 20), "short.rs");
        assert_eq!(truncate_left("very/long/path/to/file.rs", 12), "...o/file.rs");
    }

    #[test]
    fn date_only_bounds_are_inclusive_days() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let since = parse_date_bound("2024-01-02", BoundKind::Since, now).unwrap();
        let until = parse_date_bound("2024-01-02", BoundKind::Until, now).unwrap();
        assert_eq!(since.to_rfc3339(), "2024-01-02T00:00:00+00:00");
        assert_eq!(until.to_rfc3339(), "2024-01-02T23:59:59+00:00");
    }

    #[test]
    fn relative_bounds_count_back_from_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let two_weeks = parse_date_bound("2 weeks ago", BoundKind::Since, now).unwrap();
        assert_eq!(two_weeks.to_rfc3339(), "2024-06-01T12:00:00+00:00");
        let ten_days = parse_date_bound("10days", BoundKind::Since, now).unwrap();
        assert_eq!(ten_days.to_rfc3339(), "2024-06-05T12:00:00+00:00");
        assert!(parse_date_bound("HEAD~3", BoundKind::Since, now).is_none());
    }

    #[test]
    fn huge_relative_bounds_are_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(parse_date_bound("300000000000000 days ago", BoundKind::Since, now).is_none());
        assert!(parse_date_bound("18446744073709551615 weeks ago", BoundKind::Until, now).is_none());
    }
}
