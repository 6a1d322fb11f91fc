use crate::error::{GitCountError, Result};
use crate::model::{Commit, CommitSeries, FileChange};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

pub const RECORD_SEP: char = '\u{1e}';
pub const FIELD_SEP: char = '\u{1f}';
pub const LOG_FORMAT: &str = "%x1e%H%x1f%an%x1f%aI%x1f%s";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub series: CommitSeries,
    pub parse_errors: usize,
    pub total_records: usize,
}

pub fn records(text: &str) -> impl Iterator<Item = Result<Commit>> + '_ {
    text.split(RECORD_SEP)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(parse_record)
}

pub fn parse_log(text: &str) -> ParsedLog {
    let mut commits = Vec::new();
    let mut total_records = 0usize;
    let mut parse_errors = 0usize;

    for record in records(text) {
        total_records += 1;
        match record {
            Ok(commit) => commits.push(commit),
            Err(e) => {
                parse_errors += 1;
                warn!(record = total_records, "skipping malformed commit record: {e}");
            }
        }
    }

    let (series, duplicates) = CommitSeries::from_commits(commits);
    if duplicates > 0 {
        warn!(duplicates, "skipping commit records with duplicate hashes");
    }
    parse_errors += duplicates;

    debug!(total_records, parse_errors, commits = series.len(), "parsed commit log");
    ParsedLog {
        series,
        parse_errors,
        total_records,
    }
}

fn parse_record(chunk: &str) -> Result<Commit> {
    let mut lines = chunk.lines().skip_while(|l| l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| GitCountError::Parse("empty record".to_string()))?;

    let mut fields = header.splitn(4, FIELD_SEP);
    let hash = fields.next().unwrap_or("").trim();
    let author = fields.next();
    let date = fields.next();
    let message = fields.next();

    let (author, date, message) = match (author, date, message) {
        (Some(a), Some(d), Some(m)) => (a.trim(), d.trim(), m.trim_end()),
        _ => {
            return Err(GitCountError::Parse(format!(
                "expected 4 header fields in '{}'",
                header.replace(FIELD_SEP, "|")
            )))
        }
    };
    if hash.is_empty() {
        return Err(GitCountError::Parse("missing commit hash".to_string()));
    }

    let timestamp = parse_timestamp(date)
        .ok_or_else(|| GitCountError::Parse(format!("unparsable timestamp '{date}' for {hash}")))?;

    let files = lines.filter_map(parse_numstat_line).collect();

    Ok(Commit {
        hash: hash.to_string(),
        author: author.to_string(),
        timestamp,
        message: message.to_string(),
        files,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}

fn parse_numstat_line(line: &str) -> Option<FileChange> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    let mut parts = line.splitn(3, '\t');
    let (added, removed, path) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(r), Some(p)) if !p.is_empty() => (a, r, p),
        _ => {
            debug!(line, "ignoring unrecognized file-change line");
            return None;
        }
    };

    let binary = added == "-" || removed == "-";
    let count = |field: &str| if field == "-" { Some(0) } else { field.parse::<u32>().ok() };
    let (Some(lines_added), Some(lines_removed)) = (count(added), count(removed)) else {
        debug!(line, "ignoring file-change line with non-numeric counts");
        return None;
    };

    Some(FileChange {
        path: resolve_rename(path),
        lines_added,
        lines_removed,
        binary,
    })
}

/// Resolves numstat rename notation (`old => new`, `dir/{a => b}/f`) to the new path.
fn resolve_rename(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            if let Some((_, to)) = path[open + 1..close].split_once(" => ") {
                let joined = format!("{}{}{}", &path[..open], to, &path[close + 1..]);
                return joined.replace("//", "/");
            }
        }
    }
    match path.split_once(" => ") {
        Some((_, to)) => to.to_string(),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(hash: &str, author: &str, date: &str, subject: &str, numstat: &[&str]) -> String {
        let mut out = format!("{RECORD_SEP}{hash}{FIELD_SEP}{author}{FIELD_SEP}{date}{FIELD_SEP}{subject}\n");
        if !numstat.is_empty() {
            out.push('\n');
            for line in numstat {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    #[test]
    fn empty_input_is_empty_series() {
        let parsed = parse_log("");
        assert!(parsed.series.is_empty());
        assert_eq!(parsed.parse_errors, 0);
        assert_eq!(parsed.total_records, 0);
    }

    #[test]
    fn parses_headers_and_numstat() {
        let text = [
            record("a1", "Alice", "2024-01-02T10:00:00+02:00", "feat: add parser", &["3\t1\tsrc/parse.rs", "-\t-\tlogo.png"]),
            record("b2", "Bob", "2024-01-01T09:00:00+00:00", "initial | commit", &[]),
        ]
        .concat();

        let parsed = parse_log(&text);
        assert_eq!(parsed.total_records, 2);
        assert_eq!(parsed.parse_errors, 0);

        let commits = parsed.series.as_slice();
        assert_eq!(commits[0].hash, "b2");
        assert_eq!(commits[0].message, "initial | commit");
        assert!(commits[0].files.is_empty());

        let a1 = &commits[1];
        assert_eq!(a1.author, "Alice");
        assert_eq!(a1.timestamp.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(a1.lines_added(), 3);
        assert_eq!(a1.lines_removed(), 1);
        assert_eq!(a1.files[1].path, "logo.png");
        assert!(a1.files[1].binary);
    }

    #[test]
    fn malformed_records_are_counted_not_fatal() {
        let text = [
            record("a1", "Alice", "2024-01-02T10:00:00+00:00", "ok", &[]),
            record("b2", "Bob", "yesterday-ish", "bad date", &[]),
            format!("{RECORD_SEP}c3{FIELD_SEP}Carol\n"),
            record("", "Dan", "2024-01-02T10:00:00+00:00", "no hash", &[]),
        ]
        .concat();

        let parsed = parse_log(&text);
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.parse_errors, 3);
        assert_eq!(parsed.series.len() + parsed.parse_errors, parsed.total_records);
    }

    #[test]
    fn duplicate_hash_counts_as_parse_error() {
        let text = [
            record("a1", "Alice", "2024-01-02T10:00:00+00:00", "one", &[]),
            record("a1", "Alice", "2024-01-03T10:00:00+00:00", "again", &[]),
        ]
        .concat();
        let parsed = parse_log(&text);
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.parse_errors, 1);
        assert_eq!(parsed.total_records, 2);
    }

    #[test]
    fn accepts_git_iso_date_format() {
        let text = record("a1", "Alice", "2024-05-06 07:08:09 -0300", "fix", &[]);
        let parsed = parse_log(&text);
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(
            parsed.series.first().unwrap().timestamp.to_rfc3339(),
            "2024-05-06T07:08:09-03:00"
        );
    }

    #[test]
    fn resolves_rename_notation() {
        assert_eq!(resolve_rename("old.rs => new.rs"), "new.rs");
        assert_eq!(resolve_rename("src/{a => b}/lib.rs"), "src/b/lib.rs");
        assert_eq!(resolve_rename("src/{old => }/lib.rs"), "src/lib.rs");
        assert_eq!(resolve_rename("plain/path.rs"), "plain/path.rs");
    }
}
