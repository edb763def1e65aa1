//! Unique-user counts per day, read from a tree of dated log files.
//!
//! Walks a log directory recursively, picks out files whose names end with
//! `log.<CCYY-MM-DD>` for each requested date, and counts the distinct user
//! identities appearing in matching log lines. This is a stateless batch
//! utility; it shares nothing with [`Meter`](crate::Meter).

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::Result;

// Matches lines like
// `2011-01-03 10:15:32,412 INFO  [mlepidus@10.0.1.5] ...`
// with the user identity in the capture group.
static USER_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} (?:FATAL|ERROR|WARN|INFO|DEBUG|TRACE) +\[(\w+)@",
    )
    .expect("user entry pattern")
});

/// Counts unique users for each date, preserving input order.
pub fn daily_user_counts(
    log_dir: &Path,
    dates: &[NaiveDate],
) -> Result<Vec<(NaiveDate, usize)>> {
    dates
        .iter()
        .map(|&date| Ok((date, unique_users_for_date(log_dir, date)?)))
        .collect()
}

/// Counts unique users for one date across every matching file under
/// `log_dir` and its subdirectories.
pub fn unique_users_for_date(log_dir: &Path, date: NaiveDate) -> Result<usize> {
    let suffix = format!("log.{}", date.format("%Y-%m-%d"));
    let mut users = HashSet::new();
    for entry in WalkDir::new(log_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            debug!("scanning {}", entry.path().display());
            collect_file_users(entry.path(), &mut users)?;
        }
    }
    Ok(users.len())
}

fn collect_file_users(path: &Path, users: &mut HashSet<String>) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        if let Some(caps) = USER_ENTRY_RE.captures(&line?) {
            users.insert(caps[1].to_owned());
        }
    }
    Ok(())
}
