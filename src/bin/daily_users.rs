use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use event_meter::scan;

const DEFAULT_LOG_DIR: &str = "/logs";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: daily-users <CCYY-MM-DD>... (log directory from LOG_DIR, default {DEFAULT_LOG_DIR})");
    }
    let dates = args
        .iter()
        .map(|arg| {
            NaiveDate::parse_from_str(arg, "%Y-%m-%d")
                .with_context(|| format!("invalid date `{arg}`, expected CCYY-MM-DD"))
        })
        .collect::<Result<Vec<_>>>()?;

    let log_dir = env::var_os("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    let counts = scan::daily_user_counts(&log_dir, &dates)
        .with_context(|| format!("scanning {}", log_dir.display()))?;

    println!("Count of Unique Users");
    println!("----------------------------");
    for (date, count) in counts {
        println!("{}: {}", date.format("%Y-%m-%d"), count);
    }
    Ok(())
}
