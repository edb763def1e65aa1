use std::time::Duration;

use event_meter::{Config, Error, Meter, MS_1_HR, MS_1_MIN};

const MS_1_SEC: i64 = 1000;
const MS_2_SEC: i64 = MS_1_SEC * 2;
const MS_5_SEC: i64 = MS_1_SEC * 5;
const MS_10_SEC: i64 = MS_1_SEC * 10;
const MS_10_MIN: i64 = MS_1_MIN * 10;
const MS_30_MIN: i64 = MS_1_MIN * 30;

fn now_millis() -> i64 {
    chrono::Local::now().timestamp_millis()
}

#[test]
fn basic_counts() {
    let meter = Meter::new();
    meter.mark();
    meter.mark();
    meter.mark();
    assert_eq!(meter.total_count(), 3);
    assert_eq!(meter.current_count(), 3);
}

#[test]
fn window_counts() {
    let meter = Meter::new();
    let time = now_millis();

    // Events must be marked oldest to newest since new ones go to the front.

    // Older than 1 hour, so never counted below.
    meter.mark_at(time - (MS_1_HR + MS_10_SEC));

    // Two in the past hour.
    meter.mark_at(time - (MS_30_MIN + MS_5_SEC));
    meter.mark_at(time - (MS_30_MIN + MS_1_SEC));

    // Three in the past 15 minutes.
    meter.mark_at(time - (MS_10_MIN + MS_10_SEC));
    meter.mark_at(time - (MS_10_MIN + MS_5_SEC));
    meter.mark_at(time - (MS_10_MIN + MS_1_SEC));

    // Four in the past minute.
    meter.mark_at(time - MS_10_SEC);
    meter.mark_at(time - MS_5_SEC);
    meter.mark_at(time - MS_2_SEC);
    meter.mark_at(time - MS_1_SEC);

    assert_eq!(meter.total_count(), 10);
    assert_eq!(meter.count_past_minute(), 4);
    assert_eq!(meter.count_past_15_minutes(), 7);
    assert_eq!(meter.count_past_hour(), 9);
}

#[test]
fn counts_with_mixed_ages() {
    let meter = Meter::new();
    let time = now_millis();
    meter.mark_at(time - 70 * MS_1_SEC);
    meter.mark_at(time - 40 * MS_1_SEC);
    meter.mark_at(time - MS_5_SEC);

    assert_eq!(meter.count_past_minute(), 2);
    assert_eq!(meter.count_past_15_minutes(), 3);
    assert_eq!(meter.count_past_hour(), 3);
    assert_eq!(meter.current_count(), 3);
    assert_eq!(meter.total_count(), 3);
}

#[test]
fn window_cutoff_is_strict() {
    let meter = Meter::new();
    let time = now_millis();
    // Exactly one minute old when recorded; only gets older by query time, so
    // it stays outside the one-minute window.
    meter.mark_at(time - MS_1_MIN);
    // Comfortably inside the window.
    meter.mark_at(time - MS_10_SEC);

    assert_eq!(meter.count_past_minute(), 1);
    assert_eq!(meter.count_within_past(Duration::from_secs(60)), 1);
    // Both fall inside a wider window.
    assert_eq!(meter.count_past_15_minutes(), 2);
}

#[test]
fn bucket_index_truncates() {
    let meter = Meter::new();
    let time = now_millis();
    // Aged 2 minutes and 20 seconds: bucket 2, never 1 or 3.
    meter.mark_at(time - (2 * MS_1_MIN + 20 * MS_1_SEC));
    // Aged 30 seconds: bucket 0.
    meter.mark_at(time - 30 * MS_1_SEC);

    let buckets = meter.events_per_minute_past_hour();
    assert_eq!(buckets.len(), 60);
    assert_eq!(buckets[0], 1);
    assert_eq!(buckets[1], 0);
    assert_eq!(buckets[2], 1);
    assert_eq!(buckets[3], 0);
}

#[test]
fn per_minute_histograms() {
    let meter = Meter::new();
    let time = now_millis();
    // Oldest to newest: for every hour (23-0) and minute (59-0), mark a
    // number of events equal to the minute index.
    for hours in (0..24).rev() {
        for minutes in (0..60).rev() {
            for _ in 0..minutes {
                meter.mark_at(time - (hours * MS_1_HR + minutes * MS_1_MIN + MS_1_SEC));
            }
        }
    }

    check_buckets(&meter.events_per_minute_past_hour(), 1);
    check_buckets(&meter.events_per_minute_past_4_hours(), 4);
    check_buckets(&meter.events_per_minute_past_24_hours(), 24);
    check_buckets(&meter.events_per_minute_past_hours(4).unwrap(), 4);
}

fn check_buckets(buckets: &[usize], hours: usize) {
    assert_eq!(buckets.len(), hours * 60);
    for (i, &count) in buckets.iter().enumerate() {
        // Events per minute equal the minute index within each hour block.
        assert_eq!(count, i % 60, "bucket {i}");
    }
}

#[test]
fn histogram_sums_stay_within_counts() {
    let meter = Meter::new();
    let time = now_millis();
    meter.mark_at(time - MS_1_HR * 2); // outside a 1-hour histogram
    meter.mark_at(time - MS_10_MIN);
    meter.mark_at(time - MS_10_SEC);

    let buckets = meter.events_per_minute_past_hours(1).unwrap();
    assert_eq!(buckets.len(), 60);
    let sum: usize = buckets.iter().sum();
    assert_eq!(sum, 2);
    assert!(sum <= meter.current_count());
    assert!(sum <= meter.total_count());
}

#[test]
fn zero_hours_is_rejected() {
    let meter = Meter::new();
    meter.mark();
    match meter.events_per_minute_past_hours(0) {
        Err(Error::InvalidHours(0)) => {}
        other => panic!("expected InvalidHours, got {other:?}"),
    }
}

#[tokio::test]
async fn auto_purge_lifecycle() {
    let mut meter = Meter::with_config(Config {
        enable_auto_purge: true,
    });
    meter.mark();
    assert_eq!(meter.total_count(), 1);
    assert_eq!(meter.current_count(), 1);

    // Stop must land promptly even though the first sweep is a day out.
    tokio::time::timeout(Duration::from_secs(5), meter.stop_auto_purge())
        .await
        .expect("purge task should stop promptly");
    // Idempotent.
    meter.stop_auto_purge().await;

    meter.mark();
    assert_eq!(meter.total_count(), 2);
}
