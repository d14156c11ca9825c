//! Temporal extent normalization tests.

use chrono::{NaiveDate, TimeZone, Utc};
use ogc_common::time::{
    day_range, day_ranges, noon_ms, parse_layer_days, parse_temporal_extent,
    parse_temporal_extent_detailed, union_days,
};

fn noon(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp_millis()
}

fn is_noon_anchored(ms: i64) -> bool {
    ms.rem_euclid(86_400_000) == 43_200_000
}

// ============================================================================
// Explicit lists
// ============================================================================

#[test]
fn test_explicit_list_is_noon_anchored() {
    let days = parse_temporal_extent("2012-10-31,2014-01-05T00:00:00.000Z,2016-12-01T23:59:59Z");
    assert_eq!(
        days,
        vec![noon(2012, 10, 31), noon(2014, 1, 5), noon(2016, 12, 1)]
    );
    assert!(days.iter().all(|d| is_noon_anchored(*d)));
}

#[test]
fn test_explicit_list_sorted_and_deduplicated() {
    let days = parse_temporal_extent("2020-03-01, 2020-01-01T12:00:00Z, 2020-01-01, 2020-02-01");
    assert_eq!(
        days,
        vec![noon(2020, 1, 1), noon(2020, 2, 1), noon(2020, 3, 1)]
    );
}

#[test]
fn test_unparseable_fragments_are_skipped() {
    let parsed = parse_temporal_extent_detailed("2020-01-01,not-a-date,2020-01-03");
    assert_eq!(parsed.days, vec![noon(2020, 1, 1), noon(2020, 1, 3)]);
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].fragment, "not-a-date");
}

#[test]
fn test_empty_extent() {
    assert!(parse_temporal_extent("").is_empty());
    assert!(parse_temporal_extent(" , ,").is_empty());
}

// ============================================================================
// Intervals
// ============================================================================

#[test]
fn test_interval_ten_day_period() {
    let days = parse_temporal_extent("2019-05-21/2020-02-25/P10D");
    assert_eq!(days.len(), 29);
    assert_eq!(days[0], noon(2019, 5, 21));
    assert_eq!(days[1], noon(2019, 5, 31));
    assert_eq!(*days.last().unwrap(), noon(2020, 2, 25));
    assert!(days.iter().all(|d| is_noon_anchored(*d)));
}

#[test]
fn test_interval_end_not_on_step() {
    let days = parse_temporal_extent("2019-05-21/2020-10-01/P10D");
    assert_eq!(days.len(), 50);
    assert!(*days.last().unwrap() <= noon(2020, 10, 1));
}

#[test]
fn test_interval_with_times_and_zones() {
    let days = parse_temporal_extent("2020-01-01T00:00:00.000Z/2020-01-03T00:00:00.000Z/P1D");
    assert_eq!(days, vec![noon(2020, 1, 1), noon(2020, 1, 2), noon(2020, 1, 3)]);
}

#[test]
fn test_monthly_period_clamps_without_drift() {
    let days = parse_temporal_extent("2020-01-31/2020-05-31/P1M");
    assert_eq!(
        days,
        vec![
            noon(2020, 1, 31),
            noon(2020, 2, 29),
            noon(2020, 3, 31),
            noon(2020, 4, 30),
            noon(2020, 5, 31),
        ]
    );
}

#[test]
fn test_yearly_period() {
    let days = parse_temporal_extent("2000-06-15/2003-06-15/P1Y");
    assert_eq!(days.len(), 4);
    assert_eq!(days[3], noon(2003, 6, 15));
}

#[test]
fn test_sub_day_period_collapses_to_days() {
    let days = parse_temporal_extent("2020-01-01T00:00:00Z/2020-01-02T18:00:00Z/PT6H");
    assert_eq!(days, vec![noon(2020, 1, 1), noon(2020, 1, 2)]);
}

#[test]
fn test_interval_without_period_yields_endpoints() {
    let days = parse_temporal_extent("2020-01-01/2020-12-31");
    assert_eq!(days, vec![noon(2020, 1, 1), noon(2020, 12, 31)]);
}

#[test]
fn test_reversed_interval_is_skipped() {
    let parsed = parse_temporal_extent_detailed("2021-01-01/2020-01-01/P1D,2020-06-01");
    assert_eq!(parsed.days, vec![noon(2020, 6, 1)]);
    assert_eq!(parsed.errors.len(), 1);
}

#[test]
fn test_invalid_period_is_skipped() {
    let parsed = parse_temporal_extent_detailed("2020-01-01/2020-02-01/10 days");
    assert!(parsed.days.is_empty());
    assert_eq!(parsed.errors.len(), 1);
}

// ============================================================================
// Mixed extents
// ============================================================================

#[test]
fn test_mixed_list_and_interval_union() {
    let days = parse_temporal_extent("2020-01-05,2020-01-01/2020-01-03/P1D,2020-01-02");
    assert_eq!(
        days,
        vec![
            noon(2020, 1, 1),
            noon(2020, 1, 2),
            noon(2020, 1, 3),
            noon(2020, 1, 5),
        ]
    );
}

#[test]
fn test_parse_layer_days_fragments() {
    let fragments = vec!["2020-01-01", "2020-01-10/2020-01-30/P10D"];
    assert_eq!(
        parse_layer_days(&fragments),
        vec![noon(2020, 1, 1), noon(2020, 1, 10), noon(2020, 1, 20), noon(2020, 1, 30)]
    );
}

// ============================================================================
// Day list helpers
// ============================================================================

#[test]
fn test_union_days() {
    assert_eq!(union_days(&[3, 1], &[2, 3]), vec![1, 2, 3]);
}

#[test]
fn test_noon_ms() {
    let date = NaiveDate::from_ymd_opt(2012, 10, 31).unwrap();
    assert_eq!(noon_ms(date), 1351684800000);
}

#[test]
fn test_day_range_and_runs() {
    let days = vec![noon(2020, 1, 1), noon(2020, 1, 2), noon(2020, 1, 10), noon(2020, 1, 11)];
    let range = day_range(&days).unwrap();
    assert_eq!(range.start.timestamp_millis(), noon(2020, 1, 1));
    assert_eq!(range.end.timestamp_millis(), noon(2020, 1, 11));

    let runs = day_ranges(&days, 1);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].start.timestamp_millis(), noon(2020, 1, 10));

    assert!(day_range(&[]).is_none());
}
