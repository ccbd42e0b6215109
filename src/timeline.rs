use std::collections::BTreeMap;

use tracing::debug;

use crate::error::EngineError;
use crate::models::TimelinePoint;
use crate::month;

// Walks one calendar month at a time from the campaign's first observed
// month, emitting exactly `horizon` points. Months absent from
// `month_counts` become zero-count placeholders; the data pointer only
// advances on a match, so a gap never skips real data.
pub fn build_timeline(
    month_counts: &BTreeMap<String, u64>,
    month_key_lookup: &BTreeMap<String, String>,
    start_sequence_number: &str,
    horizon: usize,
) -> Result<Vec<TimelinePoint>, EngineError> {
    let mut cursor = month::parse_sequence(start_sequence_number)?;
    let series: Vec<(&String, &u64)> = month_counts.iter().collect();
    let mut pointer = 0usize;
    let mut points = Vec::with_capacity(horizon);

    for step in 0..horizon {
        let mut matched = false;
        if let Some((sequence_number, count)) = series.get(pointer).copied() {
            let data = month::parse_sequence(sequence_number).map_err(|source| {
                EngineError::TimelineStep {
                    step,
                    source: Box::new(source),
                }
            })?;
            if data == cursor {
                let label = month_key_lookup
                    .get(sequence_number)
                    .cloned()
                    .unwrap_or_else(|| cursor.label());
                points.push(TimelinePoint {
                    month_key: label,
                    editors_count: *count,
                });
                pointer += 1;
                matched = true;
            }
        }
        if !matched {
            debug!(month = %cursor.label(), "no activity for month, emitting zero count");
            points.push(TimelinePoint {
                month_key: cursor.label(),
                editors_count: 0,
            });
        }
        cursor.advance();
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, &str, u64)]) -> (BTreeMap<String, u64>, BTreeMap<String, String>) {
        let mut counts = BTreeMap::new();
        let mut lookup = BTreeMap::new();
        for (sequence_number, month_key, count) in entries {
            counts.insert(sequence_number.to_string(), *count);
            lookup.insert(sequence_number.to_string(), month_key.to_string());
        }
        (counts, lookup)
    }

    fn labels(points: &[TimelinePoint]) -> Vec<&str> {
        points.iter().map(|point| point.month_key.as_str()).collect()
    }

    fn counts(points: &[TimelinePoint]) -> Vec<u64> {
        points.iter().map(|point| point.editors_count).collect()
    }

    #[test]
    fn emits_exactly_horizon_points() {
        let (month_counts, lookup) = series(&[("2021-09", "September-2021", 4)]);
        for horizon in [1, 3, 9, 24] {
            let points =
                build_timeline(&month_counts, &lookup, "2021-09", horizon).expect("valid walk");
            assert_eq!(points.len(), horizon);
        }
    }

    #[test]
    fn empty_series_zero_fills_from_the_anchor() {
        let month_counts = BTreeMap::new();
        let lookup = BTreeMap::new();
        let points = build_timeline(&month_counts, &lookup, "2021-09", 4).expect("valid walk");
        assert_eq!(
            labels(&points),
            vec!["September-2021", "October-2021", "November-2021", "December-2021"]
        );
        assert_eq!(counts(&points), vec![0, 0, 0, 0]);
    }

    #[test]
    fn rollover_spans_the_calendar_year() {
        let (month_counts, lookup) = series(&[("2021-11", "November-2021", 7)]);
        let points = build_timeline(&month_counts, &lookup, "2021-11", 4).expect("valid walk");
        assert_eq!(
            labels(&points),
            vec!["November-2021", "December-2021", "January-2022", "February-2022"]
        );
    }

    #[test]
    fn december_anchor_finds_january_data() {
        let (month_counts, lookup) = series(&[("2022-01", "January-2022", 5)]);
        let points = build_timeline(&month_counts, &lookup, "2021-12", 3).expect("valid walk");
        assert_eq!(
            labels(&points),
            vec!["December-2021", "January-2022", "February-2022"]
        );
        assert_eq!(counts(&points), vec![0, 5, 0]);
    }

    #[test]
    fn gaps_inside_the_series_do_not_skip_data() {
        let (month_counts, lookup) = series(&[
            ("2021-09", "September-2021", 10),
            ("2021-12", "December-2021", 3),
            ("2022-02", "February-2022", 1),
        ]);
        let points = build_timeline(&month_counts, &lookup, "2021-09", 6).expect("valid walk");
        assert_eq!(
            labels(&points),
            vec![
                "September-2021",
                "October-2021",
                "November-2021",
                "December-2021",
                "January-2022",
                "February-2022"
            ]
        );
        assert_eq!(counts(&points), vec![10, 0, 0, 3, 0, 1]);
    }

    #[test]
    fn exhausted_series_keeps_zero_filling() {
        let (month_counts, lookup) = series(&[("2021-09", "September-2021", 2)]);
        let points = build_timeline(&month_counts, &lookup, "2021-09", 3).expect("valid walk");
        assert_eq!(counts(&points), vec![2, 0, 0]);
    }

    #[test]
    fn walk_is_deterministic() {
        let (month_counts, lookup) = series(&[
            ("2021-09", "September-2021", 10),
            ("2021-10", "October-2021", 6),
        ]);
        let first = build_timeline(&month_counts, &lookup, "2021-09", 9).expect("valid walk");
        let second = build_timeline(&month_counts, &lookup, "2021-09", 9).expect("valid walk");
        assert_eq!(first, second);
    }

    #[test]
    fn raw_events_walk_end_to_end() {
        use crate::aggregate;
        use crate::dedup;
        use crate::models::ActivityRecord;

        let event = |user_id: &str, sequence_number: &str, month_key: &str| ActivityRecord {
            user_id: user_id.to_string(),
            campaign: "Wiki Loves Monuments".to_string(),
            cohort_year: 2021,
            month_key: month_key.to_string(),
            sequence_number: sequence_number.to_string(),
            project: "commonswiki".to_string(),
            country: "Germany".to_string(),
            iso_code: "DE".to_string(),
        };

        let records = vec![
            event("A", "2021-09", "September-2021"),
            event("A", "2021-09", "September-2021"),
            event("B", "2021-09", "September-2021"),
            event("B", "2021-11", "November-2021"),
        ];

        let participation = dedup::deduplicate(&records);
        let month_counts = aggregate::by_month(&participation, None);
        let lookup = dedup::month_key_index(&participation);
        let points = build_timeline(&month_counts, &lookup, "2021-09", 4).expect("valid walk");

        assert_eq!(
            labels(&points),
            vec!["September-2021", "October-2021", "November-2021", "December-2021"]
        );
        assert_eq!(counts(&points), vec![2, 0, 1, 0]);
    }

    #[test]
    fn malformed_anchor_is_rejected() {
        let month_counts = BTreeMap::new();
        let lookup = BTreeMap::new();
        let err = build_timeline(&month_counts, &lookup, "2021-9", 3).expect_err("bad anchor");
        assert!(matches!(err, EngineError::MalformedSequence { .. }));
    }

    #[test]
    fn malformed_data_token_reports_the_failing_step() {
        let mut month_counts = BTreeMap::new();
        let lookup = BTreeMap::new();
        month_counts.insert("2021-9".to_string(), 4);
        let err = build_timeline(&month_counts, &lookup, "2021-09", 3).expect_err("bad token");
        match err {
            EngineError::TimelineStep { step, source } => {
                assert_eq!(step, 0);
                assert!(matches!(*source, EngineError::MalformedSequence { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
