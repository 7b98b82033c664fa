//! Property-based tests for fiscal year rules.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use uuid::Uuid;

use super::year::{FiscalService, FiscalYear};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

/// Strategy for a date between 2000-01-01 and roughly 2080.
fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..29_000).prop_map(|offset| base().checked_add_days(Days::new(offset)).unwrap())
}

/// Strategy for a run of consecutive, non-overlapping yearly spans.
fn consecutive_years() -> impl Strategy<Value = Vec<FiscalYear>> {
    (any_date(), 1usize..8).prop_map(|(start, count)| {
        let mut years = Vec::with_capacity(count);
        let mut span_start = start;
        for _ in 0..count {
            let end = FiscalService::next_span(span_start.pred_opt().unwrap())
                .unwrap()
                .end;
            years.push(FiscalYear {
                id: Uuid::new_v4(),
                name: FiscalService::default_name(span_start),
                start_date: span_start,
                end_date: end,
                is_closed: true,
            });
            span_start = end.succ_opt().unwrap();
        }
        years
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The next span starts the day after `end` and never overlaps the previous year.
    #[test]
    fn prop_next_span_is_adjacent(end in any_date()) {
        let span = FiscalService::next_span(end).unwrap();
        prop_assert_eq!(span.start, end.succ_opt().unwrap());
        prop_assert!(span.end > span.start);
        prop_assert!(FiscalService::validate_range(span.start, span.end).is_ok());
    }

    /// Generated consecutive years never overlap each other.
    #[test]
    fn prop_consecutive_years_disjoint(years in consecutive_years()) {
        for pair in years.windows(2) {
            prop_assert!(pair[0].end_date < pair[1].start_date);
            prop_assert_eq!(pair[0].end_date.succ_opt().unwrap(), pair[1].start_date);
        }
    }

    /// The reopened neighbor is the closest earlier year, else the closest later one.
    #[test]
    fn prop_neighbor_selection(years in consecutive_years(), pick in any::<prop::sample::Index>()) {
        let position = pick.index(years.len());
        let deleted = &years[position];
        let chosen = FiscalService::nearest_neighbor(deleted, &years);

        let expected = if position > 0 {
            Some(years[position - 1].id)
        } else {
            years.get(1).map(|y| y.id)
        };
        prop_assert_eq!(chosen, expected);
    }

    /// `open_next` never proposes a start date that already exists.
    #[test]
    fn prop_open_next_never_duplicates(years in consecutive_years()) {
        let starts: Vec<NaiveDate> = years.iter().map(|y| y.start_date).collect();
        for (index, year) in years.iter().enumerate() {
            let planned = FiscalService::plan_open_next(year, &starts);
            if index + 1 < years.len() {
                prop_assert!(planned.is_err());
            } else {
                prop_assert!(!starts.contains(&planned.unwrap().start));
            }
        }
    }
}
