mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{calm, metric};
use parade_core::{
    CardBoard, EventType, RecordId, RiskDetails, RiskGauge, RiskTier, derive_suggestions,
    results::sort_by_time,
};
use proptest::prelude::*;

fn tier() -> impl Strategy<Value = RiskTier> {
    prop_oneof![Just(RiskTier::Low), Just(RiskTier::Medium), Just(RiskTier::High)]
}

fn event() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Parade),
        Just(EventType::Concert),
        Just(EventType::Picnic),
        Just(EventType::Wedding),
        Just(EventType::Sports),
        Just(EventType::Festival),
        Just(EventType::Birthday),
        "[a-z]{1,8}".prop_map(|tag| EventType::parse(&tag)),
    ]
}

fn details() -> impl Strategy<Value = RiskDetails> {
    (
        proptest::option::of((tier(), -20.0f64..45.0)),
        proptest::option::of((tier(), 0.0f64..40.0)),
        proptest::option::of((tier(), 0.0f64..30.0)),
        proptest::option::of((tier(), 0.0f64..100.0)),
    )
        .prop_map(|(t, p, w, h)| RiskDetails {
            temperature: t.and_then(|(r, v)| metric(r, v)),
            precipitation: p.and_then(|(r, v)| metric(r, v)),
            wind: w.and_then(|(r, v)| metric(r, v)),
            humidity: h.and_then(|(r, v)| metric(r, v)),
        })
}

proptest! {
    #[test]
    fn probability_tiers_follow_thresholds(p in 0.0f64..=100.0) {
        let gauge = RiskGauge::from_probability(p);
        prop_assert_eq!(gauge.tier == RiskTier::High, p > 70.0);
        prop_assert_eq!(gauge.tier == RiskTier::Medium, p > 40.0 && p <= 70.0);
        prop_assert_eq!(gauge.tier == RiskTier::Low, p <= 40.0);
    }

    #[test]
    fn label_percent_depends_only_on_tier(t in tier()) {
        let gauge = RiskGauge::from_label(Some(t.as_str()));
        prop_assert_eq!(gauge, RiskGauge::from_tier(t));
    }

    #[test]
    fn suggestions_are_never_empty_and_deterministic(d in details(), e in event()) {
        let first = derive_suggestions(&d, &e);
        prop_assert!(!first.is_empty());
        prop_assert_eq!(first, derive_suggestions(&d, &e));
    }

    #[test]
    fn at_most_one_card_expanded(clicks in proptest::collection::vec(0u32..6, 0..20)) {
        let base = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let ids: Vec<RecordId> = (0..6).map(|h| RecordId(base + Duration::hours(h))).collect();
        let mut board = CardBoard::default();

        for click in clicks {
            let id = ids[click as usize];
            let was_expanded = board.is_expanded(id);
            board.toggle(id);
            prop_assert_eq!(board.is_expanded(id), !was_expanded);
            prop_assert!(ids.iter().filter(|i| board.is_expanded(**i)).count() <= 1);
        }
    }

    #[test]
    fn sorting_is_ordered_and_idempotent(hours in proptest::sample::subsequence((0u32..24).collect::<Vec<_>>(), 0..24).prop_shuffle()) {
        let mut records: Vec<_> = hours.iter().map(|h| calm(*h)).collect();
        sort_by_time(&mut records);
        prop_assert!(records.windows(2).all(|w| w[0].time < w[1].time));

        let sorted = records.clone();
        sort_by_time(&mut records);
        prop_assert_eq!(records, sorted);
    }
}
