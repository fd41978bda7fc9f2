//! Property and vector tests for the lunar converter.
//!
//! The round-trip property runs over the entire supported range; the
//! literal vectors pin leap-month placement against reference dates.

use chrono::{Duration, NaiveDate};
use moonbell_core::lunar::{self, LunarDate};
use proptest::prelude::*;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap()
}

proptest! {
    // 54778 = days between the epoch and the last convertible day
    #[test]
    fn roundtrip_over_supported_range(offset in 0i64..=54778) {
        let date = epoch() + Duration::days(offset);
        let lunar_date = lunar::solar_to_lunar(date).unwrap();
        let back = lunar::lunar_to_solar(&lunar_date).unwrap();
        prop_assert_eq!(back, date);
    }

    #[test]
    fn conversion_is_pure(offset in 0i64..=54778) {
        let date = epoch() + Duration::days(offset);
        let first = lunar::solar_to_lunar(date).unwrap();
        let second = lunar::solar_to_lunar(date).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn reference_vectors() {
    // (lunar, expected solar)
    let vectors = [
        (LunarDate::new(1900, 1, 1, false), (1900, 1, 31)),
        (LunarDate::new(1984, 1, 1, false), (1984, 2, 2)),
        (LunarDate::new(2000, 1, 1, false), (2000, 2, 5)),
        (LunarDate::new(2024, 1, 1, false), (2024, 2, 10)),
        (LunarDate::new(2024, 8, 15, false), (2024, 9, 17)),
        (LunarDate::new(2025, 1, 1, false), (2025, 1, 29)),
        (LunarDate::new(2025, 3, 15, false), (2025, 4, 12)),
        (LunarDate::new(2026, 1, 1, false), (2026, 2, 17)),
        (LunarDate::new(2026, 3, 15, false), (2026, 5, 1)),
    ];
    for (lunar_date, (y, m, d)) in vectors {
        let expected = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(
            lunar::lunar_to_solar(&lunar_date).unwrap(),
            expected,
            "{lunar_date}"
        );
    }
}

#[test]
fn leap_month_vectors() {
    // years with an inserted leap month, against reference dates
    let vectors = [
        (LunarDate::new(2020, 4, 8, false), (2020, 4, 30)),
        (LunarDate::new(2020, 4, 8, true), (2020, 5, 30)),
        (LunarDate::new(2025, 6, 1, false), (2025, 6, 25)),
        (LunarDate::new(2025, 6, 1, true), (2025, 7, 25)),
        (LunarDate::new(2033, 11, 15, true), (2034, 1, 5)),
    ];
    for (lunar_date, (y, m, d)) in vectors {
        let expected = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(
            lunar::lunar_to_solar(&lunar_date).unwrap(),
            expected,
            "{lunar_date}"
        );
    }

    assert_eq!(lunar::leap_month(2020).unwrap(), Some(4));
    assert_eq!(lunar::leap_month(2024).unwrap(), None);
    assert_eq!(lunar::leap_month(2025).unwrap(), Some(6));
    assert_eq!(lunar::leap_month(2033).unwrap(), Some(11));
}

#[test]
fn solar_dates_inside_leap_months_tag_the_flag() {
    let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
    assert_eq!(
        lunar::solar_to_lunar(date).unwrap(),
        LunarDate::new(2025, 6, 13, true)
    );
}
