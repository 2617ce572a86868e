//! Clear-order timelines
//!
//! A clear order lists, per calendar date, the members who cleared an
//! encounter for the first time on that date. Buckets are strictly
//! date-increasing and pairwise disjoint; their union is every member who
//! ever cleared.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::{Clear, MemberId};

/// Members whose first clear fell on `date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearOrderBucket {
    /// Calendar date (UTC)
    pub date: NaiveDate,

    /// New clearers on that date
    pub members: BTreeSet<MemberId>,
}

/// Build the date-bucketed clear order for the clears of one encounter name
///
/// Clears are walked in start-time order. A member's later clears are
/// ignored, so each member lands in exactly one bucket.
pub fn build_clear_order<'a, I>(clears: I) -> Vec<ClearOrderBucket>
where
    I: IntoIterator<Item = &'a Clear>,
{
    let mut sorted: Vec<&Clear> = clears.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });

    let mut seen: HashSet<MemberId> = HashSet::new();
    let mut buckets: Vec<ClearOrderBucket> = Vec::new();

    for clear in sorted {
        if !seen.insert(clear.member_id) {
            continue;
        }
        let date = clear.date();
        match buckets.last_mut() {
            Some(last) if last.date == date => {
                last.members.insert(clear.member_id);
            }
            _ => buckets.push(ClearOrderBucket {
                date,
                members: BTreeSet::from([clear.member_id]),
            }),
        }
    }

    buckets
}

/// Running total of clearers per bucket date, for charting
pub fn cumulative_clears(buckets: &[ClearOrderBucket]) -> Vec<(NaiveDate, usize)> {
    buckets
        .iter()
        .scan(0usize, |total, bucket| {
            *total += bucket.members.len();
            Some((bucket.date, *total))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EncounterId, Job};
    use chrono::{Duration, TimeZone, Utc};

    fn clear_at(member: u64, day: u32, hour: u32) -> Clear {
        Clear {
            member_id: MemberId(member),
            encounter_id: EncounterId::from("P12S"),
            start_time: Utc.with_ymd_and_hms(2023, 7, day, hour, 0, 0).unwrap(),
            report_id: format!("r{}-{}", day, hour),
            report_fight_id: 1,
            job: Job("PLD".into()),
            locked_in: false,
        }
    }

    #[test]
    fn test_same_day_clears_share_bucket() {
        let clears = vec![clear_at(1, 3, 20), clear_at(2, 3, 21), clear_at(3, 4, 1)];
        let order = build_clear_order(&clears);
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].members, BTreeSet::from([MemberId(1), MemberId(2)]));
        assert_eq!(order[1].members, BTreeSet::from([MemberId(3)]));
    }

    #[test]
    fn test_repeat_clears_do_not_reappear() {
        let clears = vec![clear_at(1, 3, 20), clear_at(1, 5, 20), clear_at(2, 5, 21)];
        let order = build_clear_order(&clears);
        assert_eq!(order.len(), 2);
        assert_eq!(order[1].date, NaiveDate::from_ymd_opt(2023, 7, 5).unwrap());
        assert_eq!(order[1].members, BTreeSet::from([MemberId(2)]));
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let clears = vec![clear_at(2, 9, 1), clear_at(1, 2, 1)];
        let order = build_clear_order(&clears);
        assert_eq!(order[0].members, BTreeSet::from([MemberId(1)]));
        assert!(order[0].date < order[1].date);
    }

    #[test]
    fn test_cumulative_clears() {
        let clears = vec![clear_at(1, 3, 1), clear_at(2, 3, 2), clear_at(3, 6, 1)];
        let order = build_clear_order(&clears);
        let totals: Vec<usize> = cumulative_clears(&order).into_iter().map(|(_, n)| n).collect();
        assert_eq!(totals, vec![2, 3]);
    }

    #[test]
    fn test_empty_input() {
        let order = build_clear_order(std::iter::empty());
        assert!(order.is_empty());
        assert!(cumulative_clears(&order).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Buckets are disjoint, date-increasing, and cover every clearer
            #[test]
            fn test_buckets_partition_clearers(
                raw in proptest::collection::vec((0u64..20, 0i64..(30 * 24 * 60)), 0..80)
            ) {
                let base = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
                let clears: Vec<Clear> = raw
                    .iter()
                    .enumerate()
                    .map(|(i, (member, minutes))| Clear {
                        member_id: MemberId(*member),
                        encounter_id: EncounterId::from("P9S"),
                        start_time: base + Duration::minutes(*minutes),
                        report_id: format!("r{}", i),
                        report_fight_id: i as u32,
                        job: Job("SGE".into()),
                        locked_in: false,
                    })
                    .collect();

                let order = build_clear_order(&clears);

                let mut union: BTreeSet<MemberId> = BTreeSet::new();
                let mut total = 0usize;
                for bucket in &order {
                    total += bucket.members.len();
                    union.extend(bucket.members.iter().copied());
                }
                let expected: BTreeSet<MemberId> = clears.iter().map(|c| c.member_id).collect();

                prop_assert_eq!(total, union.len());
                prop_assert_eq!(union, expected);
                for pair in order.windows(2) {
                    prop_assert!(pair[0].date < pair[1].date);
                }
            }
        }
    }
}
