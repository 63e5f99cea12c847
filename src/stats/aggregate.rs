//! Generic aggregation primitives
//!
//! All reductions keep their accumulators as local fold state so handlers
//! stay reentrant under concurrent requests.

use std::collections::BTreeMap;

use crate::stats::round2;

/// Result of a tie-aware maximum scan
#[derive(Debug)]
pub struct MaxWithTies<'a, T> {
    /// Highest finite extracted value, or `-inf` when no record had one
    pub best: f64,
    /// Every record whose extracted value equals `best`
    pub winners: Vec<&'a T>,
}

/// Scan `items` with `extract`, tracking the running maximum and every
/// item tied at it. Items with a non-finite extracted value are skipped
/// entirely. Ties require exact equality on the recomputed value.
pub fn max_with_ties<'a, T, F>(items: &'a [T], extract: F) -> MaxWithTies<'a, T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut best = f64::NEG_INFINITY;
    let mut winners: Vec<&T> = Vec::new();

    for item in items {
        let Some(v) = extract(item).filter(|v| v.is_finite()) else {
            continue;
        };
        if v > best {
            best = v;
            winners.clear();
            winners.push(item);
        } else if v == best {
            winners.push(item);
        }
    }

    MaxWithTies { best, winners }
}

/// Median of a sequence of finite numbers; `None` when empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Per-group average produced by [`group_averages`]
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAverage {
    pub key: String,
    pub average: f64,
    pub count: usize,
}

/// Group `items` by `key` and average `value` per group, skipping items
/// with a non-finite value. Groups come back sorted descending by their
/// rounded average, since that is what the output layer compares.
pub fn group_averages<T, K, V>(items: &[T], key: K, value: V) -> Vec<GroupAverage>
where
    K: Fn(&T) -> String,
    V: Fn(&T) -> Option<f64>,
{
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for item in items {
        let Some(v) = value(item).filter(|v| v.is_finite()) else {
            continue;
        };
        let entry = sums.entry(key(item)).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    let mut groups: Vec<GroupAverage> = sums
        .into_iter()
        .map(|(key, (sum, count))| GroupAverage {
            key,
            average: sum / count as f64,
            count,
        })
        .collect();

    groups.sort_by(|a, b| round2(b.average).total_cmp(&round2(a.average)));
    groups
}

/// Leading groups tied at the maximum average, compared on the
/// rounded-to-2-decimals value
pub fn tied_leaders(groups: &[GroupAverage]) -> Vec<&GroupAverage> {
    let Some(first) = groups.first() else {
        return Vec::new();
    };
    let best = round2(first.average);

    groups
        .iter()
        .take_while(|g| round2(g.average) == best)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_empty_is_none() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[6.0, 4.0]), Some(5.0));
        assert_eq!(median(&[9.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn max_with_ties_collects_every_winner() {
        let values = [10.0, 15.0, 15.0, 7.0];
        let top = max_with_ties(&values, |v| Some(*v));
        assert_eq!(top.best, 15.0);
        assert_eq!(top.winners.len(), 2);
        assert!(top.winners.iter().all(|v| **v == 15.0));
    }

    #[test]
    fn max_with_ties_skips_unusable_values() {
        let values = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        let top = max_with_ties(&values, |v| Some(*v));
        assert_eq!(top.best, f64::NEG_INFINITY);
        assert!(top.winners.is_empty());

        let top = max_with_ties::<f64, _>(&[], |v| Some(*v));
        assert!(top.winners.is_empty());
    }

    #[test]
    fn group_averages_sorts_descending_with_counts() {
        let items = [("A", 10.0), ("A", 20.0), ("B", 30.0)];
        let groups = group_averages(&items, |(g, _)| g.to_string(), |(_, v)| Some(*v));

        assert_eq!(
            groups,
            vec![
                GroupAverage {
                    key: "B".to_string(),
                    average: 30.0,
                    count: 1
                },
                GroupAverage {
                    key: "A".to_string(),
                    average: 15.0,
                    count: 2
                },
            ]
        );

        let winners = tied_leaders(&groups);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].key, "B");
    }

    #[test]
    fn group_averages_skips_unusable_values() {
        let items = [("A", f64::NAN), ("B", 30.0)];
        let groups = group_averages(&items, |(g, _)| g.to_string(), |(_, v)| Some(*v));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "B");
    }

    #[test]
    fn tied_leaders_compare_on_rounded_values() {
        let groups = vec![
            GroupAverage {
                key: "A".to_string(),
                average: 10.004,
                count: 1,
            },
            GroupAverage {
                key: "B".to_string(),
                average: 10.001,
                count: 1,
            },
            GroupAverage {
                key: "C".to_string(),
                average: 9.0,
                count: 1,
            },
        ];
        let winners = tied_leaders(&groups);
        assert_eq!(winners.len(), 2);
        assert!(tied_leaders(&[]).is_empty());
    }

    #[test]
    fn round2_rounds_at_two_decimals() {
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(2.346), 2.35);
        assert_eq!(round2(17.5), 17.5);
    }
}
