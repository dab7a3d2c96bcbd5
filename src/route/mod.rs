use crate::record::Keyed;
use crate::util::{ConfigError, Result, RouteError};

const RADIX: u32 = 36;

/// Maps a record key to the index of the shard owning it.
///
/// The key is read as a base-36 integer and reduced modulo `shard_count`.
/// The digit fold keeps that exact for keys of any length rather than
/// overflowing on long ones.
///
/// Known bias: keys that are small base-36 numerals land on low indices
/// ("7" always routes to `7 % shard_count`), so sequential numeric key
/// spaces do not spread uniformly. Callers that need uniform placement
/// should hash their keys before assignment.
pub fn shard_index(key: &str, shard_count: usize) -> Result<usize> {
    if shard_count == 0 {
        return Err(ConfigError::ShardCount.into());
    }
    if key.is_empty() {
        return Err(RouteError::MissingKey.into());
    }
    let modulus = shard_count as u128;
    let mut acc: u128 = 0;
    for c in key.chars() {
        let digit = c
            .to_digit(RADIX)
            .ok_or_else(|| RouteError::InvalidKey(key.to_owned()))?;
        acc = (acc * RADIX as u128 + digit as u128) % modulus;
    }
    Ok(acc as usize)
}

/// Groups records by owning shard. Groups come back in ascending shard
/// order, empty shards are dropped, and input order is preserved inside
/// each group. The first unroutable record fails the whole call before
/// any group is produced.
pub fn partition<R: Keyed>(records: Vec<R>, shard_count: usize) -> Result<Vec<Vec<R>>> {
    let groups = partition_indexed(records, shard_count)?;
    Ok(groups.into_iter().map(|(_, group)| group).collect())
}

/// Same as [`partition`] but keeps each group's shard index, which the
/// batch dispatcher needs to resolve table handles.
pub(crate) fn partition_indexed<R: Keyed>(
    records: Vec<R>,
    shard_count: usize,
) -> Result<Vec<(usize, Vec<R>)>> {
    let mut buckets: Vec<Vec<R>> = Vec::new();
    buckets.resize_with(shard_count, Vec::new);
    for record in records {
        let key = record.key().ok_or(RouteError::MissingKey)?;
        let index = shard_index(key, shard_count)?;
        buckets[index].push(record);
    }
    Ok(buckets
        .into_iter()
        .enumerate()
        .filter(|(_, bucket)| !bucket.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::TestItem;
    use crate::util::Error;

    #[test]
    fn test_index_deterministic_and_in_range() {
        for n in 1..=17 {
            for key in ["0", "1", "2", "3", "a", "z", "zz9", "deadbeef", "30239a14"] {
                let index = shard_index(key, n).unwrap();
                assert!(index < n);
                assert_eq!(index, shard_index(key, n).unwrap());
            }
        }
    }

    #[test]
    fn test_index_is_base36_value_mod_count() {
        assert_eq!(shard_index("1", 3).unwrap(), 1);
        assert_eq!(shard_index("2", 3).unwrap(), 2);
        assert_eq!(shard_index("3", 3).unwrap(), 0);
        // "10" is 36 in base 36, "zz" is 36 * 36 - 1.
        assert_eq!(shard_index("10", 5).unwrap(), 36 % 5);
        assert_eq!(shard_index("zz", 7).unwrap(), 1295 % 7);
    }

    #[test]
    fn test_index_ignores_letter_case() {
        for n in [2, 3, 7, 16] {
            assert_eq!(shard_index("a1f", n).unwrap(), shard_index("A1F", n).unwrap());
        }
    }

    #[test]
    fn test_long_keys_do_not_overflow() {
        let key = "z".repeat(64);
        assert!(shard_index(&key, 11).unwrap() < 11);
    }

    #[test]
    fn test_empty_and_invalid_keys() {
        assert_eq!(
            shard_index("", 3).unwrap_err(),
            Error::Route(RouteError::MissingKey)
        );
        assert_eq!(
            shard_index("no-dashes", 3).unwrap_err(),
            Error::Route(RouteError::InvalidKey("no-dashes".to_owned()))
        );
        assert_eq!(
            shard_index("1", 0).unwrap_err(),
            Error::Config(ConfigError::ShardCount)
        );
    }

    #[test]
    fn test_partition_groups_in_ascending_shard_order() {
        let records = vec![
            TestItem::new("1", "one"),
            TestItem::new("2", "two"),
            TestItem::new("3", "three"),
        ];
        let groups = partition(records, 3).unwrap();
        // key "3" owns shard 0, "1" shard 1, "2" shard 2.
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0][0].key(), Some("3"));
        assert_eq!(groups[1][0].key(), Some("1"));
        assert_eq!(groups[2][0].key(), Some("2"));
    }

    #[test]
    fn test_partition_is_stable_and_drops_empty_groups() {
        let records: Vec<TestItem> = (0..10)
            .map(|i| TestItem::new(&i.to_string(), "x"))
            .collect();
        let groups = partition_indexed(records, 3).unwrap();
        let sizes: Vec<usize> = groups.iter().map(|(_, g)| g.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        for (index, group) in &groups {
            let mut last = None;
            for record in group {
                let value: usize = record.key().unwrap().parse().unwrap();
                assert_eq!(value % 3, *index);
                if let Some(prev) = last {
                    assert!(prev < value);
                }
                last = Some(value);
            }
        }
        let single = partition(vec![TestItem::new("1", "only")], 3).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].len(), 1);
    }

    #[test]
    fn test_partition_fails_fast_on_missing_key() {
        let records = vec![TestItem::new("1", "ok"), TestItem::keyless("nope")];
        assert_eq!(
            partition(records, 3).unwrap_err(),
            Error::Route(RouteError::MissingKey)
        );
    }
}
