//! Capacity eviction policy shared by all levels

/// Entries to drop so a level of `len` entries fits `capacity`
///
/// Candidates are `(key, recency, expired)`; smaller recency means less
/// recently used. Expired entries go first. If the level is still over
/// capacity, the least recently used entries are dropped in a batch of at
/// least `batch` so the next few inserts do not trigger another pass.
pub fn select_victims<K: Clone, R: Ord + Copy>(
    candidates: &[(K, R, bool)],
    capacity: usize,
    batch: usize,
) -> Vec<K> {
    let len = candidates.len();

    if len <= capacity {
        return Vec::new();
    }

    let mut victims: Vec<K> = candidates
        .iter()
        .filter(|(_, _, expired)| *expired)
        .map(|(key, _, _)| key.clone())
        .collect();

    let remaining = len - victims.len();

    if remaining > capacity {
        let excess = (remaining - capacity).max(batch).min(remaining);

        let mut live: Vec<&(K, R, bool)> =
            candidates.iter().filter(|(_, _, expired)| !*expired).collect();
        live.sort_by_key(|(_, last_used, _)| *last_used);

        victims.extend(live.into_iter().take(excess).map(|(key, _, _)| key.clone()));
    }

    victims
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(offset_secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(offset_secs)
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let candidates = vec![("a", at(1), false), ("b", at(2), true)];
        assert!(select_victims(&candidates, 2, 1).is_empty());
    }

    #[test]
    fn test_expired_first() {
        let candidates = vec![("a", at(1), false), ("b", at(5), true), ("c", at(3), false)];

        assert_eq!(select_victims(&candidates, 2, 1), vec!["b"]);
    }

    #[test]
    fn test_least_recently_used_batch() {
        let candidates = vec![
            ("a", at(4), false),
            ("b", at(1), false),
            ("c", at(3), false),
            ("d", at(2), false),
            ("e", at(5), false),
        ];

        assert_eq!(select_victims(&candidates, 4, 2), vec!["b", "d"]);
    }

    #[test]
    fn test_batch_never_empties_beyond_len() {
        let candidates = vec![("a", at(1), false), ("b", at(2), false)];

        assert_eq!(select_victims(&candidates, 1, 10), vec!["a", "b"]);
    }
}
