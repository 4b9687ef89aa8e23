use crate::{PATTERN_SPACE, Pattern, Word};
use std::collections::HashMap;

/// Candidates grouped by the pattern they would produce against one guess.
///
/// Every candidate lands in exactly one partition and keeps its relative
/// order inside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionMap {
    partitions: HashMap<Pattern, Vec<Word>>,
    total: usize,
}

impl PartitionMap {
    /// Answers that produce `pattern`, if any do.
    pub fn get(&self, pattern: Pattern) -> Option<&[Word]> {
        self.partitions.get(&pattern).map(Vec::as_slice)
    }

    /// Number of non-empty partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// True when there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Number of candidates that were partitioned.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Non-empty partitions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Pattern, &[Word])> {
        self.partitions
            .iter()
            .map(|(pattern, words)| (*pattern, words.as_slice()))
    }

    /// Partitions ordered by pattern, largest pattern code first, for callers
    /// that need a deterministic walk.
    pub fn sorted(&self) -> Vec<(Pattern, &[Word])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries
    }

    /// Consumes the map, returning the raw pattern buckets.
    pub fn into_inner(self) -> HashMap<Pattern, Vec<Word>> {
        self.partitions
    }
}

/// Groups `candidates` by their response to `guess`. The guess does not have
/// to be one of the candidates.
pub fn partition(guess: Word, candidates: &[Word]) -> PartitionMap {
    let mut partitions: HashMap<Pattern, Vec<Word>> = HashMap::new();
    for &candidate in candidates {
        partitions
            .entry(Pattern::compute(guess, candidate))
            .or_default()
            .push(candidate);
    }
    PartitionMap {
        partitions,
        total: candidates.len(),
    }
}

/// Counts candidates per pattern code without materializing the partitions.
pub fn partition_sizes(guess: Word, candidates: &[Word]) -> [usize; PATTERN_SPACE] {
    let mut counts = [0usize; PATTERN_SPACE];
    for &candidate in candidates {
        counts[Pattern::compute(guess, candidate).index()] += 1;
    }
    counts
}

/// Keeps the candidates that would answer `guess` with exactly `pattern`.
pub fn filter_candidates(guess: Word, pattern: Pattern, candidates: &[Word]) -> Vec<Word> {
    candidates
        .iter()
        .copied()
        .filter(|&candidate| Pattern::compute(guess, candidate) == pattern)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;
    use proptest::prelude::*;

    #[test]
    fn crane_is_alone_in_the_all_green_partition() {
        let candidates = words(["crane", "crate", "craze", "grace"]).unwrap();
        let crane = candidates[0];
        let map = partition(crane, &candidates);

        assert_eq!(map.get(Pattern::ALL_GREEN), Some(&[crane][..]));
        for (pattern, members) in map.iter() {
            if pattern != Pattern::ALL_GREEN {
                assert!(!members.contains(&crane));
            }
        }
        assert_eq!(map.total(), 4);
    }

    #[test]
    fn keeps_candidate_order_within_partitions() {
        let candidates = words(["zzzzz", "yyyyy", "xxxxx"]).unwrap();
        let guess = Word::new("abcde").unwrap();
        let map = partition(guess, &candidates);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(Pattern::ALL_GRAY), Some(candidates.as_slice()));
    }

    #[test]
    fn filters_by_response() {
        let candidates = words(["crane", "crate", "craze", "grace", "slate"]).unwrap();
        let guess = Word::new("crane").unwrap();
        let pattern: Pattern = "GGGXG".parse().unwrap();
        let remaining = filter_candidates(guess, pattern, &candidates);
        assert_eq!(remaining, words(["crate", "craze"]).unwrap());
    }

    #[test]
    fn sizes_agree_with_partitions() {
        let candidates = words(["crane", "crate", "craze", "grace", "slate"]).unwrap();
        let guess = Word::new("trace").unwrap();
        let sizes = partition_sizes(guess, &candidates);
        for (pattern, members) in partition(guess, &candidates).iter() {
            assert_eq!(sizes[pattern.index()], members.len());
        }
        assert_eq!(sizes.iter().sum::<usize>(), candidates.len());
    }

    proptest! {
        #[test]
        fn partitions_cover_every_candidate_once(
            guess in "[a-f]{5}",
            raw in prop::collection::vec("[a-f]{5}", 1..40),
        ) {
            let guess = Word::new(&guess).unwrap();
            let candidates = words(raw.iter().map(String::as_str)).unwrap();
            let map = partition(guess, &candidates);
            let sum: usize = map.iter().map(|(_, members)| members.len()).sum();
            prop_assert_eq!(sum, candidates.len());
            for (pattern, members) in map.iter() {
                for &member in members {
                    prop_assert_eq!(Pattern::compute(guess, member), pattern);
                }
            }
        }
    }
}
