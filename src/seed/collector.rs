use super::hash_index::{HashIndex, Words};

/// One word hit of the query against the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawSeed {
    pub sequence_id: u16,
    /// 0-based start of the word in the database sequence
    pub database_position: usize,
    /// 0-based start of the word in the query
    pub query_position: usize,
}

impl RawSeed {
    /// `database_position - query_position`
    pub fn offset(&self) -> i64 {
        self.database_position as i64 - self.query_position as i64
    }
}

/// Look up every query word in the index and fan out one seed per recorded occurrence.
///
/// Every query position is examined regardless of the index's hashing policy;
/// words with non-ACGT symbols or absent from the index produce nothing.
pub fn collect_seeds(query: &[u8], index: &HashIndex) -> Vec<RawSeed> {
    let mut seeds = Vec::new();
    for (query_position, code) in Words::new(query, index.word_size()) {
        if let Some(occurrences) = index.lookup_hash(code) {
            seeds.extend(occurrences.iter().map(|occ| RawSeed {
                sequence_id: occ.sequence_id,
                database_position: occ.position as usize,
                query_position,
            }));
        }
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HashConfig, HashingPolicy};
    use crate::sequence::NamedSequence;

    fn index(seqs: &[&str], word_size: usize, policy: HashingPolicy) -> HashIndex {
        let db: Vec<NamedSequence> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| NamedSequence::new(format!("s{i}"), *s))
            .collect();
        let config = HashConfig {
            word_size,
            low_complexity_cutoff: None,
            policy,
        };
        HashIndex::build(&db, &config).unwrap()
    }

    #[test]
    fn test_collect_fans_out_occurrences() {
        let index = index(&["ACGTTTTTACGT", "GGGGACGT"], 4, HashingPolicy::Overlapping);
        let seeds = collect_seeds(b"ACGT", &index);
        assert_eq!(
            seeds,
            vec![
                RawSeed { sequence_id: 0, database_position: 0, query_position: 0 },
                RawSeed { sequence_id: 0, database_position: 8, query_position: 0 },
                RawSeed { sequence_id: 1, database_position: 4, query_position: 0 },
            ]
        );
    }

    #[test]
    fn test_query_scanned_at_every_position() {
        // Database words sampled every 4 bases, query probed at every base
        let index = index(&["CCCCACGTGGGG"], 4, HashingPolicy::NonOverlapping);
        let seeds = collect_seeds(b"TTACGTTT", &index);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].query_position, 2);
        assert_eq!(seeds[0].database_position, 4);
        assert_eq!(seeds[0].offset(), 2);
    }

    #[test]
    fn test_ambiguous_query_words_are_skipped() {
        let index = index(&["ACGTACGT"], 4, HashingPolicy::Overlapping);
        assert!(collect_seeds(b"ACNTACN", &index).is_empty());
    }
}
