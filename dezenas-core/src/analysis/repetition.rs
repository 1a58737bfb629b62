use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::combinatorics::{Fingerprint, subset_fingerprints};
use crate::models::{Game, Variant, group_name};

/// A group of numbers found in more than one user game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedSubset {
    pub numbers: Vec<u8>,
    pub count: usize,
}

impl RepeatedSubset {
    /// "03, 07"
    pub fn label(&self) -> String {
        Fingerprint::from_numbers(&self.numbers).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepetitionSummary {
    pub size: usize,
    pub name: &'static str,
    /// Distinct subsets of `size` numbers appearing in two or more games.
    pub distinct_repeated: usize,
    /// Filled only when the listing was requested.
    pub subsets: Vec<RepeatedSubset>,
}

/// Occurrences of every `size`-subset across the games.
pub fn subset_counts(games: &[Game], size: usize) -> FxHashMap<Fingerprint, usize> {
    let mut counts: FxHashMap<Fingerprint, usize> = FxHashMap::default();
    for game in games {
        for print in subset_fingerprints(game.numbers(), size) {
            *counts.entry(print).or_insert(0) += 1;
        }
    }
    counts
}

pub fn repetition_summary(games: &[Game], size: usize, list: bool) -> RepetitionSummary {
    let counts = subset_counts(games, size);
    let mut repeated: Vec<(Fingerprint, usize)> =
        counts.into_iter().filter(|(_, count)| *count > 1).collect();
    let distinct_repeated = repeated.len();

    let subsets = if list {
        repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        repeated
            .into_iter()
            .map(|(print, count)| RepeatedSubset {
                numbers: print.numbers().to_vec(),
                count,
            })
            .collect()
    } else {
        Vec::new()
    };

    RepetitionSummary {
        size,
        name: group_name(size),
        distinct_repeated,
        subsets,
    }
}

/// One summary per repetition size of the variant, smallest first.
pub fn analyze_repetition(games: &[Game], variant: Variant, list: bool) -> Vec<RepetitionSummary> {
    variant
        .repetition_sizes()
        .map(|size| {
            let summary = repetition_summary(games, size, list);
            log::debug!(
                "{}: {} repeated groups of {}",
                summary.name,
                summary.distinct_repeated,
                size
            );
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(numbers: &[u8]) -> Game {
        Game::new(numbers.to_vec()).unwrap()
    }

    #[test]
    fn test_shared_pair_counted_once() {
        let games = vec![game(&[3, 7, 10, 20, 30]), game(&[1, 3, 7, 40, 50])];
        let counts = subset_counts(&games, 2);
        assert_eq!(counts[&Fingerprint::from_numbers(&[3, 7])], 2);

        let summary = repetition_summary(&games, 2, true);
        assert_eq!(summary.distinct_repeated, 1);
        assert_eq!(summary.name, "duque");
        assert_eq!(summary.subsets, vec![RepeatedSubset { numbers: vec![3, 7], count: 2 }]);
        assert_eq!(summary.subsets[0].label(), "03, 07");
    }

    #[test]
    fn test_listing_only_on_request() {
        let games = vec![game(&[1, 2, 3]), game(&[1, 2, 4])];
        let summary = repetition_summary(&games, 2, false);
        assert_eq!(summary.distinct_repeated, 1);
        assert!(summary.subsets.is_empty());
    }

    #[test]
    fn test_listing_sorted_by_count() {
        let games = vec![
            game(&[1, 2, 3]),
            game(&[1, 2, 4]),
            game(&[1, 2, 5]),
            game(&[5, 6, 3]),
            game(&[5, 6, 9]),
        ];
        let summary = repetition_summary(&games, 2, true);
        assert_eq!(summary.subsets[0], RepeatedSubset { numbers: vec![1, 2], count: 3 });
        assert_eq!(summary.subsets[1], RepeatedSubset { numbers: vec![5, 6], count: 2 });
        assert_eq!(summary.distinct_repeated, 2);
    }

    #[test]
    fn test_identical_games_repeat_at_full_size() {
        let games = vec![game(&[1, 2, 3, 4, 5]), game(&[5, 4, 3, 2, 1])];
        let all = analyze_repetition(&games, Variant::Quina, false);
        assert_eq!(all.iter().map(|s| s.size).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(all[3].distinct_repeated, 1);
        assert_eq!(all[0].distinct_repeated, 10);
    }

    #[test]
    fn test_no_repetition() {
        let games = vec![game(&[1, 2, 3, 4, 5, 6]), game(&[7, 8, 9, 10, 11, 12])];
        let all = analyze_repetition(&games, Variant::MegaSena, true);
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|s| s.distinct_repeated == 0 && s.subsets.is_empty()));
    }
}
