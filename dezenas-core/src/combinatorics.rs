use std::fmt;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// All size-`k` subsets of `set`, in lexicographic order of positions.
///
/// `k == 0` yields a single empty subset, `k > set.len()` yields nothing.
pub fn k_subsets<T: Copy>(set: &[T], k: usize) -> Vec<Vec<T>> {
    let n = set.len();
    if k > n {
        return Vec::new();
    }
    if k == 0 {
        return vec![Vec::new()];
    }
    if k == n {
        return vec![set.to_vec()];
    }

    let mut result = Vec::with_capacity(binomial(n, k).min(1 << 20) as usize);
    let mut current = Vec::with_capacity(k);
    combine(set, k, 0, &mut current, &mut result);
    result
}

fn combine<T: Copy>(set: &[T], k: usize, start: usize, current: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    // not enough elements left to complete a combination
    if set.len() - start < k - current.len() {
        return;
    }
    for i in start..set.len() {
        current.push(set[i]);
        combine(set, k, i + 1, current, out);
        current.pop();
    }
}

/// Same subsets and order as [`k_subsets`], packed back to back in one buffer with stride `k`.
///
/// Subset `i` is `out[i * k..(i + 1) * k]`. Empty for `k == 0` or `k > set.len()`.
/// The buffer holds C(n, k) * k items, so callers bound the count first.
pub fn k_subsets_flat<T: Copy>(set: &[T], k: usize) -> Vec<T> {
    let n = set.len();
    if k == 0 || k > n {
        return Vec::new();
    }

    let total = usize::try_from(binomial(n, k)).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(total.saturating_mul(k));
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.extend(idx.iter().map(|&i| set[i]));

        // rightmost position that can still move right
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] < n - k + i {
                break;
            }
        }
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Canonical key of a subset: its numbers in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(SmallVec<[u8; 16]>);

impl Fingerprint {
    pub fn from_numbers(numbers: &[u8]) -> Self {
        let mut key: SmallVec<[u8; 16]> = SmallVec::from_slice(numbers);
        key.sort_unstable();
        Self(key)
    }

    pub fn numbers(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// Fingerprints of every size-`g` subset of `game`. Empty when `g == 0` or `g > game.len()`.
pub fn subset_fingerprints(game: &[u8], g: usize) -> FxHashSet<Fingerprint> {
    if g == 0 || game.len() < g {
        return FxHashSet::default();
    }
    let mut sorted = game.to_vec();
    sorted.sort_unstable();
    k_subsets(&sorted, g)
        .into_iter()
        .map(|subset| Fingerprint(SmallVec::from_vec(subset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_k_subsets_small() {
        let subsets = k_subsets(&[1, 2, 3, 4], 2);
        assert_eq!(
            subsets,
            vec![
                vec![1, 2],
                vec![1, 3],
                vec![1, 4],
                vec![2, 3],
                vec![2, 4],
                vec![3, 4],
            ]
        );
    }

    #[test]
    fn test_k_subsets_edges() {
        let set = [5u8, 8, 13];
        assert_eq!(k_subsets(&set, 0), vec![Vec::<u8>::new()]);
        assert_eq!(k_subsets(&set, 3), vec![vec![5, 8, 13]]);
        assert!(k_subsets(&set, 4).is_empty());
        assert_eq!(k_subsets::<u8>(&[], 0), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_k_subsets_flat_layout() {
        let flat = k_subsets_flat(&[1u8, 2, 3, 4], 2);
        assert_eq!(flat, vec![1, 2, 1, 3, 1, 4, 2, 3, 2, 4, 3, 4]);
        assert_eq!(k_subsets_flat(&[7u8, 8], 2), vec![7, 8]);
        assert!(k_subsets_flat(&[7u8, 8], 0).is_empty());
        assert!(k_subsets_flat(&[7u8, 8], 3).is_empty());
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(80, 5), 24_040_016);
        assert_eq!(binomial(25, 15), 3_268_760);
        assert_eq!(binomial(3, 4), 0);
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        assert_eq!(Fingerprint::from_numbers(&[7, 3]), Fingerprint::from_numbers(&[3, 7]));
        assert_eq!(Fingerprint::from_numbers(&[9, 1, 4]).numbers(), &[1, 4, 9]);
        assert_eq!(Fingerprint::from_numbers(&[3, 7]).to_string(), "03, 07");
    }

    #[test]
    fn test_subset_fingerprints() {
        let prints = subset_fingerprints(&[5, 1, 3], 2);
        assert_eq!(prints.len(), 3);
        assert!(prints.contains(&Fingerprint::from_numbers(&[1, 5])));
        assert!(prints.contains(&Fingerprint::from_numbers(&[3, 5])));
        assert!(prints.contains(&Fingerprint::from_numbers(&[1, 3])));
    }

    #[test]
    fn test_subset_fingerprints_degenerate() {
        assert!(subset_fingerprints(&[1, 2, 3], 0).is_empty());
        assert!(subset_fingerprints(&[1, 2, 3], 4).is_empty());
        assert_eq!(subset_fingerprints(&[1, 2, 3], 3).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_k_subsets_count_and_shape(n in 0usize..12, k in 0usize..14) {
            let set: Vec<u8> = (1..=n as u8).collect();
            let subsets = k_subsets(&set, k);
            prop_assert_eq!(subsets.len() as u64, binomial(n, k));

            let mut seen = std::collections::HashSet::new();
            for subset in &subsets {
                prop_assert_eq!(subset.len(), k);
                prop_assert!(subset.iter().all(|x| set.contains(x)));
                prop_assert!(subset.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(seen.insert(subset.clone()));
            }
        }

        #[test]
        fn prop_flat_matches_nested(n in 0usize..12, k in 1usize..8) {
            let set: Vec<u8> = (1..=n as u8).collect();
            let nested: Vec<u8> = k_subsets(&set, k).into_iter().flatten().collect();
            prop_assert_eq!(k_subsets_flat(&set, k), nested);
        }

        #[test]
        fn prop_fingerprints_are_subsets(game in proptest::collection::btree_set(1u8..=60, 1..8), g in 0usize..9) {
            let game: Vec<u8> = game.into_iter().collect();
            let prints = subset_fingerprints(&game, g);
            if g == 0 || g > game.len() {
                prop_assert!(prints.is_empty());
            } else {
                prop_assert_eq!(prints.len() as u64, binomial(game.len(), g));
                for print in &prints {
                    prop_assert_eq!(print.numbers().len(), g);
                    prop_assert!(print.numbers().iter().all(|x| game.contains(x)));
                }
            }
        }
    }
}
