use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::seq::IndexedRandom;

/// Draws `count` distinct items, each draw proportional to the weight of the items still available.
///
/// Works on private copies: the caller's slices are never touched. Invalid weights (length
/// mismatch, negative or non-finite values, zero total) fall back to a uniform draw without
/// replacement. The result is in draw order.
pub fn weighted_sample_without_replacement<T: Copy, R: Rng + ?Sized>(
    items: &[T],
    weights: &[f64],
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    if items.is_empty() || count == 0 {
        return Vec::new();
    }
    let count = count.min(items.len());

    if !weights_are_valid(items, weights) {
        log::debug!("invalid sampling weights, falling back to uniform choice");
        return items.choose_multiple(rng, count).copied().collect();
    }

    let mut available: Vec<(T, f64)> = items.iter().copied().zip(weights.iter().copied()).collect();
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count {
        let dist = match WeightedIndex::new(available.iter().map(|(_, w)| *w)) {
            Ok(dist) => dist,
            Err(_) => {
                // only zero weights left
                let rest: Vec<T> = available.iter().map(|(item, _)| *item).collect();
                let missing = count - selected.len();
                selected.extend(rest.choose_multiple(rng, missing).copied());
                break;
            }
        };
        let idx = dist.sample(rng);
        let (item, _) = available.swap_remove(idx);
        selected.push(item);
    }

    selected
}

fn weights_are_valid<T>(items: &[T], weights: &[f64]) -> bool {
    if items.len() != weights.len() {
        return false;
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return false;
    }
    weights.iter().sum::<f64>() > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_distinct_items() {
        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<u8> = (1..=20).collect();
        let weights = vec![1.0; 20];
        for _ in 0..100 {
            let mut sample = weighted_sample_without_replacement(&items, &weights, 5, &mut rng);
            assert_eq!(sample.len(), 5);
            sample.sort();
            sample.dedup();
            assert_eq!(sample.len(), 5);
        }
    }

    #[test]
    fn test_sample_degenerate_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: Vec<u8> = vec![];
        assert!(weighted_sample_without_replacement(&empty, &[], 3, &mut rng).is_empty());
        assert!(weighted_sample_without_replacement(&[1u8, 2], &[1.0, 1.0], 0, &mut rng).is_empty());
        assert_eq!(weighted_sample_without_replacement(&[1u8, 2], &[1.0, 1.0], 5, &mut rng).len(), 2);
    }

    #[test]
    fn test_sample_invalid_weights_fall_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [1u8, 2, 3, 4];
        for weights in [vec![1.0, 2.0], vec![f64::NAN, 1.0, 1.0, 1.0], vec![0.0; 4], vec![-1.0, 1.0, 1.0, 1.0]] {
            let mut sample = weighted_sample_without_replacement(&items, &weights, 3, &mut rng);
            assert_eq!(sample.len(), 3);
            sample.sort();
            sample.dedup();
            assert_eq!(sample.len(), 3);
        }
    }

    #[test]
    fn test_sample_does_not_mutate_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = vec![10u8, 20, 30, 40];
        let weights = vec![0.1, 0.2, 0.3, 0.4];
        let _ = weighted_sample_without_replacement(&items, &weights, 3, &mut rng);
        assert_eq!(items, vec![10, 20, 30, 40]);
        assert_eq!(weights, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_zero_weight_items_come_last() {
        let mut rng = StdRng::seed_from_u64(11);
        let items = [1u8, 2, 3];
        let weights = [1.0, 0.0, 1.0];
        for _ in 0..50 {
            let two = weighted_sample_without_replacement(&items, &weights, 2, &mut rng);
            assert!(!two.contains(&2), "{:?}", two);
            let three = weighted_sample_without_replacement(&items, &weights, 3, &mut rng);
            assert_eq!(three[2], 2);
        }
    }

    #[test]
    fn test_heavier_item_drawn_first_more_often() {
        let mut rng = StdRng::seed_from_u64(2024);
        let items = [1u8, 2];
        let weights = [9.0, 1.0];
        let firsts = (0..2000)
            .filter(|_| weighted_sample_without_replacement(&items, &weights, 1, &mut rng)[0] == 1)
            .count();
        assert!(firsts > 1600, "item 1 drawn first {} times", firsts);
    }
}
