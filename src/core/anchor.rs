// anchor.rs - anchor adjustment of a Prim-ordered batch (C6)

use crate::core::distance::pairwise;
use crate::data::LabeledSet;

/// Rotate a Prim-ordered batch so its starting vertex is the member nearest
/// the already-labeled cluster, preserving MST adjacency via prefix
/// reversal.
///
/// `order` holds batch-local indices into `batch_profiles`; the function
/// returns a rotation of the same indices. A no-op when `labeled` is empty.
pub fn anchor_adjust(labeled: &LabeledSet, order: &[usize], batch_profiles: &[Vec<u32>]) -> Vec<usize> {
    if labeled.is_empty() || order.len() <= 1 {
        return order.to_vec();
    }

    let mut best_p = 0usize;
    let mut best_d = f64::INFINITY;

    for (p, &b) in order.iter().enumerate() {
        let profile = &batch_profiles[b];
        let min_d = labeled
            .entries()
            .iter()
            .map(|e| pairwise(profile, &e.profile).1)
            .fold(f64::INFINITY, f64::min);

        if min_d < best_d {
            best_d = min_d;
            best_p = p;
        }
    }

    let mut rotated: Vec<usize> = order[best_p..].to_vec();
    rotated.extend(order[..best_p].iter().rev());
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_labeled_set_is_noop() {
        let labeled = LabeledSet::new();
        let order = vec![0, 1, 2];
        let profiles = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        assert_eq!(anchor_adjust(&labeled, &order, &profiles), order);
    }

    #[test]
    fn rotates_and_reverses_prefix() {
        let mut labeled = LabeledSet::new();
        // labeled anchor profile is identical to batch member at order position 2
        labeled.push("anchor".into(), vec![9, 9, 9], vec![0]);

        let profiles = vec![vec![1, 2, 3], vec![4, 5, 6], vec![9, 9, 9]];
        let order = vec![0, 1, 2];

        let result = anchor_adjust(&labeled, &order, &profiles);
        // p = 2 (index of batch member 2 within order): B[2..] ++ reverse(B[0..2])
        assert_eq!(result, vec![2, 1, 0]);
    }

    #[test]
    fn ties_keep_earliest_index() {
        let mut labeled = LabeledSet::new();
        labeled.push("anchor".into(), vec![0, 0, 0], vec![0]);

        // both batch members are equidistant from the anchor
        let profiles = vec![vec![1, 0, 0], vec![1, 0, 0]];
        let order = vec![0, 1];

        let result = anchor_adjust(&labeled, &order, &profiles);
        assert_eq!(result, vec![0, 1]);
    }
}
