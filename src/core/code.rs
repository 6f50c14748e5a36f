// code.rs - LINcode derivation for a newly labeled profile (C7)

use crate::core::distance::{pairwise_detailed, INF};
use crate::core::threshold::SchemeThresholds;
use crate::data::{LabeledSet, LinCode};

/// The intermediate values behind one derived code: the nearest labeled
/// profile, the allele-agreement counts against it, and the prefix it
/// contributed. Carried alongside the code itself so the per-assignment
/// debug trace doesn't need to recompute any of it.
pub struct Derivation {
    pub code: LinCode,
    pub closest_id: Option<String>,
    pub diffs: usize,
    pub common_alleles: usize,
    pub missing_in_either: usize,
    pub distance: f64,
    pub chosen_prefix: LinCode,
}

/// Derive the LINcode for a new profile against the current labeled set.
/// Thin wrapper over [`derive`] for callers that only need the code itself.
pub fn derive_code(labeled: &LabeledSet, profile: &[u32], thresholds: &SchemeThresholds) -> LinCode {
    derive(labeled, profile, thresholds).code
}

/// Full derivation. The very first labeled profile has no nearest neighbour
/// to derive from, so it gets the all-zero code of length `K` directly.
pub fn derive(labeled: &LabeledSet, profile: &[u32], thresholds: &SchemeThresholds) -> Derivation {
    let k_max = thresholds.k();

    if labeled.is_empty() {
        return Derivation {
            code: vec![0; k_max],
            closest_id: None,
            diffs: 0,
            common_alleles: 0,
            missing_in_either: 0,
            distance: INF,
            chosen_prefix: Vec::new(),
        };
    }

    // Step 1: nearest labeled profile, short-circuiting on exact agreement
    // over every locus where both sides are called. A profile that shares
    // no comparable locus with `q` also reports diffs == 0 but its distance
    // is the INF sentinel, not a genuine agreement — it must fall through
    // to a fresh code (step 3) rather than reuse `q`'s.
    let mut best_idx = 0usize;
    let mut best_diffs = 0usize;
    let mut best_missing = 0usize;
    let mut best_distance = f64::INFINITY;
    let mut exact_match: Option<usize> = None;

    for (idx, entry) in labeled.entries().iter().enumerate() {
        let (diffs, missing_in_either, distance) = pairwise_detailed(profile, &entry.profile);
        if diffs == 0 && distance < INF && exact_match.is_none() {
            exact_match = Some(idx);
        }
        if distance < best_distance {
            best_distance = distance;
            best_idx = idx;
            best_diffs = diffs;
            best_missing = missing_in_either;
        }
    }

    let c_star = exact_match.unwrap_or(best_idx);
    let (diffs, missing_in_either, distance) = (best_diffs, best_missing, best_distance);
    let common_alleles = profile.len() - diffs - missing_in_either;
    let closest_id = Some(labeled.entries()[c_star].id.clone());

    if exact_match.is_some() {
        return Derivation {
            code: labeled.entries()[c_star].code.clone(),
            closest_id,
            diffs,
            common_alleles,
            missing_in_either,
            distance,
            chosen_prefix: labeled.entries()[c_star].code.clone(),
        };
    }

    // Step 2: threshold level k = count of leading thresholds satisfied.
    let identity = 100.0 - distance;
    let k = thresholds
        .identity
        .iter()
        .take_while(|&&threshold_identity| identity >= threshold_identity)
        .count();

    // Step 3: increment at the effective position, zero-pad the remainder.
    // k == K is the boundary case: position K doesn't exist, so the
    // increment lands on the last position instead.
    let mut code = vec![0i64; k_max];

    if k == 0 {
        let max_first = labeled.entries().iter().map(|e| e.code[0]).max().unwrap_or(-1);
        code[0] = max_first + 1;
        return Derivation {
            code,
            closest_id,
            diffs,
            common_alleles,
            missing_in_either,
            distance,
            chosen_prefix: Vec::new(),
        };
    }

    let eff = k.min(k_max - 1);
    let prefix = labeled.entries()[c_star].code[0..eff].to_vec();
    code[0..eff].copy_from_slice(&prefix);

    let max_at_eff = labeled
        .entries()
        .iter()
        .filter(|e| e.code[0..eff] == prefix[..])
        .map(|e| e.code[eff])
        .max()
        .unwrap_or(-1);
    code[eff] = max_at_eff + 1;

    Derivation {
        code,
        closest_id,
        diffs,
        common_alleles,
        missing_in_either,
        distance,
        chosen_prefix: prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(diffs: Vec<i64>, l: usize) -> SchemeThresholds {
        let identity = diffs.iter().map(|&t| 100.0 * (l as f64 - t as f64) / l as f64).collect();
        SchemeThresholds { diffs, identity }
    }

    // Two-level scheme over a 10-locus profile: t = [1, 3] -> identity = [90, 70]

    #[test]
    fn s1_diffs_zero_reuses_code_verbatim() {
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);

        let profile = vec![1; 10]; // identical profile, diffs = 0
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![0, 0]);
    }

    #[test]
    fn s2_close_match_increments_second_position() {
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);

        // 1 allelic difference out of 10 -> distance 10, identity 90 -> k = 1 (ties >= 90 at level 0, < 70 n/a)
        let mut profile = vec![1; 10];
        profile[0] = 2;
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![0, 1]);
    }

    #[test]
    fn s3_distant_match_increments_first_position() {
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);

        // 5 allelic differences out of 10 -> distance 50, identity 50 -> k = 0
        let mut profile = vec![1; 10];
        for i in 0..5 {
            profile[i] = 9;
        }
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![1, 0]);
    }

    #[test]
    fn s4_three_way_branching_shares_top_level_only() {
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);

        let mut p1 = vec![1; 10];
        p1[0] = 2;
        let c1 = derive_code(&labeled, &p1, &t);
        assert_eq!(c1, vec![0, 1]);
        labeled.push("b".into(), p1, c1);

        let mut p2 = vec![1; 10];
        p2[1] = 3;
        let c2 = derive_code(&labeled, &p2, &t);
        assert_eq!(c2, vec![0, 2]);
        labeled.push("c".into(), p2, c2);
    }

    #[test]
    fn s5_missing_alleles_can_still_trigger_reuse() {
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);

        let mut profile = vec![1; 10];
        profile[3] = 0; // missing, no disagreement anywhere else -> diffs = 0
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![0, 0]);
    }

    #[test]
    fn entirely_missing_profile_gets_a_fresh_top_level_code_not_a_reuse() {
        // diffs == 0 against every labeled profile (no comparable locus
        // anywhere), but distance is the INF sentinel rather than a genuine
        // agreement, so this must mint a fresh top-level code instead of
        // inheriting one.
        let t = thresholds(vec![1, 3], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0, 0]);
        labeled.push("b".into(), vec![1; 10], vec![1, 0]);

        let profile = vec![0; 10]; // all missing
        let derivation = derive(&labeled, &profile, &t);
        assert_eq!(derivation.diffs, 0);
        assert_eq!(derivation.distance, INF);
        assert_eq!(derivation.code, vec![2, 0]);
    }

    #[test]
    fn s6_first_labeled_profile_gets_all_zero_code() {
        let t = thresholds(vec![1, 3], 10);
        let labeled = LabeledSet::new();
        let profile = vec![1; 10];
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![0, 0]);
    }

    #[test]
    fn k_equals_num_levels_increments_last_position() {
        // Single-level scheme: k can only be 0 or 1 (== K), exercising the
        // k == K boundary where position K does not exist.
        let t = thresholds(vec![1], 10);
        let mut labeled = LabeledSet::new();
        labeled.push("a".into(), vec![1; 10], vec![0]);

        let mut profile = vec![1; 10];
        profile[0] = 2; // 1 diff, identity 90 >= threshold 90 -> k = 1 == K
        let code = derive_code(&labeled, &profile, &t);
        assert_eq!(code, vec![1]);
    }
}
