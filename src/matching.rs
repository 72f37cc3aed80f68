//! Suggested school pairs for the comparison game.
//!
//! Candidates are every unordered pair of schools minus the pairs the user
//! already compared, so the work is quadratic in the number of schools.
//! That is fine for a catalog of a few hundred schools; a larger catalog
//! needs sampling instead of full enumeration.

use rand::seq::SliceRandom;
use rand::Rng;
use rocket::serde::Serialize;
use std::collections::HashSet;

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct Match {
    pub school1_id: i32,
    pub school2_id: i32,
    pub school1: String,
    pub school2: String,
}

/// Orders a pair so the smaller id comes first. Stored comparisons follow
/// the same order, which keeps pair lookups direction agnostic.
pub fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn suggest_matches<R: Rng + ?Sized>(
    schools: &[(i32, String)],
    compared: &[(i32, i32)],
    limit: usize,
    rng: &mut R,
) -> Vec<Match> {
    let seen: HashSet<(i32, i32)> = compared.iter().map(|&(a, b)| ordered(a, b)).collect();

    let mut sorted: Vec<&(i32, String)> = schools.iter().collect();
    sorted.sort_by_key(|s| s.0);
    sorted.dedup_by_key(|s| s.0);

    let mut candidates: Vec<Match> = sorted
        .iter()
        .enumerate()
        .flat_map(|(i, a)| sorted[i + 1..].iter().map(move |b| (*a, *b)))
        .filter(|(a, b)| !seen.contains(&(a.0, b.0)))
        .map(|(a, b)| Match {
            school1_id: a.0,
            school2_id: b.0,
            school1: a.1.clone(),
            school2: b.1.clone(),
        })
        .collect();

    candidates.shuffle(rng);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn schools(n: i32) -> Vec<(i32, String)> {
        (1..=n).map(|id| (id, format!("School {}", id))).collect()
    }

    fn all_pairs(n: i32) -> Vec<(i32, i32)> {
        let mut v = vec![];
        for a in 1..=n {
            for b in a + 1..=n {
                v.push((a, b));
            }
        }
        v
    }

    #[test]
    fn too_few_schools() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(suggest_matches(&[], &[], MAX_SUGGESTIONS, &mut rng).is_empty());
        assert!(suggest_matches(&schools(1), &[], MAX_SUGGESTIONS, &mut rng).is_empty());
    }

    #[test]
    fn three_schools_yield_each_pair_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let ms = suggest_matches(&schools(3), &[], MAX_SUGGESTIONS, &mut rng);
        assert_eq!(ms.len(), 3);
        let mut pairs: Vec<(i32, i32)> = ms.iter().map(|m| (m.school1_id, m.school2_id)).collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
        for m in &ms {
            assert_eq!(m.school1, format!("School {}", m.school1_id));
            assert_eq!(m.school2, format!("School {}", m.school2_id));
        }
    }

    #[test]
    fn caps_at_limit_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(42);
        let ms = suggest_matches(&schools(10), &[], MAX_SUGGESTIONS, &mut rng);
        assert_eq!(ms.len(), MAX_SUGGESTIONS);
        let unique: HashSet<(i32, i32)> = ms
            .iter()
            .map(|m| ordered(m.school1_id, m.school2_id))
            .collect();
        assert_eq!(unique.len(), MAX_SUGGESTIONS);
        assert!(ms.iter().all(|m| m.school1_id < m.school2_id));
    }

    #[test]
    fn excludes_pairs_compared_in_either_direction() {
        let mut rng = StdRng::seed_from_u64(3);
        let ms = suggest_matches(&schools(3), &[(2, 1), (1, 3)], MAX_SUGGESTIONS, &mut rng);
        assert_eq!(ms.len(), 1);
        assert_eq!((ms[0].school1_id, ms[0].school2_id), (2, 3));
    }

    #[test]
    fn everything_compared_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut compared = all_pairs(6);
        // half of them stored the other way round
        for p in compared.iter_mut().step_by(2) {
            *p = (p.1, p.0);
        }
        assert!(suggest_matches(&schools(6), &compared, MAX_SUGGESTIONS, &mut rng).is_empty());
    }

    #[test]
    fn duplicate_school_rows_do_not_pair_with_themselves() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut input = schools(2);
        input.push((2, "School 2".to_string()));
        let ms = suggest_matches(&input, &[], MAX_SUGGESTIONS, &mut rng);
        assert_eq!(ms.len(), 1);
        assert_ne!(ms[0].school1_id, ms[0].school2_id);
    }

    #[test]
    fn ordered_puts_smaller_first() {
        assert_eq!(ordered(5, 2), (2, 5));
        assert_eq!(ordered(2, 5), (2, 5));
    }
}
