//! Decision-vector distance utilities (spec.md §4.D).

use rand::seq::SliceRandom;
use rand::Rng;

/// Sentinel used to pad the shorter vector when comparing unequal lengths;
/// guaranteed not to equal any real choice index.
pub const PAD: usize = usize::MAX;

/// Counts positions where two decision vectors differ, treating the shorter
/// vector as padded with [`PAD`] out to the longer vector's length.
pub fn hamming_distance(a: &[usize], b: &[usize]) -> usize {
    let len = a.len().max(b.len());
    (0..len)
        .filter(|&i| a.get(i).copied().unwrap_or(PAD) != b.get(i).copied().unwrap_or(PAD))
        .count()
}

/// Flips `k` positions of `v` chosen uniformly at random, each replaced by a
/// choice drawn from `valid_choices(position)` (excluding the current value
/// when more than one option exists).
pub fn mutate(v: &[usize], k: usize, valid_choices: impl Fn(usize) -> Vec<usize>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let mut result = v.to_vec();
    if result.is_empty() {
        return result;
    }
    let mut positions: Vec<usize> = (0..result.len()).collect();
    positions.shuffle(&mut rng);
    for &pos in positions.iter().take(k.min(result.len())) {
        let options: Vec<usize> = valid_choices(pos).into_iter().filter(|&c| c != result[pos]).collect();
        if let Some(&choice) = options.choose(&mut rng) {
            result[pos] = choice;
        }
    }
    result
}

/// Single-point crossover: a random cut point `p` in `0..=min(len)`, taking
/// `a[..p]` followed by `b[p..]`.
pub fn crossover(a: &[usize], b: &[usize]) -> Vec<usize> {
    if a.is_empty() || b.is_empty() {
        return a.to_vec();
    }
    let mut rng = rand::thread_rng();
    let cut = rng.gen_range(0..=a.len().min(b.len()));
    let mut result = a[..cut].to_vec();
    result.extend_from_slice(&b[cut.min(b.len())..]);
    result
}
