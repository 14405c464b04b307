//! Harmony evaluation and winner selection
//!
//! Harmony is the weighted violation total of a candidate; the candidate
//! with the lowest harmony is optimal. Ties are broken by a uniform draw.

use lingnet_common::{Result, SamplingError, SimRng};

use crate::model::{CandidateRef, TableauSet};

/// Candidates of `tableau` sharing the minimal harmony, in candidate order
pub fn minimal_harmony_set(ts: &TableauSet, tableau: usize) -> Result<Vec<usize>> {
    Ok(ts.tableau(tableau)?.minimal_harmony_set(ts.constraints()))
}

/// Optimal candidate of `tableau` without touching any frequency
///
/// Used wherever the tableau set belongs to someone else, e.g. a peer read
/// in the diffusion simulator.
pub fn select_optimal(ts: &TableauSet, tableau: usize, rng: &mut SimRng) -> Result<CandidateRef> {
    let best = minimal_harmony_set(ts, tableau)?;
    let chosen = match best.as_slice() {
        [] => return Err(SamplingError::EmptyTableau { tableau }.into()),
        [only] => *only,
        tied => tied[rng.uniform_index(tied.len())],
    };
    Ok(CandidateRef::new(tableau, chosen))
}

/// Optimal candidate of `tableau`, made the tableau's only winner
///
/// Sets the chosen candidate's frequency to 1 and every sibling's to 0, so
/// calling this destroys any empirical distribution the tableau carried.
pub fn find_optimal_candidate(
    ts: &mut TableauSet,
    tableau: usize,
    rng: &mut SimRng,
) -> Result<CandidateRef> {
    let optimal = select_optimal(ts, tableau, rng)?;
    ts.make_winner(optimal)?;
    Ok(optimal)
}

/// Tableau drawn proportionally to the frequencies of all winners
///
/// Fails with [`SamplingError::ZeroTotalFrequency`] when no candidate of the
/// set has a positive frequency.
pub fn random_tableau(ts: &TableauSet, rng: &mut SimRng) -> Result<usize> {
    let winners: Vec<(usize, f64)> = ts
        .tableaux()
        .iter()
        .enumerate()
        .flat_map(|(t, tableau)| {
            tableau
                .candidates()
                .iter()
                .filter(|c| c.is_winner())
                .map(move |c| (t, c.frequency()))
        })
        .collect();

    let weights: Vec<f64> = winners.iter().map(|(_, f)| *f).collect();
    rng.weighted_index(&weights)
        .map(|i| winners[i].0)
        .ok_or_else(|| SamplingError::ZeroTotalFrequency.into())
}

/// Candidate of `tableau` drawn according to `frequencies`
///
/// `frequencies` is aligned with the tableau's candidates; it is usually a
/// snapshot taken before winner selection rewrote the live frequencies.
pub fn sample_candidate(
    ts: &TableauSet,
    tableau: usize,
    frequencies: &[f64],
    rng: &mut SimRng,
) -> Result<CandidateRef> {
    let count = ts.tableau(tableau)?.candidate_count();
    let weights = &frequencies[..frequencies.len().min(count)];
    rng.weighted_index(weights)
        .map(|c| CandidateRef::new(tableau, c))
        .ok_or_else(|| SamplingError::EmptyDistribution { tableau }.into())
}

/// Harmony of `r` with fresh evaluation noise on every constraint weight
///
/// The noise term is a sum of `repeats` standard-normal draws.
pub fn noisy_harmony(
    ts: &TableauSet,
    r: CandidateRef,
    repeats: u32,
    rng: &mut SimRng,
) -> Result<f64> {
    let candidate = ts.candidate(r)?;
    Ok(candidate.harmony_with_noise(ts.constraints(), || rng.summed_normals(repeats)))
}
