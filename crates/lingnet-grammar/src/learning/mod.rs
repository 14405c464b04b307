//! Online learning: harmony evaluation, winner selection, perceptron updates

pub mod harmony;
pub mod perceptron;

pub use harmony::{
    find_optimal_candidate, minimal_harmony_set, noisy_harmony, random_tableau, sample_candidate,
    select_optimal,
};
pub use perceptron::{EvaluationMode, Perceptron, SolveStep, SolveSummary};
