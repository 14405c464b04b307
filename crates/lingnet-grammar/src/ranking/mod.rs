//! Offline ranking analysis: ERCs, RCD and typology

pub mod comparative;
pub mod erc;
pub mod language;

pub use comparative::{ComparativeTableau, Ranking, RankingStatus};
pub use erc::{Erc, Mark};
pub use language::{enumerate_languages, typology, Language};
