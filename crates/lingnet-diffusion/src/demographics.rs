//! Population demographics
//!
//! Agents may carry an occupation, a location, an age band and a speech
//! profile. How those are handed out is behind [`DemographicAssigner`]; the
//! simulator itself never reads them.

use serde::{Deserialize, Serialize};

use lingnet_common::{LingnetError, Result, SimRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupation {
    Fishing,
    Farming,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    UpIsland,
    DownIsland,
    Tourist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    From14To30,
    From31To45,
    From46To60,
    From61To75,
    Over75,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeechProfile {
    Mainland,
    Raiser,
    Hypercorrecter,
}

/// Demographic record of one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub occupation: Occupation,
    pub location: Location,
    pub age: AgeBand,
    pub speech_profile: SpeechProfile,
}

/// Source of one demographic record per agent
pub trait DemographicAssigner {
    fn assign(&mut self, agent: usize, rng: &mut SimRng) -> Demographics;
}

/// Draws categories in proportion to their remaining quota
///
/// Once every quota of an attribute is used up, draws follow the initial
/// quota proportions.
#[derive(Debug, Clone)]
pub struct QuotaAssigner {
    occupation: Quota<Occupation>,
    location: Quota<Location>,
    age: Quota<AgeBand>,
    speech_profile: Quota<SpeechProfile>,
}

#[derive(Debug, Clone)]
struct Quota<T> {
    categories: Vec<T>,
    initial: Vec<usize>,
    remaining: Vec<usize>,
}

impl<T: Copy> Quota<T> {
    fn new(entries: &[(T, usize)]) -> Self {
        let counts: Vec<usize> = entries.iter().map(|(_, n)| *n).collect();
        Self {
            categories: entries.iter().map(|(c, _)| *c).collect(),
            initial: counts.clone(),
            remaining: counts,
        }
    }

    fn draw(&mut self, rng: &mut SimRng) -> T {
        let weights: Vec<f64> = self.remaining.iter().map(|n| *n as f64).collect();
        if let Some(i) = rng.weighted_index(&weights) {
            self.remaining[i] -= 1;
            return self.categories[i];
        }
        let weights: Vec<f64> = self.initial.iter().map(|n| *n as f64).collect();
        let i = rng
            .weighted_index(&weights)
            .unwrap_or_else(|| rng.uniform_index(self.categories.len()));
        self.categories[i]
    }
}

impl QuotaAssigner {
    /// Fails when any attribute has no categories to draw from
    pub fn new(
        occupation: &[(Occupation, usize)],
        location: &[(Location, usize)],
        age: &[(AgeBand, usize)],
        speech_profile: &[(SpeechProfile, usize)],
    ) -> Result<Self> {
        let attributes = [
            ("occupation", occupation.is_empty()),
            ("location", location.is_empty()),
            ("age", age.is_empty()),
            ("speech_profile", speech_profile.is_empty()),
        ];
        if let Some((name, _)) = attributes.iter().find(|(_, empty)| *empty) {
            return Err(LingnetError::Config(format!(
                "demographic attribute {name} has no categories"
            )));
        }
        Ok(Self::from_quotas(occupation, location, age, speech_profile))
    }

    fn from_quotas(
        occupation: &[(Occupation, usize)],
        location: &[(Location, usize)],
        age: &[(AgeBand, usize)],
        speech_profile: &[(SpeechProfile, usize)],
    ) -> Self {
        Self {
            occupation: Quota::new(occupation),
            location: Quota::new(location),
            age: Quota::new(age),
            speech_profile: Quota::new(speech_profile),
        }
    }

    /// Quotas of the 560-agent island population (one agent per ten people)
    pub fn island() -> Self {
        Self::from_quotas(
            &[
                (Occupation::Fishing, 20),
                (Occupation::Farming, 80),
                (Occupation::Other, 460),
            ],
            &[
                (Location::UpIsland, 170),
                (Location::DownIsland, 390),
                (Location::Tourist, 0),
            ],
            &[
                (AgeBand::From14To30, 102),
                (AgeBand::From31To45, 170),
                (AgeBand::From46To60, 131),
                (AgeBand::From61To75, 112),
                (AgeBand::Over75, 45),
            ],
            &[
                (SpeechProfile::Mainland, 1),
                (SpeechProfile::Raiser, 1),
                (SpeechProfile::Hypercorrecter, 1),
            ],
        )
    }
}

impl DemographicAssigner for QuotaAssigner {
    fn assign(&mut self, _agent: usize, rng: &mut SimRng) -> Demographics {
        Demographics {
            occupation: self.occupation.draw(rng),
            location: self.location.draw(rng),
            age: self.age.draw(rng),
            speech_profile: self.speech_profile.draw(rng),
        }
    }
}
