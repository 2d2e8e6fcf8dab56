use rand::Rng;
use std::sync::Arc;

use crate::archetype::{Archetype, MatchupTable};
use crate::constants::{
    DEFAULT_ARCHETYPE, DISTRIBUTION_TOLERANCE, REFERENCE_ARCHETYPES, REFERENCE_ARCHETYPE_SHARES,
};
use crate::error::{Result, SimError};

#[derive(Clone, Debug, PartialEq)]
struct Interval {
    archetype: String,
    start: f64,
    end: f64,
}

/// Share of the field playing each archetype.
///
/// Stored as consecutive intervals over [0, 1]. The first interval is closed
/// on both ends, the rest are open on the left.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchetypeDistribution {
    intervals: Vec<Interval>,
}

impl ArchetypeDistribution {
    /// Build a distribution from `(archetype, share)` entries.
    ///
    /// Fails if any share is negative or NaN, or if the shares do not sum to
    /// 1.0 within `DISTRIBUTION_TOLERANCE`.
    pub fn new<I, S>(shares: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut intervals = Vec::new();
        let mut start = 0.0;

        for (archetype, share) in shares {
            let archetype = archetype.into();
            if share.is_nan() || share < 0.0 {
                return Err(SimError::InvalidWeight {
                    archetype,
                    weight: share,
                });
            }
            let end = start + share;
            intervals.push(Interval {
                archetype,
                start,
                end,
            });
            start = end;
        }

        if (start - 1.0).abs() >= DISTRIBUTION_TOLERANCE {
            return Err(SimError::DistributionSum { total: start });
        }

        Ok(ArchetypeDistribution { intervals })
    }

    /// Field composition of the reference event.
    pub fn reference() -> Self {
        let intervals = REFERENCE_ARCHETYPES
            .iter()
            .zip(REFERENCE_ARCHETYPE_SHARES)
            .scan(0.0, |start, (name, share)| {
                let interval = Interval {
                    archetype: name.to_string(),
                    start: *start,
                    end: *start + share,
                };
                *start += share;
                Some(interval)
            })
            .collect();
        ArchetypeDistribution { intervals }
    }

    /// Draw an archetype name. Rolls that land in no interval (floating
    /// drift at the top end) fall back to the "Default" archetype.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &str {
        let roll = rng.gen::<f64>();
        self.locate(roll)
    }

    /// Draw an archetype and resolve it against `table`.
    pub fn sample_from<R: Rng>(&self, table: &MatchupTable, rng: &mut R) -> Result<Arc<Archetype>> {
        table.get(self.sample(rng))
    }

    /// Check that every archetype with a share is present in `table`.
    pub fn validate_against(&self, table: &MatchupTable) -> Result<()> {
        for interval in &self.intervals {
            table.get(&interval.archetype)?;
        }
        Ok(())
    }

    pub fn archetypes(&self) -> impl Iterator<Item = &str> {
        self.intervals.iter().map(|i| i.archetype.as_str())
    }

    fn locate(&self, roll: f64) -> &str {
        for (idx, interval) in self.intervals.iter().enumerate() {
            let above_start = if idx == 0 {
                roll >= interval.start
            } else {
                roll > interval.start
            };
            if above_start && roll <= interval.end {
                return &interval.archetype;
            }
        }
        DEFAULT_ARCHETYPE
    }
}
