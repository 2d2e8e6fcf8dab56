use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::archetype::Archetype;
use crate::error::Result;
use crate::skill::SkillDistribution;

/// Stable identity of a competitor within one tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u32);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw skill and its percentile, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Skill {
    pub raw: f64,
    pub percentile: f64,
}

/// A tournament participant.
///
/// Skill and archetype are both optional; a missing one means that signal
/// is not used for this competitor's matches.
#[derive(Clone, Debug)]
pub struct Competitor {
    id: CompetitorId,
    skill: Option<Skill>,
    archetype: Option<Arc<Archetype>>,

    /// Cumulative match points
    pub points: f64,

    /// Opponent faced each round, `None` for a bye
    pub played: Vec<Option<CompetitorId>>,
}

impl Competitor {
    /// Create a competitor with no skill or archetype signal.
    pub fn new(id: u32) -> Self {
        Competitor {
            id: CompetitorId(id),
            skill: None,
            archetype: None,
            points: 0.0,
            played: Vec::new(),
        }
    }

    /// Attach a raw skill value, deriving its percentile from `dist`.
    pub fn with_skill(mut self, raw: f64, dist: &SkillDistribution) -> Result<Self> {
        let percentile = dist.percentile(raw)?;
        self.skill = Some(Skill { raw, percentile });
        Ok(self)
    }

    /// Attach a skill percentile directly, clamped to [0, 1].
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        let percentile = percentile.clamp(0.0, 1.0);
        self.skill = Some(Skill {
            raw: percentile,
            percentile,
        });
        self
    }

    pub fn with_archetype(mut self, archetype: Arc<Archetype>) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn id(&self) -> CompetitorId {
        self.id
    }

    pub fn skill(&self) -> Option<&Skill> {
        self.skill.as_ref()
    }

    pub fn archetype(&self) -> Option<&Arc<Archetype>> {
        self.archetype.as_ref()
    }

    /// Skill percentile, or the 1.0 sentinel when no skill is set.
    ///
    /// For reporting only. Use [`Competitor::skill`] to test whether the
    /// skill signal is present.
    pub fn percentile(&self) -> f64 {
        self.skill.map_or(1.0, |s| s.percentile)
    }

    /// Whether `opponent` appears in this competitor's history.
    pub fn has_played(&self, opponent: CompetitorId) -> bool {
        self.played.contains(&Some(opponent))
    }

    /// Number of rounds this competitor received a bye.
    pub fn byes(&self) -> usize {
        self.played.iter().filter(|p| p.is_none()).count()
    }

    pub fn rounds_played(&self) -> usize {
        self.played.len()
    }
}

impl fmt::Display for Competitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
