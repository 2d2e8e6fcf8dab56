use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::archetype::Archetype;
use crate::competitor::Competitor;
use crate::constants::BASE_CUTOFF;
use crate::error::{Result, SimError};

/// Series length. Every game is played; there is no early stop once a
/// player has clinched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    BestOfTwo,
    BestOfThree,
}

impl Format {
    pub fn num_games(self) -> u32 {
        match self {
            Format::BestOfTwo => 2,
            Format::BestOfThree => 3,
        }
    }
}

/// Games won by each side of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SeriesScore {
    pub wins_a: u32,
    pub wins_b: u32,
}

impl SeriesScore {
    /// Score awarded for a bye: a sweep of every game in the series.
    pub fn bye(format: Format) -> Self {
        SeriesScore {
            wins_a: format.num_games(),
            wins_b: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins_a + self.wins_b
    }
}

/// Tuning for the match outcome model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeConfig {
    /// How far the archetype matchup estimate may move away from a coin
    /// flip, in [0, 1]. At 0 archetypes are ignored entirely and only skill
    /// decides matches.
    pub archetype_weight: f64,
}

impl OutcomeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.archetype_weight) {
            return Err(SimError::InvalidArchetypeWeight(self.archetype_weight));
        }
        Ok(())
    }
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        OutcomeConfig {
            archetype_weight: 1.0,
        }
    }
}

/// Probability that `a` wins a single game against `b`.
///
/// Skill counts only when both players have a skill, and archetypes only
/// when both have an archetype:
/// * neither: 0.5
/// * skill only: 0.5 + diff / 2
/// * archetype only: the matchup estimate
/// * both: matchup * (1 - |diff|) + (0.5 + diff / 2) * |diff|
///
/// where `diff` is `a`'s percentile minus `b`'s.
///
/// # Errors
/// * `InvalidArchetypeWeight` if the weight is outside [0, 1] or NaN
/// * `MissingMatchup` if either archetype lacks a row for the other
pub fn win_threshold(a: &Competitor, b: &Competitor, config: &OutcomeConfig) -> Result<f64> {
    config.validate()?;

    let percent_diff = match (a.skill(), b.skill()) {
        (Some(sa), Some(sb)) => Some(sa.percentile - sb.percentile),
        _ => None,
    };

    let matchup = match (a.archetype(), b.archetype()) {
        (Some(arch_a), Some(arch_b)) if config.archetype_weight > 0.0 => Some(matchup_estimate(
            arch_a,
            arch_b,
            percent_diff,
            config.archetype_weight,
        )?),
        _ => None,
    };

    let cutoff = match (percent_diff, matchup) {
        (None, None) => BASE_CUTOFF,
        (Some(diff), None) => BASE_CUTOFF + diff / 2.0,
        (None, Some(m)) => m,
        (Some(diff), Some(m)) => {
            let weight_factor = diff.abs();
            m * (1.0 - weight_factor) + (BASE_CUTOFF + diff / 2.0) * weight_factor
        }
    };

    Ok(cutoff)
}

/// Matchup-derived win probability for `a` against `b`.
///
/// With a skill gap, the favored side's own row is trusted; otherwise both
/// rows are averaged.
fn matchup_estimate(
    a: &Archetype,
    b: &Archetype,
    percent_diff: Option<f64>,
    archetype_weight: f64,
) -> Result<f64> {
    let a_wr = a.winrate_against(b.name())?;
    let b_wr = b.winrate_against(a.name())?;

    let estimate = match percent_diff {
        Some(diff) if diff > 0.0 => a_wr,
        Some(diff) if diff < 0.0 => 1.0 - b_wr,
        _ => (a_wr + (1.0 - b_wr)) / 2.0,
    };

    Ok(BASE_CUTOFF + archetype_weight * (estimate - BASE_CUTOFF))
}

/// Play every game of a series against a fixed per-game threshold.
///
/// A draw strictly below `threshold` is a game for side A.
pub fn play_series<R: Rng>(threshold: f64, format: Format, rng: &mut R) -> SeriesScore {
    let mut score = SeriesScore::default();
    for _ in 0..format.num_games() {
        if rng.gen::<f64>() < threshold {
            score.wins_a += 1;
        } else {
            score.wins_b += 1;
        }
    }
    score
}

/// Resolve one pairing. A missing opponent is a bye, scored as a sweep
/// without consuming randomness.
pub fn resolve_match<R: Rng>(
    a: &Competitor,
    b: Option<&Competitor>,
    format: Format,
    config: &OutcomeConfig,
    rng: &mut R,
) -> Result<SeriesScore> {
    let Some(b) = b else {
        return Ok(SeriesScore::bye(format));
    };

    let threshold = win_threshold(a, b, config)?;
    Ok(play_series(threshold, format, rng))
}
