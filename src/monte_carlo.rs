use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::archetype::MatchupTable;
use crate::competitor::{Competitor, CompetitorId};
use crate::constants::{
    REFERENCE_FIELD_SIZE, REFERENCE_TRACKED_ARCHETYPE, REFERENCE_TRACKED_SKILL,
};
use crate::error::{Result, SimError};
use crate::population::ArchetypeDistribution;
use crate::skill::SkillDistribution;
use crate::tournament::{Tournament, TournamentConfig};

/// Matchup data plus how often each archetype shows up in the field.
#[derive(Clone, Debug)]
pub struct ArchetypeField {
    pub table: MatchupTable,
    pub population: ArchetypeDistribution,
}

/// A fixed entrant added to every trial's field, whose results are tracked.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedEntrant {
    pub archetype: Option<String>,
    /// Raw skill, read through the field's skill distribution
    pub skill: Option<f64>,
}

/// How to build a random field for each trial.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    /// Number of random entrants
    pub size: usize,
    pub skill: Option<SkillDistribution>,
    pub archetypes: Option<ArchetypeField>,
    pub tracked: Option<TrackedEntrant>,
}

impl FieldConfig {
    /// The reference field: 2047 normally distributed entrants on the
    /// reference metagame, plus a 2.5 sigma player on RP Control. Pair it
    /// with [`TournamentConfig::reference`] for the nine-round event.
    pub fn reference() -> Self {
        FieldConfig {
            size: REFERENCE_FIELD_SIZE,
            skill: Some(SkillDistribution::default()),
            archetypes: Some(ArchetypeField {
                table: MatchupTable::reference(),
                population: ArchetypeDistribution::reference(),
            }),
            tracked: Some(TrackedEntrant {
                archetype: Some(REFERENCE_TRACKED_ARCHETYPE.to_string()),
                skill: Some(REFERENCE_TRACKED_SKILL),
            }),
        }
    }

    /// Check everything a trial could trip over, before any trial runs.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 && self.tracked.is_none() {
            return Err(SimError::EmptyField);
        }
        if let Some(dist) = &self.skill {
            dist.validate()?;
        }
        if let Some(field) = &self.archetypes {
            field.population.validate_against(&field.table)?;
        }
        if let Some(TrackedEntrant {
            archetype: Some(name),
            ..
        }) = &self.tracked
        {
            match &self.archetypes {
                Some(field) => {
                    field.table.get(name)?;
                }
                None => return Err(SimError::UnknownArchetype { name: name.clone() }),
            }
        }
        Ok(())
    }

    /// Draw a field. Random entrants get ids `0..size`; the tracked entrant,
    /// if any, is appended last with id `size`.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Result<(Vec<Competitor>, Option<CompetitorId>)> {
        let mut competitors = Vec::with_capacity(self.size + 1);

        for id in 0..self.size as u32 {
            let mut competitor = Competitor::new(id);
            if let Some(dist) = &self.skill {
                let raw = dist.sample(rng)?;
                competitor = competitor.with_skill(raw, dist)?;
            }
            if let Some(field) = &self.archetypes {
                competitor = competitor.with_archetype(field.population.sample_from(&field.table, rng)?);
            }
            competitors.push(competitor);
        }

        let mut tracked_id = None;
        if let Some(tracked) = &self.tracked {
            let mut competitor = Competitor::new(self.size as u32);
            if let (Some(raw), Some(dist)) = (tracked.skill, &self.skill) {
                competitor = competitor.with_skill(raw, dist)?;
            }
            if let Some(name) = &tracked.archetype {
                let field = self
                    .archetypes
                    .as_ref()
                    .ok_or_else(|| SimError::UnknownArchetype { name: name.clone() })?;
                competitor = competitor.with_archetype(field.table.get(name)?);
            }
            tracked_id = Some(competitor.id());
            competitors.push(competitor);
        }

        Ok((competitors, tracked_id))
    }
}

/// What to measure in each trial. Ranks are 1-based.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub trials: usize,
    /// Batch seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Ranks whose points are recorded
    pub ranks: Vec<usize>,
    /// The tracked entrant makes the cut by out-scoring this rank
    pub top_cut_rank: usize,
    /// Rank whose neighbours below are counted as on the bubble
    pub bubble_rank: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            trials: 50,
            seed: None,
            ranks: vec![16, 32, 64],
            top_cut_rank: 64,
            bubble_rank: 32,
        }
    }
}

/// Final result of the tracked entrant in one trial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedResult {
    pub points: f64,
    /// 1-based
    pub rank: usize,
    pub made_cut: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrialSummary {
    pub seed: u64,
    /// `(rank, points)` for each requested rank inside the field
    pub points_at_rank: Vec<(usize, f64)>,
    pub tracked: Option<TrackedResult>,
    /// Competitors ranked below the bubble rank within a point of it
    pub bubble: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloSummary {
    pub trials: Vec<TrialSummary>,
    pub mean_points_at_rank: Vec<(usize, f64)>,
    /// Share of trials in which the tracked entrant made the cut
    pub top_cut_rate: Option<f64>,
    pub mean_bubble: f64,
}

/// Build a fresh field and play one tournament from `seed`.
///
/// The field is drawn first, then the tournament is seeded from the same
/// stream, so a trial is fully determined by its seed.
pub fn run_trial(
    field: &FieldConfig,
    tournament: &TournamentConfig,
    measure: &MonteCarloConfig,
    seed: u64,
) -> Result<TrialSummary> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (competitors, tracked_id) = field.build(&mut rng)?;

    let config = TournamentConfig {
        seed: Some(rng.gen()),
        ..tournament.clone()
    };
    let mut t = Tournament::new(competitors, &config)?;
    t.run()?;
    let standings = t.standings();

    let points_at = |rank: usize| rank.checked_sub(1).and_then(|i| standings.get(i)).map(|c| c.points);

    let points_at_rank = measure
        .ranks
        .iter()
        .filter_map(|&rank| points_at(rank).map(|p| (rank, p)))
        .collect();

    let tracked = tracked_id.and_then(|id| t.find(id)).map(|(idx, c)| TrackedResult {
        points: c.points,
        rank: idx + 1,
        made_cut: points_at(measure.top_cut_rank).map_or(true, |cut| c.points > cut),
    });

    let bubble = match points_at(measure.bubble_rank) {
        Some(cut) => standings[measure.bubble_rank..]
            .iter()
            .filter(|c| c.points > cut - 1.0)
            .count(),
        None => 0,
    };

    Ok(TrialSummary {
        seed,
        points_at_rank,
        tracked,
        bubble,
    })
}

/// Run `measure.trials` independent tournaments in parallel.
///
/// Trial seeds are drawn up front, in trial order, from a master RNG seeded
/// with `measure.seed`, so the batch is reproducible regardless of thread
/// scheduling.
pub fn run_trials(
    field: &FieldConfig,
    tournament: &TournamentConfig,
    measure: &MonteCarloConfig,
) -> Result<MonteCarloSummary> {
    field.validate()?;

    let mut rng = match measure.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..measure.trials).map(|_| rng.gen::<u64>()).collect();

    let trials = seeds
        .par_iter()
        .map(|&seed| run_trial(field, tournament, measure, seed))
        .collect::<Result<Vec<_>>>()?;

    let summary = summarize(trials, measure);
    info!(
        trials = summary.trials.len(),
        top_cut_rate = ?summary.top_cut_rate,
        mean_bubble = summary.mean_bubble,
        "monte carlo batch complete"
    );
    Ok(summary)
}

fn summarize(trials: Vec<TrialSummary>, measure: &MonteCarloConfig) -> MonteCarloSummary {
    let n = trials.len();

    let mean_points_at_rank = measure
        .ranks
        .iter()
        .filter_map(|&rank| {
            let values: Vec<f64> = trials
                .iter()
                .filter_map(|t| t.points_at_rank.iter().find(|(r, _)| *r == rank).map(|(_, p)| *p))
                .collect();
            if values.is_empty() {
                None
            } else {
                Some((rank, values.iter().sum::<f64>() / values.len() as f64))
            }
        })
        .collect();

    let tracked: Vec<&TrackedResult> = trials.iter().filter_map(|t| t.tracked.as_ref()).collect();
    let top_cut_rate = if tracked.is_empty() {
        None
    } else {
        Some(tracked.iter().filter(|r| r.made_cut).count() as f64 / tracked.len() as f64)
    };

    let mean_bubble = if n == 0 {
        0.0
    } else {
        trials.iter().map(|t| t.bubble as f64).sum::<f64>() / n as f64
    };

    MonteCarloSummary {
        trials,
        mean_points_at_rank,
        top_cut_rate,
        mean_bubble,
    }
}
