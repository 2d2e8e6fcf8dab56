//! Swiss Core - Monte Carlo simulation of Swiss-system card game events.
//!
//! Competitors carry an optional skill percentile and an optional deck
//! archetype. Each round is paired greedily from the standings, every match
//! is resolved against a single-game win probability that blends skill and
//! archetype matchups, and the field is re-ranked by match points. Many
//! seeded tournaments can be run in parallel to estimate cut lines and a
//! tracked player's chances.

pub mod archetype;
pub mod competitor;
pub mod constants;
pub mod error;
pub mod monte_carlo;
pub mod outcome;
pub mod pairing;
pub mod population;
pub mod skill;
pub mod standings;
pub mod tournament;

pub use archetype::{Archetype, MatchupTable};
pub use competitor::{Competitor, CompetitorId, Skill};
pub use constants::{BASE_CUTOFF, DEFAULT_ARCHETYPE, REFERENCE_ROUNDS};
pub use error::{Result, SimError};
pub use monte_carlo::{
    run_trial, run_trials, ArchetypeField, FieldConfig, MonteCarloConfig, MonteCarloSummary,
    TrackedEntrant, TrackedResult, TrialSummary,
};
pub use outcome::{play_series, resolve_match, win_threshold, Format, OutcomeConfig, SeriesScore};
pub use pairing::{count_byes, find_pairings, Pairing};
pub use population::ArchetypeDistribution;
pub use skill::SkillDistribution;
pub use standings::{
    apply_results, rank, standings_table, MatchResult, PointTable, PointsOnly, StandingsRow,
    TieBreak,
};
pub use tournament::{default_rounds, MatchRecord, RoundReport, Tournament, TournamentConfig};
