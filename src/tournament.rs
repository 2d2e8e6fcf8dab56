use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::archetype::Archetype;
use crate::competitor::{Competitor, CompetitorId};
use crate::constants::REFERENCE_ROUNDS;
use crate::error::{Result, SimError};
use crate::outcome::{resolve_match, Format, OutcomeConfig, SeriesScore};
use crate::pairing::{count_byes, find_pairings};
use crate::standings::{
    apply_results, rank, standings_table, MatchResult, PointTable, PointsOnly, StandingsRow,
    TieBreak,
};

/// Tournament settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Number of Swiss rounds; `None` means ceil(log2(field size))
    pub rounds: Option<usize>,

    pub format: Format,

    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    pub points: PointTable,

    pub outcome: OutcomeConfig,
}

impl TournamentConfig {
    /// Settings of the reference event: nine rounds of best-of-two.
    pub fn reference() -> Self {
        TournamentConfig {
            rounds: Some(REFERENCE_ROUNDS),
            ..TournamentConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.outcome.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(filepath)?;
        Self::from_json_str(&json)
    }
}

/// ceil(log2(n)), the number of rounds needed to leave one undefeated
/// player in a field of `n`.
pub fn default_rounds(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}

/// A played series, by competitor identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchRecord {
    pub a: CompetitorId,
    /// `None` for a bye
    pub b: Option<CompetitorId>,
    pub score: SeriesScore,
}

/// What happened in one round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    pub matches: Vec<MatchRecord>,
    pub byes: usize,
    pub points_awarded: f64,
}

/// Swiss tournament controller.
///
/// Owns the field and the RNG. Each round pairs the current standings,
/// resolves every pairing, then replaces the standings with the re-ranked
/// field.
pub struct Tournament {
    standings: Vec<Competitor>,
    num_rounds: usize,
    rounds_played: usize,
    format: Format,
    points: PointTable,
    outcome: OutcomeConfig,
    tiebreak: Box<dyn TieBreak>,
    rng: ChaCha8Rng,
}

impl Tournament {
    /// Create a tournament over `competitors`, in their initial seeding order.
    ///
    /// # Errors
    /// * `EmptyField` if there are no competitors
    /// * `InvalidArchetypeWeight` if the outcome settings are out of range
    /// * `MissingMatchup` if two archetypes in the field can't be looked up
    ///   against each other
    /// * `InvalidProbability` if such a lookup is outside [0, 1]
    pub fn new(competitors: Vec<Competitor>, config: &TournamentConfig) -> Result<Self> {
        if competitors.is_empty() {
            return Err(SimError::EmptyField);
        }
        config.validate()?;
        validate_matchups(&competitors)?;

        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Tournament {
            num_rounds: config.rounds.unwrap_or_else(|| default_rounds(competitors.len())),
            standings: competitors,
            rounds_played: 0,
            format: config.format,
            points: config.points,
            outcome: config.outcome,
            tiebreak: Box::new(PointsOnly),
            rng,
        })
    }

    /// Replace the points-only ordering of tied competitors.
    pub fn with_tiebreak(mut self, tiebreak: Box<dyn TieBreak>) -> Self {
        self.tiebreak = tiebreak;
        self
    }

    pub fn num_rounds(&self) -> usize {
        self.num_rounds
    }

    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    pub fn is_complete(&self) -> bool {
        self.rounds_played >= self.num_rounds
    }

    /// Current standings, best first.
    pub fn standings(&self) -> &[Competitor] {
        &self.standings
    }

    pub fn standings_table(&self) -> Vec<StandingsRow> {
        standings_table(&self.standings)
    }

    /// Position (0-based) and state of a competitor.
    pub fn find(&self, id: CompetitorId) -> Option<(usize, &Competitor)> {
        self.standings.iter().enumerate().find(|(_, c)| c.id() == id)
    }

    pub fn into_standings(self) -> Vec<Competitor> {
        self.standings
    }

    /// Pair, play and score one round.
    ///
    /// Standings are left untouched if any match fails to resolve.
    pub fn play_round(&mut self) -> Result<RoundReport> {
        let pairings = find_pairings(&self.standings);

        let mut results = Vec::with_capacity(pairings.len());
        for pairing in &pairings {
            let a = &self.standings[pairing.first];
            let b = pairing.second.map(|j| &self.standings[j]);
            let score = resolve_match(a, b, self.format, &self.outcome, &mut self.rng)?;
            results.push(MatchResult {
                pairing: *pairing,
                score,
            });
        }

        let matches = results
            .iter()
            .map(|r| MatchRecord {
                a: self.standings[r.pairing.first].id(),
                b: r.pairing.second.map(|j| self.standings[j].id()),
                score: r.score,
            })
            .collect();

        let before = total_points(&self.standings);
        let field = std::mem::take(&mut self.standings);
        let next = apply_results(field, &results, &self.points, self.format);
        self.standings = rank(next, self.tiebreak.as_ref());
        self.rounds_played += 1;

        let byes = count_byes(&pairings);
        let leader_points = self.standings.first().map_or(0.0, |c| c.points);
        debug!(
            round = self.rounds_played,
            pairings = pairings.len(),
            byes,
            leader_points,
            "round complete"
        );
        if byes > 1 {
            warn!(round = self.rounds_played, byes, "greedy pairing fell back to extra byes");
        }

        Ok(RoundReport {
            round: self.rounds_played,
            matches,
            byes,
            points_awarded: total_points(&self.standings) - before,
        })
    }

    /// Play all remaining rounds.
    pub fn run(&mut self) -> Result<Vec<RoundReport>> {
        let mut reports = Vec::with_capacity(self.num_rounds.saturating_sub(self.rounds_played));
        while !self.is_complete() {
            reports.push(self.play_round()?);
        }

        if let Some(winner) = self.standings.first() {
            info!(
                competitors = self.standings.len(),
                rounds = self.rounds_played,
                winner = %winner,
                winner_points = winner.points,
                "tournament complete"
            );
        }
        Ok(reports)
    }
}

fn total_points(competitors: &[Competitor]) -> f64 {
    competitors.iter().map(|c| c.points).sum()
}

/// Every archetype in the field must have an in-range winrate against every
/// other archetype in the field.
fn validate_matchups(competitors: &[Competitor]) -> Result<()> {
    let mut archetypes: BTreeMap<&str, &Archetype> = BTreeMap::new();
    for archetype in competitors.iter().filter_map(Competitor::archetype) {
        archetypes.entry(archetype.name()).or_insert(&**archetype);
    }

    for archetype in archetypes.values() {
        for opponent in archetypes.keys() {
            archetype.checked_winrate_against(opponent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::MatchupTable;
    use crate::outcome::win_threshold;
    use crate::skill::SkillDistribution;
    use rand::Rng;
    use std::cmp::Ordering;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn seeded(seed: u64, rounds: Option<usize>) -> TournamentConfig {
        TournamentConfig {
            rounds,
            seed: Some(seed),
            ..TournamentConfig::default()
        }
    }

    fn skilled_field(n: u32, seed: u64) -> Vec<Competitor> {
        let dist = SkillDistribution::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let raw = dist.sample(&mut rng).unwrap();
                Competitor::new(i).with_skill(raw, &dist).unwrap()
            })
            .collect()
    }

    fn decked_field(n: u32, seed: u64) -> Vec<Competitor> {
        let table = MatchupTable::reference();
        let names = table.names().to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        skilled_field(n, seed)
            .into_iter()
            .map(|c| {
                let name = &names[rng.gen_range(0..names.len())];
                c.with_archetype(table.get(name).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_default_rounds() {
        assert_eq!(default_rounds(1), 0);
        assert_eq!(default_rounds(2), 1);
        assert_eq!(default_rounds(3), 2);
        assert_eq!(default_rounds(4), 2);
        assert_eq!(default_rounds(5), 3);
        assert_eq!(default_rounds(2048), 11);
    }

    #[test]
    fn test_round_override() {
        let t = Tournament::new(skilled_field(2048, 1), &seeded(1, Some(9))).unwrap();
        assert_eq!(t.num_rounds(), 9);

        let t = Tournament::new(skilled_field(100, 1), &seeded(1, None)).unwrap();
        assert_eq!(t.num_rounds(), 7);
    }

    #[test]
    fn test_two_player_single_round() {
        for seed in 0..20 {
            let players: Vec<Competitor> = (0..2).map(Competitor::new).collect();
            assert_eq!(
                win_threshold(&players[0], &players[1], &OutcomeConfig::default()).unwrap(),
                0.5
            );

            let mut t = Tournament::new(players, &seeded(seed, Some(1))).unwrap();
            let reports = t.run().unwrap();
            assert_eq!(reports.len(), 1);

            let report = &reports[0];
            assert_eq!(report.matches.len(), 1);
            assert_eq!(report.byes, 0);
            assert!(report.matches[0].b.is_some());
            assert_eq!(report.matches[0].score.games(), 2);

            let points: f64 = t.standings().iter().map(|c| c.points).sum();
            assert!(points == 7.0 || points == 6.0);
        }
    }

    #[test]
    fn test_three_players_one_bye() {
        let players: Vec<Competitor> = (0..3).map(Competitor::new).collect();
        let mut t = Tournament::new(players, &seeded(3, Some(1))).unwrap();
        let report = t.play_round().unwrap();

        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.byes, 1);

        let bye = report.matches.iter().find(|m| m.b.is_none()).unwrap();
        assert_eq!(bye.a, CompetitorId(2));
        let (_, recipient) = t.find(bye.a).unwrap();
        assert_eq!(recipient.points, 7.0);
        assert_eq!(recipient.played, vec![None]);
    }

    #[test]
    fn test_points_awarded_per_round() {
        let points = PointTable::default();
        let mut t = Tournament::new(skilled_field(65, 4), &seeded(4, None)).unwrap();

        for report in t.run().unwrap() {
            let expected: f64 = report
                .matches
                .iter()
                .map(|m| match m.b {
                    None => {
                        assert_eq!(points.points_for(m.score.wins_a, Format::BestOfTwo), 7.0);
                        7.0
                    }
                    Some(_) if m.score.wins_a == 1 => 6.0,
                    Some(_) => 7.0,
                })
                .sum();
            assert_eq!(report.points_awarded, expected, "round {}", report.round);
        }
    }

    #[test]
    fn test_no_rematches_and_bounded_byes() {
        let mut t = Tournament::new(decked_field(257, 5), &seeded(5, Some(9))).unwrap();
        let reports = t.run().unwrap();

        for report in &reports {
            // A bye recipient must have met every later bye recipient already
            assert!(
                report.byes <= report.round,
                "round {} handed out {} byes",
                report.round,
                report.byes
            );
        }

        for c in t.standings() {
            assert_eq!(c.rounds_played(), 9);
            let opponents: Vec<CompetitorId> = c.played.iter().flatten().copied().collect();
            let distinct: HashSet<CompetitorId> = opponents.iter().copied().collect();
            assert_eq!(distinct.len(), opponents.len(), "{} had a rematch", c);
        }
    }

    #[test]
    fn test_standings_sorted_by_points() {
        let mut t = Tournament::new(decked_field(128, 6), &seeded(6, None)).unwrap();
        t.run().unwrap();
        assert!(t.is_complete());
        for pair in t.standings().windows(2) {
            assert!(pair[0].points >= pair[1].points);
        }

        let table = t.standings_table();
        assert_eq!(table.len(), 128);
        assert_eq!(table[0].id, t.standings()[0].id());
    }

    #[test]
    fn test_seeded_runs_identical() {
        let run = |seed: u64| {
            let mut t = Tournament::new(decked_field(200, 8), &seeded(seed, Some(8))).unwrap();
            t.run().unwrap();
            t.into_standings()
                .into_iter()
                .map(|c| (c.id(), c.points.to_bits(), c.played))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(99), run(99));
        assert_ne!(run(99), run(100));
    }

    #[test]
    fn test_empty_field() {
        assert!(matches!(
            Tournament::new(Vec::new(), &TournamentConfig::default()),
            Err(SimError::EmptyField)
        ));
    }

    #[test]
    fn test_missing_matchup_fails_fast() {
        let a = Arc::new(Archetype::from_row("A", [("A", 0.5), ("B", 0.6)]));
        let b = Arc::new(Archetype::from_row("B", [("B", 0.5)]));
        let players = vec![
            Competitor::new(0).with_archetype(a),
            Competitor::new(1).with_archetype(b),
        ];
        assert!(matches!(
            Tournament::new(players, &TournamentConfig::default()),
            Err(SimError::MissingMatchup { .. })
        ));

        let a = Arc::new(Archetype::from_row("A", [("A", 0.5), ("B", 1.8)]));
        let b = Arc::new(Archetype::from_row("B", [("A", -0.6), ("B", 0.5)]));
        let players = vec![
            Competitor::new(0).with_archetype(a),
            Competitor::new(1).with_archetype(b),
        ];
        match Tournament::new(players, &TournamentConfig::default()) {
            Err(SimError::InvalidProbability { value, .. }) => assert!(value == 1.8 || value == -0.6),
            Err(other) => panic!("expected InvalidProbability, got {:?}", other),
            Ok(_) => panic!("out-of-range winrates were accepted"),
        }
    }

    struct HigherSkillFirst;

    impl TieBreak for HigherSkillFirst {
        fn compare(&self, a: &Competitor, b: &Competitor) -> Ordering {
            b.percentile().total_cmp(&a.percentile())
        }
    }

    #[test]
    fn test_custom_tiebreak_applied() {
        let mut t = Tournament::new(skilled_field(64, 10), &seeded(10, Some(3)))
            .unwrap()
            .with_tiebreak(Box::new(HigherSkillFirst));
        t.run().unwrap();

        for pair in t.standings().windows(2) {
            if pair[0].points == pair[1].points {
                assert!(pair[0].percentile() >= pair[1].percentile());
            }
        }
    }

    #[test]
    fn test_config_from_json() {
        let config = TournamentConfig::from_json_str(
            r#"{
                "rounds": 9,
                "format": "best_of_three",
                "seed": 12,
                "points": { "single_win_best_of_three": 1.0 },
                "outcome": { "archetype_weight": 0.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.rounds, Some(9));
        assert_eq!(config.format, Format::BestOfThree);
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.points.series_win, 7.0);
        assert_eq!(config.points.single_win_best_of_three, 1.0);
        assert_eq!(config.outcome.archetype_weight, 0.0);

        let config = TournamentConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TournamentConfig::default());
        assert_eq!(config.outcome.archetype_weight, 1.0);
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            TournamentConfig::from_json_str(r#"{"format": "best_of_five"}"#),
            Err(SimError::Config(_))
        ));
        assert!(matches!(
            TournamentConfig::from_json_str(r#"{"outcome": {"archetype_weight": 1.5}}"#),
            Err(SimError::InvalidArchetypeWeight(_))
        ));

        let config = TournamentConfig {
            outcome: OutcomeConfig {
                archetype_weight: -1.0,
            },
            ..TournamentConfig::default()
        };
        assert!(matches!(
            Tournament::new(skilled_field(4, 1), &config),
            Err(SimError::InvalidArchetypeWeight(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/tournament.json");
        let config = TournamentConfig::from_file(path).unwrap();
        assert_eq!(config.rounds, Some(9));
        assert_eq!(config.format, Format::BestOfTwo);
        assert_eq!(config.seed, Some(2048));
        assert_eq!(config.points, PointTable::default());

        assert!(matches!(
            TournamentConfig::from_file("tests/data/no_such_config.json"),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn test_reference_config() {
        let config = TournamentConfig::reference();
        let t = Tournament::new(skilled_field(2048, 11), &config).unwrap();
        assert_eq!(t.num_rounds(), REFERENCE_ROUNDS);
        assert_eq!(config.format, Format::BestOfTwo);
    }
}
