use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::competitor::{Competitor, CompetitorId};
use crate::constants::{
    BEST_OF_THREE_SINGLE_WIN_POINTS, PLACEHOLDER_WIN_PCT, SERIES_LOSS_POINTS, SERIES_WIN_POINTS,
    SPLIT_POINTS,
};
use crate::outcome::{Format, SeriesScore};
use crate::pairing::Pairing;

/// Match points by series result.
///
/// A single game win in best-of-3 scores `single_win_best_of_three`, which
/// defaults to zero. Any series with two or more game wins is a win.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointTable {
    pub series_win: f64,
    pub split_best_of_two: f64,
    pub single_win_best_of_three: f64,
    pub series_loss: f64,
}

impl Default for PointTable {
    fn default() -> Self {
        PointTable {
            series_win: SERIES_WIN_POINTS,
            split_best_of_two: SPLIT_POINTS,
            single_win_best_of_three: BEST_OF_THREE_SINGLE_WIN_POINTS,
            series_loss: SERIES_LOSS_POINTS,
        }
    }
}

impl PointTable {
    pub fn points_for(&self, wins: u32, format: Format) -> f64 {
        match (wins, format) {
            (w, _) if w >= 2 => self.series_win,
            (1, Format::BestOfTwo) => self.split_best_of_two,
            (1, Format::BestOfThree) => self.single_win_best_of_three,
            _ => self.series_loss,
        }
    }
}

/// Secondary ordering between competitors on equal points.
pub trait TieBreak: Send + Sync {
    fn compare(&self, a: &Competitor, b: &Competitor) -> Ordering;
}

/// Orders by points alone; equal points keep their incoming order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointsOnly;

impl TieBreak for PointsOnly {
    fn compare(&self, _a: &Competitor, _b: &Competitor) -> Ordering {
        Ordering::Equal
    }
}

/// A pairing together with its series score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub pairing: Pairing,
    pub score: SeriesScore,
}

/// Award points and extend histories for one round.
///
/// Consumes the round's standings snapshot and returns the competitors in
/// pairing order: each pairing's first member, then its second.
pub fn apply_results(
    standings: Vec<Competitor>,
    results: &[MatchResult],
    points: &PointTable,
    format: Format,
) -> Vec<Competitor> {
    let ids: Vec<CompetitorId> = standings.iter().map(Competitor::id).collect();
    let mut slots: Vec<Option<Competitor>> = standings.into_iter().map(Some).collect();
    let mut next = Vec::with_capacity(slots.len());

    for result in results {
        let first = result.pairing.first;
        let second = result.pairing.second;

        if let Some(mut player) = slots[first].take() {
            player.played.push(second.map(|j| ids[j]));
            player.points += points.points_for(result.score.wins_a, format);
            next.push(player);
        }

        if let Some(j) = second {
            if let Some(mut player) = slots[j].take() {
                player.played.push(Some(ids[first]));
                player.points += points.points_for(result.score.wins_b, format);
                next.push(player);
            }
        }
    }

    // Anyone left out of the results keeps their relative order at the back
    next.extend(slots.into_iter().flatten());
    next
}

/// Stable sort by points descending, then by `tiebreak`.
pub fn rank(mut competitors: Vec<Competitor>, tiebreak: &dyn TieBreak) -> Vec<Competitor> {
    competitors.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| tiebreak.compare(a, b))
    });
    competitors
}

/// One line of the standings table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandingsRow {
    pub rank: usize,
    pub id: CompetitorId,
    pub points: f64,
    /// Always `PLACEHOLDER_WIN_PCT`; not computed yet
    pub opp_win_pct: f64,
    /// Always `PLACEHOLDER_WIN_PCT`; not computed yet
    pub opp_opp_win_pct: f64,
    pub skill_percentile: f64,
}

/// Tabulate ranked competitors, ranks starting at 1.
pub fn standings_table(ranked: &[Competitor]) -> Vec<StandingsRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, c)| StandingsRow {
            rank: idx + 1,
            id: c.id(),
            points: c.points,
            opp_win_pct: PLACEHOLDER_WIN_PCT,
            opp_opp_win_pct: PLACEHOLDER_WIN_PCT,
            skill_percentile: c.percentile(),
        })
        .collect()
}
