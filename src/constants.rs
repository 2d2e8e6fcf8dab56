/// Single-game win probability when no signal separates the two players
pub const BASE_CUTOFF: f64 = 0.5;

/// Points for winning a series (2+ game wins, byes included)
pub const SERIES_WIN_POINTS: f64 = 7.0;

/// Points for a 1-1 split in a best-of-2 series
pub const SPLIT_POINTS: f64 = 3.0;

/// Points for a single game win in a best-of-3 series
pub const BEST_OF_THREE_SINGLE_WIN_POINTS: f64 = 0.0;

/// Points for a series with no game wins
pub const SERIES_LOSS_POINTS: f64 = 0.0;

/// Allowed drift when checking that selection weights sum to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-8;

/// Archetype every table carries, with a flat 50% row
pub const DEFAULT_ARCHETYPE: &str = "Default";

/// Value reported in the opponent win % columns until they are computed
pub const PLACEHOLDER_WIN_PCT: f64 = 100.0;

/// Round count used for the reference 2048-player field
pub const REFERENCE_ROUNDS: usize = 9;

/// Archetype names of the reference matchup table, in column order
pub const REFERENCE_ARCHETYPES: [&str; 11] = [
    "GP Tempo",
    "RB Dime",
    "AS Steelsong",
    "BS Ramp",
    "GS Aggro Discard",
    "AR Mufasa",
    "Am Am Hyperaggro",
    "PS Jafar",
    "RP Control",
    "BP Blurple",
    DEFAULT_ARCHETYPE,
];

/// Winrate rows of the reference table; row `i` is `REFERENCE_ARCHETYPES[i]`
/// against each column archetype.
pub const REFERENCE_WINRATES: [[f64; 11]; 11] = [
    [0.5, 0.75, 0.5, 0.55, 0.45, 0.66, 0.5, 0.55, 0.7, 0.5, 0.5],
    [0.4, 0.5, 0.75, 0.8, 0.65, 0.5, 0.3, 0.85, 0.5, 0.3, 0.5],
    [0.5, 0.2, 0.5, 0.6, 0.75, 0.75, 0.6, 0.7, 0.6, 0.3, 0.5],
    [0.7, 0.3, 0.4, 0.5, 0.7, 0.4, 0.6, 0.7, 0.6, 0.5, 0.5],
    [0.55, 0.7, 0.4, 0.5, 0.5, 0.66, 0.75, 0.3, 0.75, 0.55, 0.5],
    [0.6, 0.65, 0.6, 0.85, 0.65, 0.5, 0.5, 0.6, 0.66, 0.5, 0.5],
    [0.4, 0.8, 0.3, 0.7, 0.3, 0.7, 0.5, 0.35, 0.7, 0.7, 0.5],
    [0.6, 0.4, 0.3, 0.4, 0.5, 0.4, 0.7, 0.5, 0.65, 0.3, 0.5],
    [0.5, 0.6, 0.55, 0.45, 0.35, 0.45, 0.3, 0.55, 0.5, 0.5, 0.5],
    [0.65, 0.6, 0.65, 0.6, 0.55, 0.5, 0.35, 0.65, 0.6, 0.5, 0.5],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
];

/// Share of the reference field playing each archetype, same order as
/// `REFERENCE_ARCHETYPES`.
pub const REFERENCE_ARCHETYPE_SHARES: [f64; 11] =
    [0.05, 0.2, 0.2, 0.05, 0.1, 0.05, 0.05, 0.05, 0.2, 0.05, 0.0];

/// Random entrants in the reference field, before the tracked entrant
pub const REFERENCE_FIELD_SIZE: usize = 2047;

/// Archetype played by the tracked entrant of the reference field
pub const REFERENCE_TRACKED_ARCHETYPE: &str = "RP Control";

/// Raw skill of the tracked entrant under a standard normal
pub const REFERENCE_TRACKED_SKILL: f64 = 2.5;
