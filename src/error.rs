use thiserror::Error;

/// Configuration errors. Everything here is raised before a tournament
/// starts or while resolving a malformed archetype lookup; missing optional
/// signals are never errors.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("archetype weights sum to {total}, expected 1.0")]
    DistributionSum { total: f64 },

    #[error("invalid selection weight {weight} for archetype {archetype}")]
    InvalidWeight { archetype: String, weight: f64 },

    #[error("unknown archetype: {name}")]
    UnknownArchetype { name: String },

    #[error("archetype {name} appears more than once in the matchup table")]
    DuplicateArchetype { name: String },

    #[error("matchup table shape: {0}")]
    TableShape(String),

    #[error("archetype {archetype} has no winrate against {opponent}")]
    MissingMatchup { archetype: String, opponent: String },

    #[error("winrate {value} for {archetype} vs {opponent} is outside [0, 1]")]
    InvalidProbability {
        archetype: String,
        opponent: String,
        value: f64,
    },

    #[error("archetype weight {0} is outside [0, 1]")]
    InvalidArchetypeWeight(f64),

    #[error("invalid skill distribution: {0}")]
    InvalidSkillDistribution(String),

    #[error("tournament field is empty")]
    EmptyField,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
