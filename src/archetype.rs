use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::constants::{REFERENCE_ARCHETYPES, REFERENCE_WINRATES};
use crate::error::{Result, SimError};

/// A named deck archetype and its expected winrate against other archetypes.
///
/// Winrates are directional: `a.winrate_against(b)` need not equal
/// `1 - b.winrate_against(a)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Archetype {
    name: String,
    winrates: HashMap<String, f64>,
}

impl Archetype {
    /// Create an archetype with an empty matchup row.
    pub fn new(name: impl Into<String>) -> Self {
        Archetype {
            name: name.into(),
            winrates: HashMap::new(),
        }
    }

    /// Create an archetype from `(opponent, winrate)` entries.
    pub fn from_row<I, S>(name: impl Into<String>, row: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Archetype {
            name: name.into(),
            winrates: row.into_iter().map(|(opp, wr)| (opp.into(), wr)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected probability of this archetype beating `opponent`.
    ///
    /// A missing entry is a malformed table, not an absent signal, so it is
    /// reported instead of defaulting to a coin flip.
    pub fn winrate_against(&self, opponent: &str) -> Result<f64> {
        self.winrates
            .get(opponent)
            .copied()
            .ok_or_else(|| SimError::MissingMatchup {
                archetype: self.name.clone(),
                opponent: opponent.to_string(),
            })
    }

    /// Winrate against `opponent`, which must be present and in [0, 1].
    pub fn checked_winrate_against(&self, opponent: &str) -> Result<f64> {
        let value = self.winrate_against(opponent)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(SimError::InvalidProbability {
                archetype: self.name.clone(),
                opponent: opponent.to_string(),
                value,
            });
        }
        Ok(value)
    }

    pub fn has_matchup(&self, opponent: &str) -> bool {
        self.winrates.contains_key(opponent)
    }

    /// Add or replace the winrate against `opponent`.
    pub fn update_winrate(&mut self, opponent: &str, winrate: f64) -> &mut Self {
        self.winrates.insert(opponent.to_string(), winrate);
        self
    }
}

/// Square table of archetype matchups, keyed by archetype name.
///
/// Every archetype in the table is guaranteed to have an in-range winrate
/// against every archetype in the table, itself included. Archetypes are
/// handed out as `Arc`s so many competitors can share one row.
#[derive(Clone, Debug, Default)]
pub struct MatchupTable {
    names: Vec<String>,
    archetypes: HashMap<String, Arc<Archetype>>,
}

impl MatchupTable {
    /// Build a table from `rows[i][j]` = winrate of `names[i]` against `names[j]`.
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != names.len() {
            return Err(SimError::TableShape(format!(
                "{} rows for {} archetypes",
                rows.len(),
                names.len()
            )));
        }

        let mut archetypes = Vec::with_capacity(names.len());
        for (name, row) in names.iter().zip(rows) {
            if row.len() != names.len() {
                return Err(SimError::TableShape(format!(
                    "row {} has {} entries, expected {}",
                    name,
                    row.len(),
                    names.len()
                )));
            }
            archetypes.push(Archetype::from_row(name.clone(), names.iter().cloned().zip(row)));
        }

        Self::from_archetypes(archetypes)
    }

    /// Build a table from prebuilt archetypes, checking that names are
    /// unique and every pairing is covered and in range.
    pub fn from_archetypes(archetypes: Vec<Archetype>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(archetypes.len());
        for archetype in &archetypes {
            if !seen.insert(archetype.name.as_str()) {
                return Err(SimError::DuplicateArchetype {
                    name: archetype.name.clone(),
                });
            }
        }
        let names: Vec<String> = archetypes.iter().map(|a| a.name.clone()).collect();

        for archetype in &archetypes {
            for opponent in &names {
                archetype.checked_winrate_against(opponent)?;
            }
        }

        let archetypes = archetypes
            .into_iter()
            .map(|a| (a.name.clone(), Arc::new(a)))
            .collect();

        Ok(MatchupTable { names, archetypes })
    }

    /// The ten-deck reference table plus the flat "Default" archetype.
    pub fn reference() -> Self {
        let archetypes = REFERENCE_ARCHETYPES
            .iter()
            .zip(REFERENCE_WINRATES.iter())
            .map(|(name, row)| {
                let a = Archetype::from_row(*name, REFERENCE_ARCHETYPES.iter().copied().zip(row.iter().copied()));
                (a.name.clone(), Arc::new(a))
            })
            .collect();

        MatchupTable {
            names: REFERENCE_ARCHETYPES.iter().map(|s| s.to_string()).collect(),
            archetypes,
        }
    }

    /// Read a table from a CSV file.
    ///
    /// The first non-empty line is a header whose first cell is ignored and
    /// whose remaining cells name the columns. Each following line is a row
    /// name followed by that archetype's winrate against each column.
    pub fn read_from_file(filepath: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(filepath)?;
        Self::read_from(BufReader::new(file))
    }

    /// Read a table in the CSV layout of [`MatchupTable::read_from_file`].
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut columns: Option<Vec<String>> = None;
        let mut archetypes = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if columns.is_none() {
                columns = Some(parts[1..].iter().map(|s| s.to_string()).collect());
                continue;
            }
            let cols = columns.as_deref().unwrap_or_default();

            if parts.len() != cols.len() + 1 {
                return Err(SimError::Parse {
                    line: idx + 1,
                    message: format!("expected {} cells, found {}", cols.len() + 1, parts.len()),
                });
            }

            let mut archetype = Archetype::new(parts[0]);
            for (opponent, cell) in cols.iter().zip(&parts[1..]) {
                let winrate: f64 = cell.parse().map_err(|e| SimError::Parse {
                    line: idx + 1,
                    message: format!("invalid winrate {:?}: {}", cell, e),
                })?;
                archetype.update_winrate(opponent, winrate);
            }
            archetypes.push(archetype);
        }

        Self::from_archetypes(archetypes)
    }

    /// Look up a shared archetype by name.
    pub fn get(&self, name: &str) -> Result<Arc<Archetype>> {
        self.archetypes
            .get(name)
            .cloned()
            .ok_or_else(|| SimError::UnknownArchetype {
                name: name.to_string(),
            })
    }

    /// Archetype names in table order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
