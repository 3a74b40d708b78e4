//! Entity resolution: maps free-form provider team names onto registry ids.
//!
//! Steps, stopping at the first success:
//! 1. case-insensitive exact match on a canonical name or abbreviation
//! 2. case-insensitive exact match on an alias
//! 3. match after [`normalize_name`] on both sides
//! 4. match on the Soundex-class [`phonetic_key`] of the normalized name
//!
//! The resolver is built from a snapshot of the registry and never writes.

pub mod normalize;
pub mod soundex;

pub use normalize::normalize_name;
pub use soundex::{phonetic_key, soundex};

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::store::{Alias, Store, Team, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Exact,
    Alias,
    Normalized,
    Phonetic,
}

impl ResolutionMethod {
    /// Normalized and phonetic matches are guesses worth a human look
    pub fn is_heuristic(self) -> bool {
        matches!(self, ResolutionMethod::Normalized | ResolutionMethod::Phonetic)
    }
}

/// Accepts a normalized or phonetic match and surfaces it for review
fn heuristic_match(raw: &str, team_id: TeamId, method: ResolutionMethod) -> Resolution {
    warn!(
        target: "reconciliation",
        raw = %raw,
        team_id = %team_id,
        method = ?method,
        "Team resolved heuristically, review the match"
    );
    Resolution::Resolved { team_id, method }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Resolution {
    Resolved {
        team_id: TeamId,
        method: ResolutionMethod,
    },
    Unresolved {
        raw: String,
    },
}

impl Resolution {
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Resolution::Resolved { team_id, .. } => Some(*team_id),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    /// Resolved, but only by a heuristic step
    pub fn needs_review(&self) -> bool {
        matches!(self, Resolution::Resolved { method, .. } if method.is_heuristic())
    }
}

/// Candidate ids per key, kept sorted and deduplicated so the lowest id wins.
#[derive(Debug, Default)]
struct Index(HashMap<String, Vec<TeamId>>);

impl Index {
    fn add(&mut self, key: String, team_id: TeamId) {
        if key.is_empty() {
            return;
        }
        let ids = self.0.entry(key).or_default();
        if let Err(pos) = ids.binary_search(&team_id) {
            ids.insert(pos, team_id);
        }
    }

    fn lookup(&self, key: &str, step: &str, raw: &str) -> Option<TeamId> {
        let ids = self.0.get(key)?;
        if ids.len() > 1 {
            warn!(
                target: "reconciliation",
                raw = %raw,
                key = %key,
                step = step,
                candidates = ?ids,
                "Ambiguous team match, choosing lowest id"
            );
        }
        ids.first().copied()
    }
}

#[derive(Debug, Default)]
pub struct EntityResolver {
    exact: Index,
    aliases: Index,
    source_aliases: HashMap<String, Index>,
    normalized: Index,
    phonetic: Index,
}

impl EntityResolver {
    pub fn new(teams: &[Team], aliases: &[Alias]) -> Self {
        let mut resolver = EntityResolver::default();

        for team in teams {
            resolver.exact.add(team.name.trim().to_lowercase(), team.id);
            resolver.index_fuzzy(&team.name, team.id);
        }
        // Abbreviations only count when no canonical name claims the same text
        let names: HashSet<String> = teams.iter().map(|t| t.name.trim().to_lowercase()).collect();
        for team in teams {
            if let Some(abbreviation) = &team.abbreviation {
                let key = abbreviation.trim().to_lowercase();
                if !names.contains(&key) {
                    resolver.exact.add(key, team.id);
                }
            }
        }

        for alias in aliases {
            let key = alias.alias.trim().to_lowercase();
            resolver.aliases.add(key.clone(), alias.team_id);
            if !alias.source.is_empty() {
                resolver
                    .source_aliases
                    .entry(alias.source.clone())
                    .or_default()
                    .add(key, alias.team_id);
            }
            resolver.index_fuzzy(&alias.alias, alias.team_id);
        }

        debug!(
            "Built entity resolver: teams={}, aliases={}",
            teams.len(),
            aliases.len()
        );
        resolver
    }

    /// Snapshot of the store's current teams and aliases
    pub fn from_store(store: &dyn Store) -> Result<Self, AppError> {
        Ok(Self::new(&store.teams()?, &store.aliases()?))
    }

    fn index_fuzzy(&mut self, name: &str, team_id: TeamId) {
        let normalized = normalize_name(name);
        if let Some(key) = phonetic_key(&normalized) {
            self.phonetic.add(key, team_id);
        }
        self.normalized.add(normalized, team_id);
    }

    /// Resolves `raw` against every team, alias, normalized and phonetic form.
    pub fn resolve(&self, raw: &str) -> Resolution {
        self.resolve_with(raw, None)
    }

    /// Like [`resolve`](Self::resolve), but aliases registered for `source`
    /// are tried before any other alias.
    pub fn resolve_for_source(&self, raw: &str, source: &str) -> Resolution {
        self.resolve_with(raw, Some(source))
    }

    fn resolve_with(&self, raw: &str, source: Option<&str>) -> Resolution {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            return self.unresolved(raw);
        }

        if let Some(team_id) = self.exact.lookup(&lowered, "exact", raw) {
            return Resolution::Resolved {
                team_id,
                method: ResolutionMethod::Exact,
            };
        }

        let scoped = source
            .and_then(|s| self.source_aliases.get(s))
            .and_then(|index| index.lookup(&lowered, "source_alias", raw));
        if let Some(team_id) = scoped.or_else(|| self.aliases.lookup(&lowered, "alias", raw)) {
            return Resolution::Resolved {
                team_id,
                method: ResolutionMethod::Alias,
            };
        }

        let normalized = normalize_name(raw);
        if let Some(team_id) = self.normalized.lookup(&normalized, "normalized", raw) {
            return heuristic_match(raw, team_id, ResolutionMethod::Normalized);
        }

        if let Some(team_id) = phonetic_key(&normalized)
            .and_then(|key| self.phonetic.lookup(&key, "phonetic", raw))
        {
            return heuristic_match(raw, team_id, ResolutionMethod::Phonetic);
        }

        self.unresolved(raw)
    }

    fn unresolved(&self, raw: &str) -> Resolution {
        warn!(target: "reconciliation", raw = %raw, "Unresolved team name");
        Resolution::Unresolved {
            raw: raw.to_string(),
        }
    }
}
