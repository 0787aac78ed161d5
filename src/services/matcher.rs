// src/services/matcher.rs

//! University matching service.
//!
//! Maps the free-text institution fields of a course onto one directory
//! entry. Lookups go from the most to the least specific filter, and
//! anything still ambiguous after local disambiguation is reported as
//! [`MatchOutcome::NotFound`]: a wrong match would show wrong deadlines.

use std::sync::Arc;

use crate::models::{DirectoryConfig, MatchingConfig, UniversityDirectoryEntry};
use crate::services::directory::{DirectoryQuery, UniversityDirectory};
use crate::utils::{contains_ci, non_blank};

/// Result of a university lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Found(Box<UniversityDirectoryEntry>),
    NotFound,
}

impl MatchOutcome {
    fn found(entry: UniversityDirectoryEntry) -> Self {
        Self::Found(Box::new(entry))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_entry(self) -> Option<UniversityDirectoryEntry> {
        match self {
            Self::Found(entry) => Some(*entry),
            Self::NotFound => None,
        }
    }
}

/// Intermediate state of a narrowing step.
enum Narrowed {
    /// Exactly one entry passed the filter
    Unique(UniversityDirectoryEntry),
    /// No entry passed; the pool is returned untouched
    Unchanged(Vec<UniversityDirectoryEntry>),
    /// Several entries passed; the pool shrinks to them
    Several(Vec<UniversityDirectoryEntry>),
}

fn narrow<F>(pool: Vec<UniversityDirectoryEntry>, predicate: F) -> Narrowed
where
    F: Fn(&UniversityDirectoryEntry) -> bool,
{
    let (mut hits, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|e| predicate(e));
    match hits.len() {
        0 => Narrowed::Unchanged(rest),
        1 => Narrowed::Unique(hits.remove(0)),
        _ => Narrowed::Several(hits),
    }
}

/// Either name contains the other, ignoring case.
fn names_overlap(directory_name: &str, course_name: &str) -> bool {
    contains_ci(directory_name, course_name) || contains_ci(course_name, directory_name)
}

/// Service resolving course institution fields to directory entries.
#[derive(Clone)]
pub struct UniversityMatcher {
    directory: Arc<dyn UniversityDirectory>,
    matching: MatchingConfig,
    name_limit: usize,
    city_limit: usize,
}

impl UniversityMatcher {
    /// Create a matcher over the given directory.
    pub fn new(
        directory: Arc<dyn UniversityDirectory>,
        matching: &MatchingConfig,
        limits: &DirectoryConfig,
    ) -> Self {
        Self {
            directory,
            matching: matching.clone(),
            name_limit: limits.name_limit,
            city_limit: limits.city_limit,
        }
    }

    /// Find the directory entry for a course's university name and city.
    pub async fn find_university(&self, name: Option<&str>, city: Option<&str>) -> MatchOutcome {
        let name = non_blank(name);
        let city = non_blank(city);
        if name.is_none() && city.is_none() {
            return MatchOutcome::NotFound;
        }

        for query in self.lookup_stages(name, city) {
            let candidates = self.directory.search(&query).await;
            match candidates.len() {
                0 => log::debug!("No candidates for {}, relaxing", query),
                1 => {
                    let entry = candidates.into_iter().next();
                    return entry.map_or(MatchOutcome::NotFound, MatchOutcome::found);
                }
                n => {
                    log::debug!("{} candidates for {}, disambiguating", n, query);
                    return self.disambiguate(candidates, name, city);
                }
            }
        }

        log::debug!("No directory entry for name={:?} city={:?}", name, city);
        MatchOutcome::NotFound
    }

    /// Queries to try, most specific first.
    fn lookup_stages(&self, name: Option<&str>, city: Option<&str>) -> Vec<DirectoryQuery> {
        let mut stages = Vec::with_capacity(3);
        if let (Some(name), Some(city)) = (name, city) {
            stages.push(DirectoryQuery::name_and_city(name, city, self.name_limit));
        }
        if let Some(name) = name {
            stages.push(DirectoryQuery::name(name, self.name_limit));
        }
        if let Some(city) = city {
            stages.push(DirectoryQuery::city(city, self.city_limit));
        }
        stages
    }

    /// Pick one entry out of several candidates, or give up.
    pub fn disambiguate(
        &self,
        candidates: Vec<UniversityDirectoryEntry>,
        name: Option<&str>,
        city: Option<&str>,
    ) -> MatchOutcome {
        let mut pool = candidates;

        if let Some(name) = name {
            let lowered = name.to_lowercase();
            pool = match narrow(pool, |e| e.name.to_lowercase() == lowered) {
                Narrowed::Unique(entry) => return MatchOutcome::found(entry),
                Narrowed::Unchanged(pool) | Narrowed::Several(pool) => pool,
            };

            pool = match narrow(pool, |e| names_overlap(&e.name, name)) {
                Narrowed::Unique(entry) => return MatchOutcome::found(entry),
                Narrowed::Unchanged(pool) | Narrowed::Several(pool) => pool,
            };
        }

        let keys = self.city_keys(name, city);
        if keys.is_empty() {
            log::info!("Ambiguous match for {:?}: no city to narrow by", name);
            return MatchOutcome::NotFound;
        }

        let mut in_city: Vec<UniversityDirectoryEntry> = pool
            .into_iter()
            .filter(|e| keys.iter().any(|key| e.located_in(key)))
            .collect();

        match in_city.len() {
            0 => {
                log::info!("Ambiguous match for {:?}: no candidate in {:?}", name, keys);
                MatchOutcome::NotFound
            }
            1 => MatchOutcome::found(in_city.remove(0)),
            n => {
                let pick = name.and_then(|name| {
                    in_city
                        .into_iter()
                        .find(|e| names_overlap(&e.name, name))
                });
                match pick {
                    Some(entry) => MatchOutcome::found(entry),
                    None => {
                        log::info!(
                            "Ambiguous match for {:?}: {} candidates in {:?}",
                            name,
                            n,
                            keys
                        );
                        MatchOutcome::NotFound
                    }
                }
            }
        }
    }

    /// Lowercased city spellings to look for in candidate city/region.
    fn city_keys(&self, name: Option<&str>, city: Option<&str>) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        let mut push = |key: String| {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        };

        if let Some(city) = city {
            push(city.to_lowercase());
            self.matching.aliases_of(city).into_iter().for_each(&mut push);
        }

        // A course whose "university" is just "Roma" is really naming a city.
        if let Some(name) = name.filter(|n| self.matching.is_known_city(n)) {
            push(name.to_lowercase());
            self.matching.aliases_of(name).into_iter().for_each(&mut push);
        }

        keys
    }
}
