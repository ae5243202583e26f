//! Free-text labels to short fixed-width codes.
//!
//! Resolution order, first hit wins:
//! 1. empty / `none` labels map to the flavor's default code
//! 2. the flavor's cache (built-in table, configured extras, earlier resolutions)
//! 3. the optional [`AbbreviationOracle`]
//! 4. a deterministic heuristic (initials of words, else a prefix of the single word)

pub mod oracle;
pub mod tables;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use oracle::{oracle_from_config, resolve_api_key, AbbreviationOracle, OracleRequest};
#[cfg(feature = "openai")]
pub use oracle::OpenAiOracle;

/// Width used for every code the generator asks for.
pub const DEFAULT_MAX_LENGTH: usize = 4;

/// Which vocabulary a label belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Buildings, floors, areas and rooms.
    Location,
    /// Equipment names and asset systems.
    Equipment,
}

impl Flavor {
    /// Code returned for empty or `none` labels.
    pub fn default_code(self) -> &'static str {
        match self {
            Flavor::Location => "NA",
            Flavor::Equipment => "EQP",
        }
    }

    pub fn builtin_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Flavor::Location => tables::LOCATION_ABBREVIATIONS,
            Flavor::Equipment => tables::EQUIPMENT_ABBREVIATIONS,
        }
    }

    /// System instruction sent to the oracle.
    pub fn instructions(self, max_length: usize) -> String {
        match self {
            Flavor::Location => format!(
                "Create a {max_length}-letter abbreviation for a building location or area name. \
                 Make it intuitive and memorable. Response should be ONLY the abbreviation in uppercase."
            ),
            Flavor::Equipment => format!(
                "Create a {max_length}-letter abbreviation for facility equipment or system. \
                 Use industry standard abbreviations where possible. Response should be ONLY the abbreviation in uppercase."
            ),
        }
    }
}

/// Where a cached code came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    Static,
    Oracle,
    Heuristic,
}

#[derive(Clone, Debug)]
struct CachedCode {
    code: String,
    source: CodeSource,
}

/// Normalized label -> code. Append-only for the lifetime of its [`Abbreviator`].
#[derive(Clone, Debug, Default)]
pub struct AbbreviationCache {
    entries: HashMap<String, CachedCode>,
}

impl AbbreviationCache {
    /// Seed with the flavor's built-in table, then `extra` entries on top.
    pub fn seeded(flavor: Flavor, extra: &BTreeMap<String, String>) -> Self {
        let mut cache = Self::default();
        for (label, code) in flavor.builtin_table() {
            cache.insert(normalize_label(label), code.to_string(), CodeSource::Static);
        }
        for (label, code) in extra {
            cache.insert(normalize_label(label), code.clone(), CodeSource::Static);
        }
        cache
    }

    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(|c| c.code.as_str())
    }

    pub fn source(&self, normalized: &str) -> Option<CodeSource> {
        self.entries.get(normalized).map(|c| c.source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, normalized: String, code: String, source: CodeSource) {
        self.entries.insert(normalized, CachedCode { code, source });
    }
}

/// Lowercase + trim; the cache key for a label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// One flavor's abbreviation pipeline and its private cache.
pub struct Abbreviator {
    flavor: Flavor,
    cache: AbbreviationCache,
    oracle: Option<Arc<dyn AbbreviationOracle>>,
}

impl std::fmt::Debug for Abbreviator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abbreviator")
            .field("flavor", &self.flavor)
            .field("cache_entries", &self.cache.len())
            .field("oracle", &self.oracle.is_some())
            .finish()
    }
}

impl Abbreviator {
    pub fn new(flavor: Flavor) -> Self {
        Self::with_cache(flavor, AbbreviationCache::seeded(flavor, &BTreeMap::new()))
    }

    pub fn with_cache(flavor: Flavor, cache: AbbreviationCache) -> Self {
        Self {
            flavor,
            cache,
            oracle: None,
        }
    }

    pub fn with_oracle(mut self, oracle: Option<Arc<dyn AbbreviationOracle>>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn cache(&self) -> &AbbreviationCache {
        &self.cache
    }

    /// Resolve `label` to a code of at most `max_length` characters.
    ///
    /// Cached entries (including configured static ones) are returned verbatim, even when longer
    /// than `max_length`. Every non-static resolution is cached, so the oracle is asked at most
    /// once per label.
    pub fn abbreviate(&mut self, label: &str, max_length: usize) -> String {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return self.flavor.default_code().to_string();
        }

        let key = normalize_label(trimmed);
        if let Some(code) = self.cache.get(&key) {
            return code.to_string();
        }

        if let Some(code) = self.ask_oracle(&key, max_length) {
            log::debug!("oracle abbreviated {key:?} as {code}");
            self.cache.insert(key, code.clone(), CodeSource::Oracle);
            return code;
        }

        let code = heuristic_code(&key, max_length, self.flavor.default_code());
        self.cache.insert(key, code.clone(), CodeSource::Heuristic);
        code
    }

    fn ask_oracle(&self, key: &str, max_length: usize) -> Option<String> {
        let oracle = self.oracle.as_ref()?;
        let instructions = self.flavor.instructions(max_length);
        let raw = oracle.suggest(&OracleRequest {
            label: key,
            max_length,
            instructions: &instructions,
        })?;
        let code = sanitize_suggestion(&raw, max_length);
        (!code.is_empty()).then_some(code)
    }
}

/// Uppercase, keep only `A-Z`, truncate.
fn sanitize_suggestion(raw: &str, max_length: usize) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .take(max_length)
        .collect()
}

fn heuristic_code(normalized: &str, max_length: usize, default_code: &str) -> String {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let code: String = match words.as_slice() {
        [] => String::new(),
        [word] => word.chars().take(max_length).collect::<String>().to_uppercase(),
        _ => words
            .iter()
            .filter_map(|w| w.chars().next())
            .take(max_length)
            .collect::<String>()
            .to_uppercase(),
    };

    if code.is_empty() {
        default_code.to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn empty_and_none_labels_use_the_flavor_default() {
        let mut location = Abbreviator::new(Flavor::Location);
        let mut equipment = Abbreviator::new(Flavor::Equipment);

        for label in ["", "   ", "none", "NONE", " None "] {
            assert_eq!(location.abbreviate(label, 4), "NA");
            assert_eq!(equipment.abbreviate(label, 4), "EQP");
        }
        // Nothing was resolved, so nothing was cached beyond the seed.
        assert_eq!(
            location.cache().len(),
            Abbreviator::new(Flavor::Location).cache().len()
        );
    }

    #[test]
    fn static_entries_win_and_are_not_truncated() {
        let mut equipment = Abbreviator::new(Flavor::Equipment);
        assert_eq!(equipment.abbreviate("Exhaust Fan", 4), "EXF");
        assert_eq!(equipment.abbreviate("  CCTV ", 2), "CCTV");
        assert_eq!(equipment.abbreviate("Sanitary Wares & Fittings", 4), "SNW");
    }

    #[test]
    fn heuristic_uses_initials_or_prefix() {
        let mut location = Abbreviator::new(Flavor::Location);
        assert_eq!(location.abbreviate("Nobles Residential Compound", 4), "NRC");
        assert_eq!(location.abbreviate("a b c d e f", 4), "ABCD");
        assert_eq!(location.abbreviate("Reception", 4), "RECE");
        assert_eq!(location.abbreviate("Lab", 4), "LAB");
        assert_eq!(
            location.cache().source("nobles residential compound"),
            Some(CodeSource::Heuristic)
        );
    }

    #[test]
    fn heuristic_never_returns_an_empty_code() {
        assert_eq!(heuristic_code("lobby", 0, "NA"), "NA");
        assert_eq!(heuristic_code("", 4, "EQP"), "EQP");
    }

    #[test]
    fn oracle_suggestions_are_sanitized_and_cached() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let oracle = move |req: &OracleRequest<'_>| {
            seen.set(seen.get() + 1);
            assert_eq!(req.label, "main lobby");
            assert!(req.instructions.contains("building location"));
            Some(" m-lb.y2 ".to_string())
        };

        let mut location = Abbreviator::new(Flavor::Location)
            .with_oracle(Some(Arc::new(oracle) as Arc<dyn AbbreviationOracle>));
        assert_eq!(location.abbreviate("Main Lobby", 3), "MLB");
        assert_eq!(location.abbreviate("MAIN LOBBY ", 3), "MLB");
        assert_eq!(calls.get(), 1);
        assert_eq!(location.cache().source("main lobby"), Some(CodeSource::Oracle));
    }

    #[test]
    fn failed_oracle_is_not_retried_for_the_same_label() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let oracle = move |_: &OracleRequest<'_>| {
            seen.set(seen.get() + 1);
            Some("123 !!".to_string())
        };

        let mut equipment = Abbreviator::new(Flavor::Equipment)
            .with_oracle(Some(Arc::new(oracle) as Arc<dyn AbbreviationOracle>));
        assert_eq!(equipment.abbreviate("Booster Pump Set", 4), "BPS");
        assert_eq!(equipment.abbreviate("Booster Pump Set", 4), "BPS");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn flavors_keep_separate_caches() {
        let mut location = Abbreviator::new(Flavor::Location);
        let mut equipment = Abbreviator::new(Flavor::Equipment);

        assert_eq!(location.abbreviate("chiller", 4), "CHIL");
        assert_eq!(equipment.abbreviate("chiller", 4), "CHR");
        assert_eq!(location.abbreviate("food court", 4), "FC");
        assert_eq!(equipment.abbreviate("food court", 4), "FC");
        assert_eq!(equipment.cache().source("food court"), Some(CodeSource::Heuristic));
    }

    #[test]
    fn configured_entries_override_builtins() {
        let mut extra = BTreeMap::new();
        extra.insert("Exhaust Fan".to_string(), "EXHF".to_string());
        extra.insert("pool deck".to_string(), "PDK".to_string());

        let mut equipment =
            Abbreviator::with_cache(Flavor::Equipment, AbbreviationCache::seeded(Flavor::Equipment, &extra));
        assert_eq!(equipment.abbreviate("exhaust fan", 4), "EXHF");
        assert_eq!(equipment.abbreviate("Pool Deck", 4), "PDK");
    }
}
