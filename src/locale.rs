// File: src/locale.rs
//! Built-in decomposition policies and the serde form they share with
//! custom, file-loaded policies.
use crate::core::config::{Configuration, Interfix, RestoreElidedE};
use crate::core::decompounder::Decompounder;
use crate::dictionary::{
    Dictionary, MemoryCacheDictionary, SuffixRule, SuffixVariantExpander, VariantDictionary,
};
use crate::error::{ConfigError, Error};
use crate::persistence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_CACHE_ENTRIES: usize = 15_000;

const GERMAN_ALLOW_LIST: [&str; 25] = [
    "amt", "art", "bad", "bau", "bus", "ehe", "eis", "erz", "fee", "gut", "hof", "hut", "klo",
    "mut", "rad", "ruf", "see", "tag", "tee", "tal", "tor", "typ", "weg", "zug", "ei",
];

/// Named extra candidate generators a policy can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// `schul|hof` -> `schule` + `hof`, penalty 1.
    RestoreElidedE,
}

/// Everything a locale decides about decomposition, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalePolicy {
    pub minimum_length: usize,
    #[serde(default)]
    pub interfixes: Vec<Interfix>,
    #[serde(default)]
    pub allow_list: Vec<String>,
    #[serde(default = "default_true")]
    pub include_intermediate_terms: bool,
    #[serde(default)]
    pub heuristics: Vec<Heuristic>,
    #[serde(default)]
    pub variant_rules: Vec<SuffixRule>,
    /// Term pool capacity; `0` is unbounded.
    #[serde(default = "default_cache_entries")]
    pub term_cache_entries: usize,
    /// Capacity of the memoizing dictionary wrapper; `0` is unbounded.
    #[serde(default = "default_cache_entries")]
    pub dictionary_cache_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_cache_entries() -> usize {
    DEFAULT_CACHE_ENTRIES
}

impl LocalePolicy {
    pub fn new(minimum_length: usize) -> Self {
        Self {
            minimum_length,
            interfixes: Vec::new(),
            allow_list: Vec::new(),
            include_intermediate_terms: true,
            heuristics: Vec::new(),
            variant_rules: Vec::new(),
            term_cache_entries: DEFAULT_CACHE_ENTRIES,
            dictionary_cache_entries: DEFAULT_CACHE_ENTRIES,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Wraps `dictionary` as the policy asks (variant expansion, then the
    /// answer cache) and validates the result into a `Configuration`.
    pub fn into_configuration(
        self,
        dictionary: Arc<dyn Dictionary>,
    ) -> Result<Configuration, ConfigError> {
        let mut dictionary = dictionary;
        if !self.variant_rules.is_empty() {
            let expander = SuffixVariantExpander::new(self.variant_rules);
            dictionary = Arc::new(VariantDictionary::new(dictionary, expander));
        }
        let dictionary: Arc<dyn Dictionary> = Arc::new(MemoryCacheDictionary::new(
            dictionary,
            self.dictionary_cache_entries,
        ));

        let mut config = Configuration::new(dictionary, self.minimum_length)
            .with_interfixes(self.interfixes)?
            .with_allow_list(self.allow_list)?
            .with_intermediate_terms(self.include_intermediate_terms)
            .with_term_cache_entries(self.term_cache_entries);

        for heuristic in self.heuristics {
            config = match heuristic {
                Heuristic::RestoreElidedE => {
                    config.with_candidate_generator(RestoreElidedE::default())
                }
            };
        }
        Ok(config)
    }

    /// Loads the dictionary in `dir` and builds a decompounder for it.
    pub fn decompounder(self, dir: &Path) -> Result<Decompounder, Error> {
        let dictionary = persistence::load_dictionary(dir)?;
        let config = self.into_configuration(Arc::new(dictionary))?;
        Ok(Decompounder::new(config))
    }
}

/// Locales with a built-in policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    German,
    Dutch,
    English,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::German, Locale::Dutch, Locale::English];

    /// Accepts a bare language tag or one with a region, e.g. `de-AT`.
    pub fn from_tag(tag: &str) -> Result<Self, ConfigError> {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" => Ok(Locale::German),
            "nl" => Ok(Locale::Dutch),
            "en" => Ok(Locale::English),
            _ => Err(ConfigError::UnknownLocale(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::German => "de",
            Locale::Dutch => "nl",
            Locale::English => "en",
        }
    }

    pub fn policy(&self) -> LocalePolicy {
        match self {
            Locale::German => LocalePolicy {
                interfixes: ["s", "es", "n", "en", "er", "e"]
                    .map(Interfix::weighted)
                    .to_vec(),
                allow_list: GERMAN_ALLOW_LIST.map(String::from).to_vec(),
                heuristics: vec![Heuristic::RestoreElidedE],
                variant_rules: vec![SuffixRule::new("innen", "in")],
                ..LocalePolicy::new(4)
            },
            Locale::Dutch => LocalePolicy {
                interfixes: vec![
                    Interfix::new("s", 1),
                    Interfix::new("en", 2),
                    Interfix::new("e", 1),
                ],
                ..LocalePolicy::new(3)
            },
            Locale::English => LocalePolicy::new(3),
        }
    }

    /// Loads `dir` and wires it up with this locale's policy.
    pub fn decompounder(&self, dir: &Path) -> Result<Decompounder, Error> {
        let decompounder = self.policy().decompounder(dir)?;
        info!(locale = self.tag(), dir = %dir.display(), "locale ready");
        Ok(decompounder)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}
