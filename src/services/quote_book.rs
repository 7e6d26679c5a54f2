//! Quotes by persona.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::models::{QuotesConfig, DEFAULT_PERSONA};

const BUILTIN_FALLBACK_QUOTE: &str = "“Small progress is still progress.”";

/// Read-only quote table with a fallback persona.
pub struct QuoteBook {
    pools: BTreeMap<String, Vec<String>>,
    fallback_persona: String,
    rng: Mutex<StdRng>,
}

impl QuoteBook {
    /// Build from configuration.
    ///
    /// A missing or empty fallback pool is replaced with a built-in one so
    /// every lookup can still produce a quote.
    pub fn from_config(config: &QuotesConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build with a caller-supplied RNG (deterministic in tests).
    pub fn with_rng(config: &QuotesConfig, rng: StdRng) -> Self {
        let mut pools: BTreeMap<String, Vec<String>> = config
            .pools
            .iter()
            .filter(|(_, quotes)| !quotes.is_empty())
            .map(|(persona, quotes)| (persona.clone(), quotes.clone()))
            .collect();

        let mut fallback_persona = config.fallback_persona.trim().to_string();
        if fallback_persona.is_empty() {
            fallback_persona = DEFAULT_PERSONA.to_string();
        }

        if !pools.contains_key(&fallback_persona) {
            tracing::warn!(
                fallback = %fallback_persona,
                configured_pools = pools.len(),
                "quote table has no pool for the fallback persona; using built-in quote"
            );
            pools.insert(
                fallback_persona.clone(),
                vec![BUILTIN_FALLBACK_QUOTE.to_string()],
            );
        }

        Self {
            pools,
            fallback_persona,
            rng: Mutex::new(rng),
        }
    }

    pub fn fallback_persona(&self) -> &str {
        &self.fallback_persona
    }

    pub fn has_persona(&self, persona: &str) -> bool {
        self.pools.contains_key(persona)
    }

    /// Random quote for `persona`, or for the fallback persona when unknown.
    pub fn pick(&self, persona: &str) -> String {
        let pool = self
            .pools
            .get(persona)
            .or_else(|| self.pools.get(&self.fallback_persona));

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pool.and_then(|quotes| quotes.choose(&mut *rng))
            .cloned()
            .unwrap_or_else(|| BUILTIN_FALLBACK_QUOTE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pools: &[(&str, &[&str])], fallback: &str) -> QuotesConfig {
        QuotesConfig {
            fallback_persona: fallback.to_string(),
            pools: pools
                .iter()
                .map(|(p, q)| ((*p).to_string(), q.iter().map(|s| (*s).to_string()).collect()))
                .collect(),
        }
    }

    #[test]
    fn test_known_persona_uses_its_pool() {
        let book = QuoteBook::with_rng(
            &config(&[("stoic", &["s1"]), ("general_encourage", &["g1"])], "general_encourage"),
            StdRng::seed_from_u64(7),
        );
        assert_eq!(book.pick("stoic"), "s1");
    }

    #[test]
    fn test_unknown_persona_falls_back() {
        let book = QuoteBook::with_rng(
            &config(&[("general_encourage", &["g1"])], "general_encourage"),
            StdRng::seed_from_u64(7),
        );
        assert_eq!(book.pick("does_not_exist"), "g1");
    }

    #[test]
    fn test_missing_table_recovers_with_builtin() {
        let book = QuoteBook::with_rng(&config(&[], ""), StdRng::seed_from_u64(7));
        assert_eq!(book.fallback_persona(), DEFAULT_PERSONA);
        assert_eq!(book.pick("anything"), BUILTIN_FALLBACK_QUOTE);
    }

    #[test]
    fn test_empty_pools_are_ignored() {
        let book = QuoteBook::with_rng(
            &config(&[("stoic", &[]), ("general_encourage", &["g1"])], "general_encourage"),
            StdRng::seed_from_u64(7),
        );
        assert!(!book.has_persona("stoic"));
        assert_eq!(book.pick("stoic"), "g1");
    }

    #[test]
    fn test_default_table_has_all_personas() {
        let book = QuoteBook::from_config(&QuotesConfig::default());
        for persona in [
            "alain_meaning",
            "maker_creativity",
            "stoic_resilience",
            "mindful_learning",
            "general_encourage",
        ] {
            assert!(book.has_persona(persona), "missing {persona}");
        }
    }
}
