use rust_stemmers::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stemming language for the normalizer. `None` keeps tokens as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
    Portuguese,
    Italian,
    Dutch,
    Swedish,
    Norwegian,
    Danish,
    Finnish,
    Russian,
    Turkish,
    None,
}

impl Language {
    pub fn algorithm(self) -> Option<Algorithm> {
        match self {
            Language::English => Some(Algorithm::English),
            Language::French => Some(Algorithm::French),
            Language::German => Some(Algorithm::German),
            Language::Spanish => Some(Algorithm::Spanish),
            Language::Portuguese => Some(Algorithm::Portuguese),
            Language::Italian => Some(Algorithm::Italian),
            Language::Dutch => Some(Algorithm::Dutch),
            Language::Swedish => Some(Algorithm::Swedish),
            Language::Norwegian => Some(Algorithm::Norwegian),
            Language::Danish => Some(Algorithm::Danish),
            Language::Finnish => Some(Algorithm::Finnish),
            Language::Russian => Some(Algorithm::Russian),
            Language::Turkish => Some(Algorithm::Turkish),
            Language::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
            Language::German => "german",
            Language::Spanish => "spanish",
            Language::Portuguese => "portuguese",
            Language::Italian => "italian",
            Language::Dutch => "dutch",
            Language::Swedish => "swedish",
            Language::Norwegian => "norwegian",
            Language::Danish => "danish",
            Language::Finnish => "finnish",
            Language::Russian => "russian",
            Language::Turkish => "turkish",
            Language::None => "none",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = match s.trim().to_lowercase().as_str() {
            "english" | "en" => Language::English,
            "french" | "fr" => Language::French,
            "german" | "de" => Language::German,
            "spanish" | "es" => Language::Spanish,
            "portuguese" | "pt" => Language::Portuguese,
            "italian" | "it" => Language::Italian,
            "dutch" | "nl" => Language::Dutch,
            "swedish" | "sv" => Language::Swedish,
            "norwegian" | "no" => Language::Norwegian,
            "danish" | "da" => Language::Danish,
            "finnish" | "fi" => Language::Finnish,
            "russian" | "ru" => Language::Russian,
            "turkish" | "tr" => Language::Turkish,
            "none" | "identity" => Language::None,
            other => return Err(format!("unsupported stemming language: {other}")),
        };
        Ok(lang)
    }
}

/// Settings for [`crate::tokenizer::Normalizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub language: Language,
    /// Tokens shorter than this many characters are dropped.
    pub min_token_len: usize,
    /// Merged into the built-in stopword list.
    pub extra_stopwords: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { language: Language::English, min_token_len: 3, extra_stopwords: Vec::new() }
    }
}

/// Settings for the retrieval and re-ranking stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates fetched from the index per requested result.
    pub candidate_multiplier: usize,
    pub min_candidates: usize,
    pub max_candidates: usize,
    pub default_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { candidate_multiplier: 10, min_candidates: 50, max_candidates: 1000, default_top_k: 5 }
    }
}

impl SearchConfig {
    /// First-stage limit for a request of `top_k` results. Never below `top_k`.
    pub fn candidate_limit(&self, top_k: usize) -> usize {
        let floor = self.min_candidates.min(self.max_candidates);
        top_k
            .saturating_mul(self.candidate_multiplier)
            .clamp(floor, self.max_candidates)
            .max(top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_limit_is_generous_but_bounded() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.candidate_limit(1), 50);
        assert_eq!(cfg.candidate_limit(5), 50);
        assert_eq!(cfg.candidate_limit(20), 200);
        assert_eq!(cfg.candidate_limit(500), 1000);
        assert_eq!(cfg.candidate_limit(5000), 5000);
    }

    #[test]
    fn language_parses_names_and_codes() {
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("de".parse::<Language>().unwrap(), Language::German);
        assert_eq!("none".parse::<Language>().unwrap(), Language::None);
        assert!("klingon".parse::<Language>().is_err());
    }
}
