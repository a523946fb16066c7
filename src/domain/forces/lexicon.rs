//! Versioned keyword dictionaries used by the classifier and normalizer.
//!
//! Both dictionaries are plain data: the built-in defaults are constructed
//! once, and replacements can be loaded from YAML so that survey teams can
//! tune wording without touching the scoring code.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use super::Force;
use crate::domain::foundation::ValidationError;

/// Current version of the built-in dictionaries.
pub const LEXICON_VERSION: u32 = 1;

/// Hit density below which a classification is considered ambiguous.
pub const DEFAULT_MIN_HIT_DENSITY: f64 = 0.08;

/// Suffixes accepted after a short keyword stem.
const INFLECTIONS: &[&str] = &["s", "es", "d", "ed", "ing", "er", "y", "ly"];

/// Errors raised while loading a dictionary from disk.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse lexicon: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid lexicon: {0}")]
    Invalid(#[from] ValidationError),
}

/// Lowercased, tokenized view of a piece of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    tokens: Vec<String>,
}

impl NormalizedText {
    /// Lowercases the text and splits it into word tokens.
    ///
    /// Apostrophes stay inside words so contractions like "don't" survive.
    pub fn new(text: &str) -> Self {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
            .collect();
        let tokens = cleaned
            .split_whitespace()
            .map(|t| t.trim_matches('\'').to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Joins the tokens back with single spaces.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }

    /// Returns the token index where `term` first matches.
    ///
    /// Single words match a token exactly, with a common inflection, or as a
    /// stem when the term is at least five characters long. Phrases match
    /// consecutive tokens, with the same rule applied to each word.
    pub fn find(&self, term: &str) -> Option<usize> {
        let words: Vec<&str> = term.split_whitespace().collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return None;
        }

        (0..=self.tokens.len() - words.len()).find(|&start| {
            words
                .iter()
                .enumerate()
                .all(|(offset, word)| word_matches(&self.tokens[start + offset], word))
        })
    }

    /// Returns true if `term` matches anywhere.
    pub fn contains(&self, term: &str) -> bool {
        self.find(term).is_some()
    }
}

fn word_matches(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    match token.strip_prefix(word) {
        Some(rest) => word.chars().count() >= 5 || INFLECTIONS.contains(&rest),
        None => false,
    }
}

/// Keyword lists used to guess which force a question measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDictionary {
    pub version: u32,
    #[serde(default = "default_min_hit_density")]
    pub min_hit_density: f64,
    pub keywords: BTreeMap<Force, Vec<String>>,
}

fn default_min_hit_density() -> f64 {
    DEFAULT_MIN_HIT_DENSITY
}

impl KeywordDictionary {
    /// Returns the built-in dictionary.
    pub fn builtin() -> &'static KeywordDictionary {
        &DEFAULT_KEYWORDS
    }

    /// Parses and validates a dictionary from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, LexiconError> {
        let dictionary: KeywordDictionary = serde_yaml::from_str(yaml)?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    /// Loads a dictionary from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Checks that every force has at least one keyword.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for force in Force::ALL {
            let empty = self.keywords.get(&force).map_or(true, |k| k.is_empty());
            if empty {
                return Err(ValidationError::empty_field(format!("keywords.{}", force)));
            }
        }
        if !(self.min_hit_density > 0.0 && self.min_hit_density < 1.0) {
            return Err(ValidationError::out_of_range(
                "min_hit_density",
                0.0,
                1.0,
                self.min_hit_density,
            ));
        }
        Ok(())
    }

    /// Keywords for one force.
    pub fn keywords_for(&self, force: Force) -> &[String] {
        self.keywords.get(&force).map(|k| k.as_slice()).unwrap_or(&[])
    }
}

/// A charged word with the intensity it anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorTerm {
    pub term: String,
    pub score: f64,
}

/// An adverb that pushes intensity away from (or toward) neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTerm {
    pub term: String,
    pub shift: f64,
}

/// Word lists used to turn free-text answers into 1-5 intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityLexicon {
    pub version: u32,
    /// Charged words per force.
    pub anchors: BTreeMap<Force, Vec<AnchorTerm>>,
    /// Frequency and degree phrases that apply to every force.
    #[serde(default)]
    pub common_anchors: Vec<AnchorTerm>,
    #[serde(default)]
    pub modifiers: Vec<ModifierTerm>,
    #[serde(default)]
    pub negations: Vec<String>,
    /// Placeholder answers that carry no information.
    #[serde(default)]
    pub non_answers: Vec<String>,
    /// Whole-answer coded choices such as "strongly agree".
    #[serde(default)]
    pub likert: Vec<AnchorTerm>,
}

impl IntensityLexicon {
    /// Returns the built-in lexicon.
    pub fn builtin() -> &'static IntensityLexicon {
        &DEFAULT_INTENSITY
    }

    /// Parses and validates a lexicon from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, LexiconError> {
        let lexicon: IntensityLexicon = serde_yaml::from_str(yaml)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Loads a lexicon from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Checks that anchor and coded-choice scores sit on the 1-5 scale.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scored = self
            .anchors
            .values()
            .flatten()
            .chain(self.common_anchors.iter())
            .chain(self.likert.iter());
        for anchor in scored {
            if !(1.0..=5.0).contains(&anchor.score) {
                return Err(ValidationError::out_of_range(
                    format!("anchor '{}'", anchor.term),
                    1.0,
                    5.0,
                    anchor.score,
                ));
            }
        }
        Ok(())
    }

    /// Charged words for one force.
    pub fn anchors_for(&self, force: Force) -> &[AnchorTerm] {
        self.anchors.get(&force).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Returns true if the trimmed answer is a known placeholder.
    pub fn is_non_answer(&self, value: &str) -> bool {
        let trimmed = value.trim().to_lowercase();
        trimmed.is_empty() || self.non_answers.iter().any(|token| *token == trimmed)
    }

    /// Looks up a whole-answer coded choice.
    pub fn likert_score(&self, value: &str) -> Option<f64> {
        let normalized = NormalizedText::new(&value.replace(['_', '-'], " ")).joined();
        self.likert
            .iter()
            .find(|entry| entry.term == normalized)
            .map(|entry| entry.score)
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn anchors(list: &[(&str, f64)]) -> Vec<AnchorTerm> {
    list.iter()
        .map(|(term, score)| AnchorTerm {
            term: term.to_string(),
            score: *score,
        })
        .collect()
}

static DEFAULT_KEYWORDS: Lazy<KeywordDictionary> = Lazy::new(|| {
    let mut keywords = BTreeMap::new();
    keywords.insert(
        Force::PainOfOld,
        words(&[
            "frustrat", "problem", "limitation", "waste", "bother", "annoy", "struggle",
            "pain", "difficult", "challenge", "dislike", "broken", "slow", "issue",
            "current solution", "workaround",
        ]),
    );
    keywords.insert(
        Force::PullOfNew,
        words(&[
            "benefit", "feature", "need", "looking for", "ideal", "want", "wish",
            "improve", "attract", "excite", "value", "outcome", "achieve", "new solution",
        ]),
    );
    keywords.insert(
        Force::AnchorsToOld,
        words(&[
            "investment", "invested", "migrate", "migration", "training cost", "switching",
            "habit", "familiar", "comfortable", "contract", "integrat", "keep using",
            "stay with", "locked",
        ]),
    );
    keywords.insert(
        Force::AnxietyOfNew,
        words(&[
            "worry", "worried", "risk", "concern", "confident", "wrong", "afraid", "fear",
            "uncertain", "hesitat", "doubt", "trust", "what if", "nervous",
        ]),
    );
    keywords.insert(
        Force::Demographic,
        words(&[
            "age", "role", "industry", "company size", "job title", "department",
            "location", "country", "team size", "employees", "years of experience",
            "seniority", "position",
        ]),
    );

    KeywordDictionary {
        version: LEXICON_VERSION,
        min_hit_density: DEFAULT_MIN_HIT_DENSITY,
        keywords,
    }
});

static DEFAULT_INTENSITY: Lazy<IntensityLexicon> = Lazy::new(|| {
    let mut per_force = BTreeMap::new();
    per_force.insert(
        Force::PainOfOld,
        anchors(&[
            ("frustrat", 4.0), ("annoy", 4.0), ("slow", 4.0), ("unreliable", 4.0),
            ("broken", 4.5), ("terrible", 4.5), ("awful", 4.5), ("hate", 4.5),
            ("painful", 4.5), ("nightmare", 5.0), ("unbearable", 5.0), ("waste", 4.0),
            ("problem", 3.5), ("issue", 3.5), ("difficult", 3.5), ("bug", 3.5),
            ("crash", 4.5), ("tedious", 4.0), ("clunky", 4.0), ("outdated", 3.5),
            ("expensive", 3.5), ("manual", 3.5), ("limitation", 3.5),
            ("works well", 2.0), ("reliable", 2.0), ("satisfied", 1.5), ("happy", 1.5),
            ("love it", 1.5),
        ]),
    );
    per_force.insert(
        Force::PullOfNew,
        anchors(&[
            ("need", 4.0), ("want", 4.0), ("love", 4.5), ("excite", 4.5),
            ("faster", 4.0), ("better", 3.5), ("easier", 4.0), ("must", 4.5),
            ("essential", 4.5), ("ideal", 4.0), ("wish", 4.0), ("benefit", 3.5),
            ("interest", 3.5), ("useful", 3.5), ("can't wait", 5.0),
            ("game changer", 5.0), ("unnecessary", 1.5), ("pointless", 1.5),
            ("meh", 2.0),
        ]),
    );
    per_force.insert(
        Force::AnchorsToOld,
        anchors(&[
            ("invested", 4.0), ("investment", 4.0), ("comfortable", 4.0), ("familiar", 4.0),
            ("used to", 4.0), ("integrated", 4.0), ("contract", 4.0), ("locked in", 4.5),
            ("habit", 4.0), ("training", 3.5), ("migrat", 4.0), ("switching cost", 4.5),
            ("too much effort", 4.5), ("easy to switch", 1.5), ("no commitment", 1.5),
        ]),
    );
    per_force.insert(
        Force::AnxietyOfNew,
        anchors(&[
            ("worry", 4.0), ("worri", 4.0), ("afraid", 4.5), ("fear", 4.5), ("scared", 4.5),
            ("nervous", 4.0), ("risk", 4.0), ("uncertain", 4.0), ("unsure", 3.5),
            ("concern", 4.0), ("doubt", 4.0), ("data loss", 4.5), ("downtime", 4.0),
            ("learning curve", 4.0), ("confident", 1.5), ("safe", 2.0), ("trust", 2.0),
        ]),
    );
    per_force.insert(
        Force::Demographic,
        anchors(&[
            ("decision maker", 4.5), ("executive", 4.5), ("owner", 4.5), ("founder", 4.5),
            ("director", 4.5), ("manager", 4.0), ("lead", 4.0), ("enterprise", 4.0),
            ("senior", 4.0), ("student", 2.0), ("intern", 2.0), ("junior", 2.5),
        ]),
    );

    IntensityLexicon {
        version: LEXICON_VERSION,
        anchors: per_force,
        common_anchors: anchors(&[
            ("not at all", 1.0), ("a lot", 4.0), ("constantly", 4.5),
            ("all the time", 4.5), ("always", 4.0), ("rarely", 2.0),
            ("occasionally", 2.5), ("sometimes", 3.0),
        ]),
        modifiers: vec![
            ModifierTerm { term: "extremely".into(), shift: 1.0 },
            ModifierTerm { term: "incredibly".into(), shift: 1.0 },
            ModifierTerm { term: "absolutely".into(), shift: 0.75 },
            ModifierTerm { term: "totally".into(), shift: 0.75 },
            ModifierTerm { term: "very".into(), shift: 0.5 },
            ModifierTerm { term: "really".into(), shift: 0.5 },
            ModifierTerm { term: "highly".into(), shift: 0.5 },
            ModifierTerm { term: "quite".into(), shift: 0.25 },
            ModifierTerm { term: "somewhat".into(), shift: -0.25 },
            ModifierTerm { term: "kind of".into(), shift: -0.25 },
            ModifierTerm { term: "slightly".into(), shift: -0.5 },
            ModifierTerm { term: "a bit".into(), shift: -0.5 },
            ModifierTerm { term: "a little".into(), shift: -0.5 },
            ModifierTerm { term: "barely".into(), shift: -0.75 },
        ],
        negations: words(&[
            "not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "aren't",
            "won't", "hardly", "without", "dont", "isnt",
        ]),
        non_answers: words(&[
            "n/a", "na", "n.a.", "-", "--", ".", "?", "null", "undefined", "no answer",
            "no comment", "skip", "skipped", "prefer not to say",
        ]),
        likert: anchors(&[
            ("strongly agree", 5.0), ("agree", 4.0), ("somewhat agree", 3.5),
            ("neutral", 3.0), ("neither agree nor disagree", 3.0),
            ("somewhat disagree", 2.5), ("disagree", 2.0), ("strongly disagree", 1.0),
            ("very likely", 5.0), ("likely", 4.0), ("unlikely", 2.0), ("very unlikely", 1.0),
            ("yes", 4.0), ("no", 2.0),
        ]),
    }
});
