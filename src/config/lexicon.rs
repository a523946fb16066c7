//! Lexicon file configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ValidationError};
use crate::domain::forces::{IntensityLexicon, KeywordDictionary};

/// Optional YAML overrides for the built-in keyword dictionary and
/// intensity lexicon
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconConfig {
    /// Path to a keyword dictionary used to classify unmapped questions
    pub keywords_path: Option<PathBuf>,

    /// Path to an intensity lexicon used to score free text
    pub intensity_path: Option<PathBuf>,
}

impl LexiconConfig {
    /// Loads the keyword dictionary, falling back to the built-in one
    pub fn keyword_dictionary(&self) -> Result<KeywordDictionary, ConfigError> {
        match &self.keywords_path {
            Some(path) => Ok(KeywordDictionary::from_file(path)?),
            None => Ok(KeywordDictionary::builtin().clone()),
        }
    }

    /// Loads the intensity lexicon, falling back to the built-in one
    pub fn intensity_lexicon(&self) -> Result<IntensityLexicon, ConfigError> {
        match &self.intensity_path {
            Some(path) => Ok(IntensityLexicon::from_file(path)?),
            None => Ok(IntensityLexicon::builtin().clone()),
        }
    }

    /// Validate that configured files exist
    pub fn validate(&self) -> Result<(), ValidationError> {
        for path in [&self.keywords_path, &self.intensity_path].into_iter().flatten() {
            ensure_file(path)?;
        }
        Ok(())
    }
}

fn ensure_file(path: &Path) -> Result<(), ValidationError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ValidationError::LexiconFileMissing(path.display().to_string()))
    }
}
