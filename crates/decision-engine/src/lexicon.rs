use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};

use crate::errors::ScoreError;

/// Built-in English polarity table, roughly on a -5..=5 scale.
const BUILTIN: &[(&str, f64)] = &[
    ("love", 2.0),
    ("like", 1.0),
    ("good", 2.0),
    ("great", 3.0),
    ("awesome", 3.0),
    ("amazing", 3.0),
    ("excellent", 3.0),
    ("wonderful", 3.0),
    ("happy", 2.0),
    ("glad", 2.0),
    ("nice", 2.0),
    ("fun", 2.0),
    ("beautiful", 3.0),
    ("best", 3.0),
    ("thanks", 2.0),
    ("congrats", 2.0),
    ("congratulations", 2.0),
    ("delicious", 3.0),
    ("kind", 2.0),
    ("friend", 1.0),
    ("welcome", 2.0),
    ("win", 2.0),
    ("bad", -2.0),
    ("worse", -3.0),
    ("worst", -3.0),
    ("hate", -3.0),
    ("awful", -3.0),
    ("terrible", -3.0),
    ("horrible", -3.0),
    ("stupid", -2.0),
    ("idiot", -3.0),
    ("dumb", -2.0),
    ("ugly", -3.0),
    ("angry", -3.0),
    ("sad", -2.0),
    ("disgusting", -3.0),
    ("liar", -3.0),
    ("kill", -3.0),
    ("die", -3.0),
    ("trash", -2.0),
    ("garbage", -2.0),
    ("pathetic", -2.0),
    ("loser", -3.0),
    ("shut", -1.0),
    ("fail", -2.0),
    ("scam", -3.0),
    ("fake", -3.0),
    ("annoying", -2.0),
];

/// Word to polarity lookup keyed by English (Porter2) stem, so `loves`,
/// `loved` and `love` share one entry.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, f64>,
}

impl Lexicon {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().map(|(word, polarity)| (*word, *polarity)))
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(word, polarity)| (stem(word), polarity))
            .collect();
        Self { entries }
    }

    /// Parses a YAML mapping of `word: polarity`.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ScoreError> {
        let parsed: HashMap<String, f64> =
            serde_yaml::from_str(raw).map_err(|err| ScoreError::Lexicon(err.to_string()))?;
        if let Some((word, value)) = parsed.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ScoreError::Lexicon(format!(
                "polarity for {word:?} is not finite: {value}"
            )));
        }
        Ok(Self::from_pairs(
            parsed.iter().map(|(word, polarity)| (word.as_str(), *polarity)),
        ))
    }

    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| ScoreError::Lexicon(format!("{}: {err}", path.display())))?;
        Self::from_yaml_str(&raw)
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.entries.get(&stem(word)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn stem(word: &str) -> String {
    Stemmer::create(Algorithm::English)
        .stem(&word.to_lowercase())
        .into_owned()
}
