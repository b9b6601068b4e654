use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use codeword_types::BOARD_SIZE;

const BUILTIN_WORDS: &str = include_str!("../words/default.txt");

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary has {found} distinct words, a board needs at least {required}")]
    TooSmall {
        found: usize,
        required: usize,
    },
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The fixed pool of words boards are drawn from.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from a word list, one word per line
    pub fn from_word_list(word_list: &str) -> Result<Self, VocabularyError> {
        Self::from_words(parse_word_list(word_list))
    }

    /// Load every `.txt` file in a directory
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Self, VocabularyError> {
        let dir = dir.as_ref();
        let io_error = |source| VocabularyError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut words = BTreeSet::new();
        for path in paths {
            let contents = std::fs::read_to_string(&path).map_err(|source| VocabularyError::Io {
                path: path.clone(),
                source,
            })?;
            words.extend(parse_word_list(&contents));
        }

        Self::from_words(words)
    }

    /// The word list compiled into the binary
    pub fn builtin() -> Self {
        Self {
            words: parse_word_list(BUILTIN_WORDS).into_iter().collect(),
        }
    }

    fn from_words(words: BTreeSet<String>) -> Result<Self, VocabularyError> {
        if words.len() < BOARD_SIZE {
            return Err(VocabularyError::TooSmall {
                found: words.len(),
                required: BOARD_SIZE,
            });
        }

        Ok(Self {
            words: words.into_iter().collect(),
        })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search(&word.trim().to_uppercase())
            .is_ok()
    }
}

fn parse_word_list(word_list: &str) -> BTreeSet<String> {
    word_list
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_uppercase)
        .collect()
}
