//! Attempted-letter set and its comma-delimited storage form.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::instrument;

/// A single uppercase letter accepted as a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Letter(char);

impl Letter {
    /// Normalizes `c` to uppercase.
    ///
    /// Returns `None` for non-alphabetic characters, for letters without
    /// case (e.g. `ª`), and for letters whose uppercase form is more than one
    /// character (e.g. `ß`).
    #[instrument]
    pub fn parse(c: char) -> Option<Self> {
        if !c.is_alphabetic() {
            return None;
        }
        let mut upper = c.to_uppercase();
        match (upper.next(), upper.next()) {
            (Some(u), None) if u.is_uppercase() => Some(Self(u)),
            _ => None,
        }
    }

    /// Returns the uppercase character.
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Letters guessed so far in a round.
///
/// Only holds uppercase letters and never duplicates. The comma-delimited
/// text form exists only for storage; see [`AttemptedLetters::decode`] and
/// [`AttemptedLetters::encode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptedLetters {
    letters: BTreeSet<char>,
}

impl AttemptedLetters {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the stored form, e.g. `"A,E,T"`.
    ///
    /// Empty and whitespace-only segments are skipped. Each remaining segment
    /// contributes its first character, uppercased; non-letters are dropped.
    #[instrument]
    pub fn decode(text: &str) -> Self {
        text.split(',')
            .filter_map(|segment| segment.trim().chars().next())
            .filter_map(Letter::parse)
            .collect()
    }

    /// Renders the stored form. The empty set encodes to `""`.
    #[instrument(skip(self))]
    pub fn encode(&self) -> String {
        self.letters
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Adds a letter. Returns `false` if it was already present.
    pub fn insert(&mut self, letter: Letter) -> bool {
        self.letters.insert(letter.as_char())
    }

    /// Returns whether `c` has been attempted.
    pub fn contains(&self, c: char) -> bool {
        self.letters.contains(&c)
    }

    /// Number of distinct letters attempted.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Returns true if nothing has been attempted yet.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Iterates the letters in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.letters.iter().copied()
    }
}

impl FromIterator<Letter> for AttemptedLetters {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        Self {
            letters: iter.into_iter().map(Letter::as_char).collect(),
        }
    }
}
