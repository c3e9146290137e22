use crate::models::letter::Letter;
use anyhow::{ensure, Error};
use itertools::Itertools;
use std::convert::TryFrom;
use std::fmt;

/// Represents a dictionary word: an immutable sequence of at least two letters
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Word {
    letters: Vec<Letter>,
}

impl Word {
    pub fn new(letters: Vec<Letter>) -> Result<Self, Error> {
        ensure!(letters.len() >= 2, "A word needs at least two letters");
        Ok(Word { letters })
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    /// Iterate over the indexes at which the given letter occurs
    pub fn positions_of(&self, letter: Letter) -> impl Iterator<Item = usize> + '_ {
        self.letters
            .iter()
            .enumerate()
            .filter(move |&(_, &c)| c == letter)
            .map(|(i, _)| i)
    }

    /// Sum of the per-letter difficulty ranks
    pub fn difficulty(&self) -> u32 {
        self.letters.iter().map(|c| c.difficulty() as u32).sum()
    }
}

impl<'a> TryFrom<&'a str> for Word {
    type Error = Error;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let letters: Vec<_> = value.chars().map(Letter::try_from).try_collect()?;
        Word::new(letters)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letters.iter().format(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let word = Word::try_from("BREAD").unwrap();
        assert_eq!(word.len(), 5);
        assert_eq!(word.to_string(), "BREAD");

        assert!(Word::try_from("A").is_err());
        assert!(Word::try_from("").is_err());
        assert!(Word::try_from("bread").is_err());
    }

    #[test]
    fn positions_of() {
        let word = Word::try_from("BANANA").unwrap();
        assert_eq!(word.positions_of(Letter::A).collect::<Vec<_>>(), [1, 3, 5]);
        assert_eq!(word.positions_of(Letter::Z).count(), 0);
    }

    #[test]
    fn difficulty() {
        let word = Word::try_from("JAZZ").unwrap();
        assert_eq!(word.difficulty(), 8 + 1 + 10 + 10);
    }
}
