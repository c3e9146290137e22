use crate::models::hand::Hand;
use crate::models::letter::{Letter, LetterSet};
use crate::models::word::Word;
use anyhow::{ensure, Context, Error};
use itertools::Itertools;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

const ROOT: usize = 0;

/// The word list indexed as a trie over letters. Built once at startup and never mutated.
#[derive(Debug)]
pub struct Dictionary {
    nodes: Vec<Node>,
    words: usize,
}

#[derive(Debug)]
struct Node {
    terminal: bool,
    children: [Option<u32>; 26],
}

impl Node {
    fn new() -> Self {
        Node {
            terminal: false,
            children: [None; 26],
        }
    }
}

impl Dictionary {
    /// Build the dictionary from word-list lines: one uppercase word per line, blank lines
    /// ignored. Any non-letter character fails the whole build. Entries shorter than two
    /// letters are skipped, since they can never appear in a grid run.
    pub fn build<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Result<Self, Error> {
        let mut dictionary = Dictionary {
            nodes: vec![Node::new()],
            words: 0,
        };

        for (line_index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let letters: Vec<Letter> = line
                .chars()
                .map(Letter::try_from)
                .try_collect()
                .with_context(|| format!("Invalid word at line {}", line_index + 1))?;
            if letters.len() < 2 {
                continue;
            }

            dictionary.insert(&letters);
        }

        Ok(dictionary)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list {}", path.display()))?;
        let dictionary = Dictionary::build(content.lines())
            .with_context(|| format!("Failed to parse word list {}", path.display()))?;
        ensure!(
            !dictionary.is_empty(),
            "Word list {} contains no usable words",
            path.display()
        );

        log::info!("Loaded {} words from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    fn insert(&mut self, letters: &[Letter]) {
        let mut node = ROOT;
        for &letter in letters {
            let index = letter.index();
            node = match self.nodes[node].children[index] {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[node].children[index] = Some(next as u32);
                    next
                }
            };
        }

        if !self.nodes[node].terminal {
            self.nodes[node].terminal = true;
            self.words += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    fn descend(&self, letters: &[Letter]) -> Option<usize> {
        let mut node = ROOT;
        for &letter in letters {
            node = self.nodes[node].children[letter.index()]? as usize;
        }
        Some(node)
    }

    pub fn contains(&self, letters: &[Letter]) -> bool {
        letters.len() >= 2
            && self
                .descend(letters)
                .map_or(false, |node| self.nodes[node].terminal)
    }

    /// Check whether some word starts with the given letters
    pub fn is_prefix(&self, letters: &[Letter]) -> bool {
        self.descend(letters).is_some()
    }

    /// Return the letters that can extend the given prefix into a longer known prefix
    pub fn continuations(&self, prefix: &[Letter]) -> LetterSet {
        let mut set = LetterSet::default();
        if let Some(node) = self.descend(prefix) {
            for (index, child) in self.nodes[node].children.iter().enumerate() {
                if child.is_some() {
                    set.insert(Letter::from_index(index));
                }
            }
        }
        set
    }

    /// Enumerate every word spellable from the given tiles. With `require`, only words using
    /// that letter at least once are returned. Order: longest first, then alphabetical.
    pub fn words_from(&self, tiles: &Hand, require: Option<Letter>) -> Vec<Word> {
        let mut found = Vec::new();
        if let Some(letter) = require {
            if !tiles.contains(letter) {
                return found;
            }
        }

        let mut budget = tiles.clone();
        let mut path = Vec::new();
        self.collect_words(
            ROOT,
            &mut budget,
            &mut path,
            require,
            require.is_none(),
            &mut found,
        );

        found.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        found
    }

    fn collect_words(
        &self,
        node: usize,
        budget: &mut Hand,
        path: &mut Vec<Letter>,
        require: Option<Letter>,
        require_met: bool,
        found: &mut Vec<Word>,
    ) {
        if self.nodes[node].terminal && require_met && path.len() >= 2 {
            if let Ok(word) = Word::new(path.clone()) {
                found.push(word);
            }
        }

        for index in 0..26 {
            let child = match self.nodes[node].children[index] {
                Some(child) => child as usize,
                None => continue,
            };
            let letter = Letter::from_index(index);
            if !budget.contains(letter) {
                continue;
            }

            // Give up on this branch once the required letter can no longer be reached
            let child_met = require_met || Some(letter) == require;
            if let (false, Some(required)) = (child_met, require) {
                if !budget.contains(required) {
                    continue;
                }
            }

            budget.remove(letter);
            path.push(letter);
            self.collect_words(child, budget, path, require, child_met, found);
            path.pop();
            budget.add(letter);
        }
    }

    /// Check whether at least one word spellable from the tiles uses the given letter.
    /// Letters failing this test are dead: no arrangement of the hand can ever place them.
    pub fn has_word_with(&self, tiles: &Hand, letter: Letter) -> bool {
        if !tiles.contains(letter) {
            return false;
        }
        let mut budget = tiles.clone();
        self.search_with(ROOT, &mut budget, letter, false, 0)
    }

    fn search_with(
        &self,
        node: usize,
        budget: &mut Hand,
        require: Letter,
        require_met: bool,
        depth: usize,
    ) -> bool {
        if self.nodes[node].terminal && require_met && depth >= 2 {
            return true;
        }

        for index in 0..26 {
            let child = match self.nodes[node].children[index] {
                Some(child) => child as usize,
                None => continue,
            };
            let letter = Letter::from_index(index);
            if !budget.contains(letter) {
                continue;
            }
            let child_met = require_met || letter == require;
            if !child_met && !budget.contains(require) {
                continue;
            }

            budget.remove(letter);
            let hit = self.search_with(child, budget, require, child_met, depth + 1);
            budget.add(letter);
            if hit {
                return true;
            }
        }

        false
    }

    /// Count the words of length 2 to `max_len` spellable from the tiles that use the given
    /// letter. The swap analysis uses this as a measure of how well a letter is supported.
    pub fn count_words_with(&self, tiles: &Hand, letter: Letter, max_len: usize) -> usize {
        if !tiles.contains(letter) {
            return 0;
        }
        let mut budget = tiles.clone();
        let mut count = 0;
        self.count_with(ROOT, &mut budget, letter, false, 0, max_len, &mut count);
        count
    }

    #[allow(clippy::too_many_arguments)]
    fn count_with(
        &self,
        node: usize,
        budget: &mut Hand,
        require: Letter,
        require_met: bool,
        depth: usize,
        max_len: usize,
        count: &mut usize,
    ) {
        if self.nodes[node].terminal && require_met && depth >= 2 {
            *count += 1;
        }
        if depth == max_len {
            return;
        }

        for index in 0..26 {
            let child = match self.nodes[node].children[index] {
                Some(child) => child as usize,
                None => continue,
            };
            let letter = Letter::from_index(index);
            if !budget.contains(letter) {
                continue;
            }
            let child_met = require_met || letter == require;
            if !child_met && !budget.contains(require) {
                continue;
            }

            budget.remove(letter);
            self.count_with(child, budget, require, child_met, depth + 1, max_len, count);
            budget.add(letter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Dictionary {
        Dictionary::build(vec!["CAT", "CATS", "CAST", "AT", "AS", "TA", "ACT", "SAT"]).unwrap()
    }

    fn letters(s: &str) -> Vec<Letter> {
        s.chars().map(|c| Letter::try_from(c).unwrap()).collect()
    }

    #[test]
    fn build() {
        let dictionary = dictionary();
        assert_eq!(dictionary.len(), 8);

        // Blank lines and single letters are skipped, duplicates collapse
        let dictionary = Dictionary::build(vec!["", "A", "CAT", "CAT", "  "]).unwrap();
        assert_eq!(dictionary.len(), 1);

        assert!(Dictionary::build(vec!["CA7"]).is_err());
        assert!(Dictionary::build(vec!["cat"]).is_err());
    }

    #[test]
    fn contains_and_prefixes() {
        let dictionary = dictionary();

        assert!(dictionary.contains(&letters("CAT")));
        assert!(dictionary.contains(&letters("CATS")));
        assert!(!dictionary.contains(&letters("CA")));
        assert!(!dictionary.contains(&letters("DOG")));

        assert!(dictionary.is_prefix(&letters("CA")));
        assert!(dictionary.is_prefix(&letters("CAST")));
        assert!(!dictionary.is_prefix(&letters("CB")));
    }

    #[test]
    fn continuations() {
        let dictionary = dictionary();

        let set = dictionary.continuations(&letters("CA"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Letter::S, Letter::T]);

        assert!(dictionary.continuations(&letters("ZZ")).is_empty());
    }

    #[test]
    fn words_from_orders_longest_first() {
        let dictionary = dictionary();
        let tiles: Hand = "CATS".parse().unwrap();

        let words = dictionary
            .words_from(&tiles, None)
            .iter()
            .map(|word| word.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            words,
            ["CAST", "CATS", "ACT", "CAT", "SAT", "AS", "AT", "TA"]
        );
    }

    #[test]
    fn words_from_with_required_letter() {
        let dictionary = dictionary();
        let tiles: Hand = "CATS".parse().unwrap();

        let words = dictionary
            .words_from(&tiles, Some(Letter::S))
            .iter()
            .map(|word| word.to_string())
            .collect::<Vec<_>>();
        assert_eq!(words, ["CAST", "CATS", "SAT", "AS"]);

        // Requiring a letter that is not in the tiles yields nothing
        assert!(dictionary.words_from(&tiles, Some(Letter::Z)).is_empty());
    }

    #[test]
    fn dead_letter_detection() {
        let dictionary = dictionary();
        let tiles: Hand = "CATQ".parse().unwrap();

        assert!(dictionary.has_word_with(&tiles, Letter::C));
        assert!(dictionary.has_word_with(&tiles, Letter::T));
        assert!(!dictionary.has_word_with(&tiles, Letter::Q));
        assert!(!dictionary.has_word_with(&tiles, Letter::Z));
    }

    #[test]
    fn count_short_words() {
        let dictionary = dictionary();
        let tiles: Hand = "CATS".parse().unwrap();

        // AS, SAT, CAST and CATS contain S, but CAST and CATS are longer than 3
        assert_eq!(dictionary.count_words_with(&tiles, Letter::S, 3), 2);
        assert_eq!(dictionary.count_words_with(&tiles, Letter::S, 4), 4);
        assert_eq!(dictionary.count_words_with(&tiles, Letter::Q, 4), 0);
    }
}
