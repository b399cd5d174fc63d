//! Built-in content: vocabulary, palettes, decks and pattern catalogs.
//! Guarantees every activity is playable without an external config.

use crate::domain::{WordBank, WordEntry};

fn entry(word: &str, hint: &str) -> WordEntry {
  WordEntry { word: word.into(), hint: hint.into() }
}

/// Default tiered vocabulary for the unscramble game.
pub fn seed_word_bank() -> WordBank {
  WordBank {
    easy: vec![
      entry("cat", "🐱 A furry pet that says meow"),
      entry("dog", "🐶 A loyal pet that barks"),
      entry("sun", "☀️ Bright yellow thing in the sky"),
      entry("car", "🚗 Something you drive on roads"),
      entry("hat", "👒 You wear this on your head"),
    ],
    medium: vec![
      entry("house", "🏠 Where you live with your family"),
      entry("happy", "😊 When you feel joyful and glad"),
      entry("green", "🌿 The color of grass and leaves"),
      entry("water", "💧 You drink this when thirsty"),
      entry("music", "🎵 Sounds that make songs"),
    ],
    hard: vec![
      entry("elephant", "🐘 Large gray animal with a trunk"),
      entry("rainbow", "🌈 Colorful arc in the sky after rain"),
      entry("butterfly", "🦋 Colorful insect with wings"),
      entry("chocolate", "🍫 Sweet brown treat"),
      entry("adventure", "🗺️ An exciting journey or experience"),
    ],
  }
}

/// (hex, name) pairs. Lower levels only use a prefix of this list.
pub const COLOR_PALETTE: [(&str, &str); 12] = [
  ("#FF0000", "Red"),
  ("#00FF00", "Green"),
  ("#0000FF", "Blue"),
  ("#FFFF00", "Yellow"),
  ("#FF00FF", "Pink"),
  ("#00FFFF", "Cyan"),
  ("#FFA500", "Orange"),
  ("#800080", "Purple"),
  ("#FFC0CB", "Light Pink"),
  ("#90EE90", "Light Green"),
  ("#87CEEB", "Sky Blue"),
  ("#F0E68C", "Khaki"),
];

pub const MEMORY_FACES: [&str; 12] = [
  "🐶", "🐱", "🐸", "🦋", "🌟", "🎈", "🍎", "🌈", "🚗", "⚽", "🎨", "🎵",
];
pub const MAX_MEMORY_PAIRS: usize = 8;

pub const SHAPE_TYPES: [&str; 6] = ["circle", "square", "triangle", "star", "heart", "diamond"];
pub const SHAPE_COLORS: [&str; 6] = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD"];

pub const COUNT_OBJECTS: [&str; 10] = ["🍎", "🌟", "🎈", "🐶", "🚗", "🎾", "🍌", "🦋", "🌸", "🎁"];

/// Symbols for the alternating pattern; two are used per puzzle.
pub const PATTERN_SYMBOLS: [&str; 4] = ["🔴", "🔵", "🟢", "🟡"];
/// Extra symbols that never appear in an easy pattern.
pub const PATTERN_DISTRACTORS: [&str; 2] = ["🟠", "🟣"];

/// A closed pattern: visible terms, the next term, and same-alphabet distractors.
pub struct ClosedPattern {
  pub sequence: &'static [&'static str],
  pub answer: &'static str,
  pub distractors: [&'static str; 3],
}

pub const CLOSED_PATTERNS: [ClosedPattern; 3] = [
  ClosedPattern { sequence: &["🔺", "🔸", "🔺", "🔸"], answer: "🔺", distractors: ["🔸", "🔴", "🔵"] },
  ClosedPattern { sequence: &["A", "B", "C", "A"], answer: "B", distractors: ["C", "A", "D"] },
  ClosedPattern { sequence: &["1", "4", "9", "16"], answer: "25", distractors: ["20", "24", "36"] },
];

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_seed_words_scramblable() {
    let bank = seed_word_bank();
    for e in bank.easy.iter().chain(&bank.medium).chain(&bank.hard) {
      let distinct: HashSet<char> = e.word.chars().collect();
      assert!(distinct.len() >= 2, "{} cannot be scrambled", e.word);
    }
  }

  #[test]
  fn test_closed_pattern_options_distinct() {
    for p in &CLOSED_PATTERNS {
      let mut all: Vec<&str> = p.distractors.to_vec();
      all.push(p.answer);
      let set: HashSet<&str> = all.iter().copied().collect();
      assert_eq!(set.len(), 4);
    }
  }
}
