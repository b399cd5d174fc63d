//! Domain models: activity types, difficulty tiers, generated instances, answers and ratings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WORLD_MATH: &str = "math";
pub const WORLD_WORD: &str = "word";
pub const WORLD_PUZZLE: &str = "puzzle";
pub const WORLD_ART: &str = "art";
pub const WORLD_MINIGAMES: &str = "minigames";

/// Minigames rotate through these by level.
const MINIGAME_ROTATION: [ActivityType; 4] = [
  ActivityType::ColorMatch,
  ActivityType::ShapeMatch,
  ActivityType::MemoryMatch,
  ActivityType::CountLearn,
];

/// Which learning activity is presented to the player?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
  Arithmetic,
  WordUnscramble,
  PatternSequence,
  ColorMatch,
  ShapeMatch,
  MemoryMatch,
  ArtRecreate,
  CountLearn,
}

impl ActivityType {
  #[cfg(test)]
  pub const ALL: [ActivityType; 8] = [
    ActivityType::Arithmetic,
    ActivityType::WordUnscramble,
    ActivityType::PatternSequence,
    ActivityType::ColorMatch,
    ActivityType::ShapeMatch,
    ActivityType::MemoryMatch,
    ActivityType::ArtRecreate,
    ActivityType::CountLearn,
  ];

  /// World whose progress this activity counts towards.
  pub fn world(self) -> &'static str {
    match self {
      ActivityType::Arithmetic => WORLD_MATH,
      ActivityType::WordUnscramble => WORLD_WORD,
      ActivityType::PatternSequence => WORLD_PUZZLE,
      ActivityType::ArtRecreate => WORLD_ART,
      ActivityType::ColorMatch
      | ActivityType::ShapeMatch
      | ActivityType::MemoryMatch
      | ActivityType::CountLearn => WORLD_MINIGAMES,
    }
  }

  /// Number of questions in one level attempt. Board activities are a single board.
  pub fn question_count(self) -> u32 {
    match self {
      ActivityType::Arithmetic | ActivityType::WordUnscramble | ActivityType::PatternSequence => 5,
      ActivityType::ColorMatch => 8,
      ActivityType::CountLearn => 6,
      ActivityType::ShapeMatch | ActivityType::MemoryMatch | ActivityType::ArtRecreate => 1,
    }
  }

  /// Manipulation activities are played on a board instead of answered question by question.
  pub fn is_board(self) -> bool {
    matches!(self, ActivityType::ShapeMatch | ActivityType::MemoryMatch | ActivityType::ArtRecreate)
  }

  /// Activity played for `level` of `world`; `None` for worlds we don't know.
  pub fn for_world(world: &str, level: u32) -> Option<ActivityType> {
    match world {
      WORLD_MATH => Some(ActivityType::Arithmetic),
      WORLD_WORD => Some(ActivityType::WordUnscramble),
      WORLD_PUZZLE => Some(ActivityType::PatternSequence),
      WORLD_ART => Some(ActivityType::ArtRecreate),
      WORLD_MINIGAMES => {
        let idx = (level.max(1) - 1) as usize % MINIGAME_ROTATION.len();
        Some(MINIGAME_ROTATION[idx])
      }
      _ => None,
    }
  }
}

/// Difficulty derived from the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
  Easy,
  Medium,
  Hard,
}

impl DifficultyTier {
  /// Levels 1-2 are easy, 3-4 medium, 5 and up hard. Level 0 counts as easy.
  pub fn from_level(level: u32) -> Self {
    match level {
      0..=2 => DifficultyTier::Easy,
      3..=4 => DifficultyTier::Medium,
      _ => DifficultyTier::Hard,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
  Add,
  Subtract,
  Multiply,
  Divide,
}

impl Operator {
  pub fn symbol(self) -> char {
    match self {
      Operator::Add => '+',
      Operator::Subtract => '−',
      Operator::Multiply => '×',
      Operator::Divide => '÷',
    }
  }
}

/// Paint colors available on the art canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
  Red,
  Blue,
  Green,
  Yellow,
  Orange,
  Purple,
  Black,
  White,
}

impl Paint {
  pub const PALETTE: [Paint; 8] = [
    Paint::Red,
    Paint::Blue,
    Paint::Green,
    Paint::Yellow,
    Paint::Orange,
    Paint::Purple,
    Paint::Black,
    Paint::White,
  ];
}

/// Square grid of paint cells, row-major.
pub type Grid = Vec<Vec<Paint>>;

pub fn blank_grid(size: usize) -> Grid {
  vec![vec![Paint::White; size]; size]
}

/// One card of a memory deck. `id` is its position in the shuffled deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
  pub id: usize,
  pub face: String,
  pub flipped: bool,
  pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapePiece {
  pub id: String,
  pub shape: String,
  pub color: String,
  pub placed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSlot {
  pub id: String,
  pub shape: String,
  pub filled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountKind {
  Count,
  Add,
  Subtract,
}

/// What the player is shown for one instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prompt {
  Arithmetic { left: i64, right: i64, operator: Operator },
  WordUnscramble { scrambled: String, hint: String },
  PatternSequence { sequence: Vec<String> },
  ColorMatch { target_hex: String, target_name: String },
  ShapeMatch { pieces: Vec<ShapePiece>, slots: Vec<ShapeSlot> },
  MemoryMatch { cards: Vec<Card> },
  ArtRecreate { target: Grid, palette: Vec<Paint> },
  CountLearn { count_kind: CountKind, objects: Vec<String> },
}

impl Prompt {
  /// One-line question shown above the prompt payload.
  pub fn question_text(&self) -> String {
    match self {
      Prompt::Arithmetic { left, right, operator } => format!("{} {} {} = ?", left, operator.symbol(), right),
      Prompt::WordUnscramble { scrambled, hint } => format!("Unscramble: {} ({})", scrambled.to_uppercase(), hint),
      Prompt::PatternSequence { sequence } => format!("What comes next? {} ?", sequence.join(" ")),
      Prompt::ColorMatch { .. } => "Which color is this?".into(),
      Prompt::ShapeMatch { .. } => "Drag each shape into its matching slot".into(),
      Prompt::MemoryMatch { .. } => "Find all the matching pairs".into(),
      Prompt::ArtRecreate { .. } => "Paint the canvas to copy the picture".into(),
      Prompt::CountLearn { count_kind: CountKind::Count, .. } => "How many do you see?".into(),
      Prompt::CountLearn { count_kind: CountKind::Add, .. } => "How many altogether?".into(),
      Prompt::CountLearn { count_kind: CountKind::Subtract, .. } => "How many are left?".into(),
    }
  }
}

/// Canonical answer of an instance; its variant selects the equality rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
  /// Exact integer match on the parsed response.
  Number(i64),
  /// Case-insensitive, whitespace-trimmed match.
  Word(String),
  /// Exact match against one of the presented options.
  Choice(String),
  /// Cell-by-cell match.
  Grid(Grid),
  /// Scored by moves/attempts against the ideal count, not per answer.
  Efficiency { ideal: u32 },
}

/// One generated question or puzzle. Immutable once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityInstance {
  pub id: Uuid,
  pub activity: ActivityType,
  pub level: u32,
  pub tier: DifficultyTier,
  pub prompt: Prompt,
  pub answer: Answer,
  /// Presented choices; empty when the activity takes free input.
  #[serde(default)]
  pub options: Vec<String>,
}

impl ActivityInstance {
  /// Short rendering of the answer for feedback messages.
  pub fn expected_text(&self) -> String {
    match &self.answer {
      Answer::Number(n) => n.to_string(),
      Answer::Word(w) | Answer::Choice(w) => w.clone(),
      Answer::Grid(_) => "the target picture".into(),
      Answer::Efficiency { .. } => String::new(),
    }
  }
}

/// What the player submitted for a question. Any JSON value is accepted;
/// shapes no answer can take land in `Other` and score as incorrect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
  Number(i64),
  Text(String),
  Grid(Grid),
  Other(serde_json::Value),
}

/// One to three stars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StarRating {
  One = 1,
  Two = 2,
  Three = 3,
}

impl StarRating {
  pub fn stars(self) -> u32 {
    self as u32
  }
}

impl From<StarRating> for u8 {
  fn from(r: StarRating) -> u8 { r as u8 }
}

impl TryFrom<u8> for StarRating {
  type Error = String;
  fn try_from(v: u8) -> Result<Self, Self::Error> {
    match v {
      1 => Ok(StarRating::One),
      2 => Ok(StarRating::Two),
      3 => Ok(StarRating::Three),
      other => Err(format!("star rating must be 1-3, got {}", other)),
    }
  }
}

/// Vocabulary entry for the unscramble game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
  pub word: String,
  pub hint: String,
}

/// Tiered vocabulary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WordBank {
  #[serde(default)] pub easy: Vec<WordEntry>,
  #[serde(default)] pub medium: Vec<WordEntry>,
  #[serde(default)] pub hard: Vec<WordEntry>,
}

impl WordBank {
  pub fn tier(&self, tier: DifficultyTier) -> &[WordEntry] {
    match tier {
      DifficultyTier::Easy => &self.easy,
      DifficultyTier::Medium => &self.medium,
      DifficultyTier::Hard => &self.hard,
    }
  }

  pub fn tier_mut(&mut self, tier: DifficultyTier) -> &mut Vec<WordEntry> {
    match tier {
      DifficultyTier::Easy => &mut self.easy,
      DifficultyTier::Medium => &mut self.medium,
      DifficultyTier::Hard => &mut self.hard,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tier_boundaries() {
    assert_eq!(DifficultyTier::from_level(0), DifficultyTier::Easy);
    assert_eq!(DifficultyTier::from_level(2), DifficultyTier::Easy);
    assert_eq!(DifficultyTier::from_level(3), DifficultyTier::Medium);
    assert_eq!(DifficultyTier::from_level(4), DifficultyTier::Medium);
    assert_eq!(DifficultyTier::from_level(5), DifficultyTier::Hard);
    assert_eq!(DifficultyTier::from_level(42), DifficultyTier::Hard);
  }

  #[test]
  fn test_world_activity_mapping() {
    assert_eq!(ActivityType::for_world("math", 3), Some(ActivityType::Arithmetic));
    assert_eq!(ActivityType::for_world("minigames", 1), Some(ActivityType::ColorMatch));
    assert_eq!(ActivityType::for_world("minigames", 5), Some(ActivityType::ColorMatch));
    assert_eq!(ActivityType::for_world("minigames", 8), Some(ActivityType::CountLearn));
    assert_eq!(ActivityType::for_world("space", 1), None);
    for a in ActivityType::ALL {
      assert_eq!(ActivityType::for_world(a.world(), 1).map(|x| x.world()), Some(a.world()));
    }
  }

  #[test]
  fn test_question_text() {
    let p = Prompt::Arithmetic { left: 7, right: 3, operator: Operator::Subtract };
    assert_eq!(p.question_text(), "7 − 3 = ?");
    let p = Prompt::PatternSequence { sequence: vec!["A".into(), "B".into()] };
    assert_eq!(p.question_text(), "What comes next? A B ?");
  }

  #[test]
  fn test_star_rating_serde_as_number() {
    assert_eq!(serde_json::to_string(&StarRating::Two).unwrap(), "2");
    let r: StarRating = serde_json::from_str("3").unwrap();
    assert_eq!(r, StarRating::Three);
    assert!(serde_json::from_str::<StarRating>("4").is_err());
  }

  #[test]
  fn test_submission_untagged() {
    let s: Submission = serde_json::from_str("\"cat\"").unwrap();
    assert_eq!(s, Submission::Text("cat".into()));
    let g: Submission = serde_json::from_str("[[\"red\",\"white\"],[\"white\",\"red\"]]").unwrap();
    assert_eq!(g, Submission::Grid(vec![vec![Paint::Red, Paint::White], vec![Paint::White, Paint::Red]]));
    let n: Submission = serde_json::from_str("12").unwrap();
    assert_eq!(n, Submission::Number(12));
    let o: Submission = serde_json::from_str("{\"x\":1}").unwrap();
    assert!(matches!(o, Submission::Other(_)));
    let o: Submission = serde_json::from_str("[[\"mauve\"]]").unwrap();
    assert!(matches!(o, Submission::Other(_)));
  }
}
