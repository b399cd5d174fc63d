//! Loading engine configuration (timing, storage, feedback messages, extra vocabulary) from TOML.
//!
//! See `EngineConfig` for the expected schema. Every section is optional.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{DifficultyTier, WordBank, WordEntry};
use crate::store::PROGRESS_KEY;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub timing: Timing,
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub messages: Messages,
  #[serde(default)]
  pub words: Vec<WordCfg>,
}

/// Delays of the scheduled transitions, in milliseconds.
#[derive(Clone, Debug, Deserialize)]
pub struct Timing {
  /// Feedback shown before the next question.
  #[serde(default = "default_feedback_ms")] pub feedback_ms: u64,
  /// Mismatched memory cards stay visible this long.
  #[serde(default = "default_card_hide_ms")] pub card_hide_ms: u64,
  /// Pause between a finished board and the level-complete screen.
  #[serde(default = "default_celebration_ms")] pub celebration_ms: u64,
}

fn default_feedback_ms() -> u64 { 2000 }
fn default_card_hide_ms() -> u64 { 1500 }
fn default_celebration_ms() -> u64 { 1000 }

impl Default for Timing {
  fn default() -> Self {
    Self {
      feedback_ms: default_feedback_ms(),
      card_hide_ms: default_card_hide_ms(),
      celebration_ms: default_celebration_ms(),
    }
  }
}

impl Timing {
  pub fn feedback(&self) -> Duration { Duration::from_millis(self.feedback_ms) }
  pub fn card_hide(&self) -> Duration { Duration::from_millis(self.card_hide_ms) }
  pub fn celebration(&self) -> Duration { Duration::from_millis(self.celebration_ms) }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  /// Explicit progress file; overrides SHIBU_DATA_DIR and the platform data dir.
  #[serde(default)] pub progress_path: Option<PathBuf>,
  /// Guest mode: keep progress in memory only.
  #[serde(default)] pub ephemeral: bool,
}

/// Vocabulary entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct WordCfg {
  pub tier: DifficultyTier,
  pub word: String,
  #[serde(default)] pub hint: Option<String>,
}

/// Feedback texts sent along with core events. `{key}` placeholders are filled in.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  pub correct: String,
  /// Placeholders: {expected}
  pub incorrect: String,
  /// Placeholders: {stars}
  pub level_complete: String,
  /// Placeholders: {name}, {description}, {emoji}
  pub badge_earned: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      correct: "🎉 Correct! Great job!".into(),
      incorrect: "😊 Not quite! The answer is {expected}. Keep trying!".into(),
      level_complete: "Great job! You earned {stars} stars!".into(),
      badge_earned: "{emoji} New Badge Earned! {name} - {description}".into(),
    }
  }
}

impl EngineConfig {
  /// Merge configured vocabulary into `bank`, skipping blank words.
  pub fn extend_word_bank(&self, bank: &mut WordBank) {
    for w in &self.words {
      let word = w.word.trim().to_lowercase();
      if word.is_empty() {
        warn!(target: "shibu_engine", tier = ?w.tier, "Skipping blank vocabulary entry");
        continue;
      }
      bank.tier_mut(w.tier).push(WordEntry {
        word,
        hint: w.hint.clone().unwrap_or_default(),
      });
    }
  }

  /// Where the progress record lives.
  pub fn progress_path(&self) -> PathBuf {
    if let Some(p) = &self.storage.progress_path {
      return p.clone();
    }
    let dir = std::env::var_os("SHIBU_DATA_DIR")
      .map(PathBuf::from)
      .or_else(|| dirs::data_local_dir().map(|d| d.join("shibu-kuttan")))
      .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("{}.json", PROGRESS_KEY))
  }
}

pub fn parse_config(s: &str) -> Result<EngineConfig, toml::de::Error> {
  toml::from_str::<EngineConfig>(s)
}

/// Attempt to load `EngineConfig` from SHIBU_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("SHIBU_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "shibu_engine", %path, words = cfg.words.len(), "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "shibu_engine", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "shibu_engine", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
