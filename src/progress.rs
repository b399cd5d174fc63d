//! Cumulative player progress: per-world completion, stars and badges.
//!
//! This is the only persisted aggregate. Field names follow the stored JSON
//! record (`totalStars`, `worldProgress`, ...).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{WORLD_ART, WORLD_MATH, WORLD_MINIGAMES, WORLD_PUZZLE, WORLD_WORD};

/// Catalog size of each world in a fresh game.
pub const DEFAULT_WORLDS: [(&str, u32); 5] = [
    (WORLD_MATH, 5),
    (WORLD_WORD, 5),
    (WORLD_PUZZLE, 5),
    (WORLD_ART, 5),
    (WORLD_MINIGAMES, 8),
];

/// Completion record of one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldProgress {
    /// Highest level completed. Never decreases and never exceeds `total_levels`.
    #[serde(default)]
    pub levels_completed: u32,
    #[serde(default)]
    pub total_levels: u32,
    /// Stars earned in this world, replays included.
    #[serde(default)]
    pub stars: u32,
}

impl WorldProgress {
    pub fn new(total_levels: u32) -> Self {
        Self { levels_completed: 0, total_levels, stars: 0 }
    }

    /// True once every level of the world is completed.
    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.total_levels > 0 && self.levels_completed >= self.total_levels
    }

    /// Completion as a percentage for progress bars.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total_levels == 0 {
            0.0
        } else {
            (self.levels_completed as f64 / self.total_levels as f64 * 100.0).min(100.0)
        }
    }
}

/// Everything the player has achieved so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    /// Running sum of every star award ever applied.
    #[serde(default)]
    pub total_stars: u32,
    #[serde(default = "default_worlds")]
    pub world_progress: BTreeMap<String, WorldProgress>,
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default = "first_level")]
    pub current_level: u32,
}

fn default_worlds() -> BTreeMap<String, WorldProgress> {
    DEFAULT_WORLDS
        .iter()
        .map(|(id, total)| (id.to_string(), WorldProgress::new(*total)))
        .collect()
}

fn first_level() -> u32 {
    1
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            total_stars: 0,
            world_progress: default_worlds(),
            badges: BTreeSet::new(),
            current_level: first_level(),
        }
    }
}

impl GameProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one level completion in place.
    ///
    /// The world's completed-level counter moves to `max(previous, level)`, capped
    /// at the world size. Stars are added to the world and to the global total on
    /// every call, replays included. An unknown world leaves the per-world records
    /// untouched but still counts towards `total_stars`.
    pub fn apply_level_result(&mut self, world: &str, level: u32, stars: u32) {
        if let Some(wp) = self.world_progress.get_mut(world) {
            wp.levels_completed = wp.levels_completed.max(level.min(wp.total_levels));
            wp.stars = wp.stars.saturating_add(stars);
        }
        self.total_stars = self.total_stars.saturating_add(stars);
    }

    /// Pure variant of [`apply_level_result`](Self::apply_level_result).
    #[must_use]
    pub fn with_level_result(&self, world: &str, level: u32, stars: u32) -> Self {
        let mut next = self.clone();
        next.apply_level_result(world, level, stars);
        next
    }

    /// Sum of completed levels across all worlds.
    #[must_use]
    pub fn levels_completed(&self) -> u32 {
        self.world_progress.values().map(|w| w.levels_completed).sum()
    }

    /// Sum of catalog sizes across all worlds.
    #[must_use]
    pub fn levels_available(&self) -> u32 {
        self.world_progress.values().map(|w| w.total_levels).sum()
    }

    #[must_use]
    pub fn world(&self, id: &str) -> Option<&WorldProgress> {
        self.world_progress.get(id)
    }

    #[must_use]
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let p = GameProgress::new();
        assert_eq!(p.total_stars, 0);
        assert_eq!(p.current_level, 1);
        assert_eq!(p.world("math"), Some(&WorldProgress::new(5)));
        assert_eq!(p.world("minigames").unwrap().total_levels, 8);
        assert_eq!(p.levels_available(), 28);
        assert!(p.badges.is_empty());
    }

    #[test]
    fn test_total_stars_order_insensitive() {
        let a = GameProgress::new().with_level_result("math", 2, 2).with_level_result("math", 4, 3);
        let b = GameProgress::new().with_level_result("math", 4, 3).with_level_result("math", 2, 2);
        assert_eq!(a.total_stars, 5);
        assert_eq!(b.total_stars, 5);
        assert_eq!(a.world("math").unwrap().levels_completed, 4);
        assert_eq!(b.world("math").unwrap().levels_completed, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_replay_adds_stars_not_levels() {
        let mut p = GameProgress::new();
        p.apply_level_result("word", 3, 2);
        p.apply_level_result("word", 3, 2);
        let w = p.world("word").unwrap();
        assert_eq!(w.levels_completed, 3);
        assert_eq!(w.stars, 4);
        assert_eq!(p.total_stars, 4);
    }

    #[test]
    fn test_levels_capped_at_catalog() {
        let p = GameProgress::new().with_level_result("art", 9, 3);
        assert_eq!(p.world("art").unwrap().levels_completed, 5);
        assert!(p.world("art").unwrap().is_mastered());
    }

    #[test]
    fn test_unknown_world_is_noop_for_worlds() {
        let before = GameProgress::new();
        let after = before.with_level_result("space", 1, 3);
        assert_eq!(after.world_progress, before.world_progress);
        assert_eq!(after.total_stars, 3);
    }

    #[test]
    fn test_json_shape() {
        let p = GameProgress::new().with_level_result("math", 1, 3);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["totalStars"], 3);
        assert_eq!(v["worldProgress"]["math"]["levelsCompleted"], 1);
        assert_eq!(v["worldProgress"]["math"]["totalLevels"], 5);
        assert_eq!(v["currentLevel"], 1);
        assert!(v["badges"].is_array());
    }

    #[test]
    fn test_missing_fields_default() {
        let p: GameProgress = serde_json::from_str(r#"{"totalStars": 7}"#).unwrap();
        assert_eq!(p.total_stars, 7);
        assert_eq!(p.world_progress.len(), 5);
        assert_eq!(p.current_level, 1);
    }

    #[test]
    fn test_percent() {
        let mut w = WorldProgress::new(8);
        w.levels_completed = 2;
        assert!((w.percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(WorldProgress::default().percent(), 0.0);
    }
}
