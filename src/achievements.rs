//! Badge definitions and evaluation.
//!
//! Badges are stateless rules over a [`GameProgress`] snapshot. The only persisted
//! effect of earning one is its id in `GameProgress::badges`.

use serde::Serialize;
use tracing::info;

use crate::domain::{WORLD_ART, WORLD_MATH, WORLD_MINIGAMES, WORLD_PUZZLE, WORLD_WORD};
use crate::progress::GameProgress;

/// Unlock condition of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    /// Sum of completed levels across all worlds reaches the threshold.
    LevelsCompleted { at_least: u32 },
    /// Global star total reaches the threshold.
    TotalStars { at_least: u32 },
    /// Every level of the world is completed.
    WorldMastery { world: &'static str },
}

impl BadgeRule {
    #[must_use]
    pub fn is_met(&self, progress: &GameProgress) -> bool {
        match *self {
            BadgeRule::LevelsCompleted { at_least } => progress.levels_completed() >= at_least,
            BadgeRule::TotalStars { at_least } => progress.total_stars >= at_least,
            BadgeRule::WorldMastery { world } => progress.world(world).is_some_and(|w| w.is_mastered()),
        }
    }
}

/// A badge definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub rule: BadgeRule,
}

impl Badge {
    const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        emoji: &'static str,
        rule: BadgeRule,
    ) -> Self {
        Self { id, name, description, emoji, rule }
    }

    const fn mastery(id: &'static str, name: &'static str, world: &'static str, emoji: &'static str, description: &'static str) -> Self {
        Self::new(id, name, description, emoji, BadgeRule::WorldMastery { world })
    }
}

/// All badges that can be earned.
pub const BADGES: &[Badge] = &[
    Badge::new(
        "first-steps",
        "First Steps",
        "Complete 5 levels",
        "👣",
        BadgeRule::LevelsCompleted { at_least: 5 },
    ),
    Badge::new(
        "star-collector",
        "Star Collector",
        "Earn 50 stars",
        "⭐",
        BadgeRule::TotalStars { at_least: 50 },
    ),
    Badge::mastery("math-master", "Math Master", WORLD_MATH, "🔢", "Complete all Math World levels"),
    Badge::mastery("word-master", "Word Wizard", WORLD_WORD, "📚", "Complete all Word World levels"),
    Badge::mastery("puzzle-master", "Puzzle Pro", WORLD_PUZZLE, "🧩", "Complete all Puzzle World levels"),
    Badge::mastery("art-master", "Little Artist", WORLD_ART, "🎨", "Complete all Art World levels"),
    Badge::mastery("minigames-master", "Game Champion", WORLD_MINIGAMES, "🎮", "Complete all Minigames"),
];

/// Badges whose rule holds but which are not yet held. Does not modify `progress`.
#[must_use]
pub fn pending_badges(progress: &GameProgress) -> Vec<&'static Badge> {
    BADGES
        .iter()
        .filter(|b| !progress.has_badge(b.id) && b.rule.is_met(progress))
        .collect()
}

/// Award every newly satisfied badge and return the ones that were added.
///
/// Running it again on the same snapshot returns nothing, so each badge is
/// announced exactly once.
pub fn evaluate(progress: &mut GameProgress) -> Vec<&'static Badge> {
    let earned = pending_badges(progress);
    for badge in &earned {
        progress.badges.insert(badge.id.to_string());
        info!(target: "progress", badge = badge.id, "Badge earned");
    }
    earned
}
