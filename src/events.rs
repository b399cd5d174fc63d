//! Discrete events the core signals to the presentation/audio collaborator.
//!
//! The core never renders anything: it attaches a feedback text and the sound
//! cues a player may want to hear, and the UI decides what to do with them.

use serde::Serialize;

use crate::achievements::Badge;
use crate::config::Messages;
use crate::domain::StarRating;
use crate::util::fill_template;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundCue {
    Success,
    Wrong,
    LevelComplete,
    Star,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    AnsweredCorrectly {
        message: String,
    },
    AnsweredIncorrectly {
        expected: String,
        message: String,
    },
    LevelCompleted {
        world: String,
        level: u32,
        stars: StarRating,
        message: String,
    },
    BadgeEarned {
        id: String,
        name: String,
        emoji: String,
        message: String,
    },
}

impl CoreEvent {
    pub fn answered(correct: bool, expected: &str, messages: &Messages) -> Self {
        if correct {
            CoreEvent::AnsweredCorrectly { message: messages.correct.clone() }
        } else {
            CoreEvent::AnsweredIncorrectly {
                expected: expected.to_string(),
                message: fill_template(&messages.incorrect, &[("expected", expected)]),
            }
        }
    }

    pub fn level_completed(world: &str, level: u32, stars: StarRating, messages: &Messages) -> Self {
        let n = stars.stars().to_string();
        CoreEvent::LevelCompleted {
            world: world.to_string(),
            level,
            stars,
            message: fill_template(&messages.level_complete, &[("stars", &n)]),
        }
    }

    pub fn badge_earned(badge: &Badge, messages: &Messages) -> Self {
        CoreEvent::BadgeEarned {
            id: badge.id.to_string(),
            name: badge.name.to_string(),
            emoji: badge.emoji.to_string(),
            message: fill_template(
                &messages.badge_earned,
                &[("name", badge.name), ("description", badge.description), ("emoji", badge.emoji)],
            ),
        }
    }

    /// Sounds that go with this event, in playing order.
    pub fn cues(&self) -> Vec<SoundCue> {
        match self {
            CoreEvent::AnsweredCorrectly { .. } => vec![SoundCue::Success],
            CoreEvent::AnsweredIncorrectly { .. } => vec![SoundCue::Wrong],
            CoreEvent::LevelCompleted { stars, .. } => {
                let mut cues = vec![SoundCue::LevelComplete];
                cues.extend(std::iter::repeat(SoundCue::Star).take(stars.stars() as usize));
                cues
            }
            CoreEvent::BadgeEarned { .. } => vec![SoundCue::Success],
        }
    }
}

/// Event plus its cues, as sent to the UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Signal {
    #[serde(flatten)]
    pub event: CoreEvent,
    pub cues: Vec<SoundCue>,
}

impl From<CoreEvent> for Signal {
    fn from(event: CoreEvent) -> Self {
        let cues = event.cues();
        Self { event, cues }
    }
}
