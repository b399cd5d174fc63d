//! Public protocol structs exchanged with the presentation layer (serde ready).
//! One JSON object per line in each direction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::achievements::{Badge, BADGES};
use crate::boards::{ArtCanvas, DropOutcome, FlipOutcome, MemoryBoard, ShapeBoard};
use crate::domain::{ActivityInstance, ActivityType, DifficultyTier, Paint, Prompt, StarRating, Submission};
use crate::events::Signal;
use crate::progress::GameProgress;

/// Messages the UI can send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    GetProgress,
    /// Raw generator call, answer included.
    Generate {
        activity: ActivityType,
        level: u32,
        #[serde(default)]
        seed: Option<u64>,
    },
    StartLevel {
        world: String,
        level: u32,
        #[serde(default)]
        seed: Option<u64>,
    },
    SubmitAnswer {
        answer: Submission,
    },
    FlipCard {
        index: usize,
    },
    PlaceShape {
        #[serde(rename = "pieceId")]
        piece_id: String,
        #[serde(rename = "slotId")]
        slot_id: String,
    },
    PaintCell {
        row: usize,
        col: usize,
        color: Paint,
    },
    ResetCanvas,
    NextLevel,
    Leave,
    Quit,
}

/// Messages the engine sends back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Progress {
        progress: GameProgress,
        summary: ProgressSummary,
        badges: Vec<BadgeOut>,
    },
    Instance {
        instance: ActivityInstance,
    },
    Question {
        #[serde(rename = "attemptId")]
        attempt_id: Uuid,
        world: String,
        level: u32,
        index: u32,
        total: u32,
        question: QuestionOut,
    },
    AnswerResult {
        correct: bool,
        expected: String,
        #[serde(rename = "correctSoFar")]
        correct_so_far: u32,
        attempted: u32,
        signal: Signal,
    },
    Board {
        board: BoardOut,
    },
    LevelComplete {
        world: String,
        level: u32,
        stars: StarRating,
        progress: GameProgress,
        signals: Vec<Signal>,
    },
    /// No activity exists for this world yet.
    Unavailable {
        world: String,
    },
    Error {
        message: String,
    },
    Bye,
}

/// Question as shown to the player: the canonical answer is withheld.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: Uuid,
    pub activity: ActivityType,
    pub tier: DifficultyTier,
    pub text: String,
    pub prompt: Prompt,
    pub options: Vec<String>,
}

/// Convert an internal instance to the public DTO.
pub fn to_question(i: &ActivityInstance) -> QuestionOut {
    QuestionOut {
        id: i.id,
        activity: i.activity,
        tier: i.tier,
        text: i.prompt.question_text(),
        prompt: i.prompt.clone(),
        options: i.options.clone(),
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardOut {
    Memory {
        #[serde(flatten)]
        board: MemoryBoard,
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<FlipOutcome>,
    },
    Shapes {
        #[serde(flatten)]
        board: ShapeBoard,
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<DropOutcome>,
    },
    Art {
        #[serde(flatten)]
        canvas: ArtCanvas,
    },
}

/// Totals for the progress screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub levels_completed: u32,
    pub levels_available: u32,
    pub worlds: Vec<WorldSummary>,
}

#[derive(Debug, Serialize)]
pub struct WorldSummary {
    pub id: String,
    pub percent: f64,
    pub mastered: bool,
}

pub fn summarize(progress: &GameProgress) -> ProgressSummary {
    ProgressSummary {
        levels_completed: progress.levels_completed(),
        levels_available: progress.levels_available(),
        worlds: progress
            .world_progress
            .iter()
            .map(|(id, w)| WorldSummary { id: id.clone(), percent: w.percent(), mastered: w.is_mastered() })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct BadgeOut {
    #[serde(flatten)]
    pub badge: Badge,
    pub earned: bool,
}

/// Full badge catalog with the player's earned flags.
pub fn badge_catalog(progress: &GameProgress) -> Vec<BadgeOut> {
    BADGES
        .iter()
        .map(|b| BadgeOut { badge: *b, earned: progress.has_badge(b.id) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;

    #[test]
    fn test_parse_client_messages() {
        let m: ClientMessage = serde_json::from_str(r#"{"type":"start_level","world":"math","level":2}"#).unwrap();
        assert!(matches!(m, ClientMessage::StartLevel { level: 2, seed: None, .. }));
        let m: ClientMessage = serde_json::from_str(r#"{"type":"submit_answer","answer":"12"}"#).unwrap();
        assert!(matches!(m, ClientMessage::SubmitAnswer { answer: Submission::Text(_) }));
        let m: ClientMessage =
            serde_json::from_str(r#"{"type":"place_shape","pieceId":"shape-1","slotId":"slot-0"}"#).unwrap();
        assert!(matches!(m, ClientMessage::PlaceShape { .. }));
        let m: ClientMessage =
            serde_json::from_str(r#"{"type":"paint_cell","row":1,"col":2,"color":"blue"}"#).unwrap();
        assert!(matches!(m, ClientMessage::PaintCell { color: Paint::Blue, .. }));
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn test_any_answer_shape_parses() {
        let m: ClientMessage = serde_json::from_str(r#"{"type":"submit_answer","answer":12}"#).unwrap();
        assert!(matches!(m, ClientMessage::SubmitAnswer { answer: Submission::Number(12) }));
        let m: ClientMessage = serde_json::from_str(r#"{"type":"submit_answer","answer":true}"#).unwrap();
        assert!(matches!(m, ClientMessage::SubmitAnswer { answer: Submission::Other(_) }));
        let m: ClientMessage = serde_json::from_str(r#"{"type":"submit_answer","answer":null}"#).unwrap();
        assert!(matches!(m, ClientMessage::SubmitAnswer { answer: Submission::Other(_) }));
    }

    #[test]
    fn test_question_hides_answer() {
        let inst = Generator::default().generate_seeded(ActivityType::Arithmetic, 1, Some(1));
        let msg = ServerMessage::Question {
            attempt_id: Uuid::nil(),
            world: "math".into(),
            level: 1,
            index: 0,
            total: 5,
            question: to_question(&inst),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "question");
        assert_eq!(v["question"]["prompt"]["kind"], "arithmetic");
        assert!(v["question"].get("answer").is_none());
        assert!(v["question"]["text"].as_str().unwrap().ends_with("= ?"));
    }

    #[test]
    fn test_badge_catalog_flags() {
        let mut p = GameProgress::new();
        p.badges.insert("first-steps".into());
        let cat = badge_catalog(&p);
        assert_eq!(cat.len(), BADGES.len());
        let v = serde_json::to_value(&cat).unwrap();
        assert_eq!(v[0]["id"], "first-steps");
        assert_eq!(v[0]["earned"], true);
        assert_eq!(v[1]["earned"], false);
    }

    #[test]
    fn test_summary_percentages() {
        let p = GameProgress::new().with_level_result("minigames", 2, 3);
        let s = summarize(&p);
        assert_eq!((s.levels_completed, s.levels_available), (2, 28));
        let mg = s.worlds.iter().find(|w| w.id == "minigames").unwrap();
        assert!((mg.percent - 25.0).abs() < f64::EPSILON);
        assert!(!mg.mastered);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["levelsAvailable"], 28);
    }
}
