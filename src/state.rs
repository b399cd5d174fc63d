//! Application state: the generator, the progress store and the level being played.
//!
//! This module owns:
//!   - the activity generator (seed vocabulary plus configured words)
//!   - the progress store (exclusive owner of `GameProgress`)
//!   - feedback messages and timing from TOML or defaults
//!   - the running level: session tally, current question or board, phase
//!   - the scheduler whose generation guards every timed transition
//!
//! Every entry point returns the messages to send back. Timers are only queued
//! here; the driver arms them and feeds firings to [`AppState::on_timer`].

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::boards::{ArtCanvas, MemoryBoard, ShapeBoard};
use crate::config::{EngineConfig, Messages, Timing};
use crate::domain::{ActivityInstance, ActivityType, Paint, StarRating, Submission};
use crate::events::{CoreEvent, Signal};
use crate::generator::Generator;
use crate::protocol::{badge_catalog, summarize, to_question, BoardOut, ServerMessage};
use crate::scheduler::{Fired, Scheduler, Timer, Transition};
use crate::scorer::{finalize, record_response, SessionState};
use crate::store::ProgressStore;

/// Where the running level is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for an answer or a board move.
    Playing,
    /// Feedback is shown; the next question is scheduled.
    Feedback,
    /// Board done; the level result is scheduled.
    Finishing,
    /// Stars awarded. Only `next_level` or `leave` make sense now.
    Completed,
}

#[derive(Clone, Debug)]
pub enum Board {
    Memory(MemoryBoard),
    Shapes(ShapeBoard),
    Art(ArtCanvas),
}

impl Board {
    fn from_instance(instance: &ActivityInstance) -> Option<Self> {
        match instance.activity {
            ActivityType::MemoryMatch => MemoryBoard::from_instance(instance).map(Board::Memory),
            ActivityType::ShapeMatch => ShapeBoard::from_instance(instance).map(Board::Shapes),
            ActivityType::ArtRecreate => ArtCanvas::from_instance(instance).map(Board::Art),
            _ => None,
        }
    }

    fn out(&self) -> BoardOut {
        match self {
            Board::Memory(b) => BoardOut::Memory { board: b.clone(), outcome: None },
            Board::Shapes(b) => BoardOut::Shapes { board: b.clone(), outcome: None },
            Board::Art(c) => BoardOut::Art { canvas: c.clone() },
        }
    }
}

/// One attempt at a level.
#[derive(Clone, Debug)]
pub struct LevelRun {
    pub attempt_id: Uuid,
    pub world: String,
    pub level: u32,
    pub session: SessionState,
    pub instance: ActivityInstance,
    pub board: Option<Board>,
    pub phase: Phase,
    seed: Option<u64>,
}

pub struct AppState {
    pub generator: Generator,
    pub store: ProgressStore,
    pub messages: Messages,
    pub timing: Timing,
    scheduler: Scheduler,
    run: Option<LevelRun>,
}

impl AppState {
    /// Build state from a loaded config and an opened store.
    #[instrument(level = "info", skip_all)]
    pub fn new(cfg: &EngineConfig, store: ProgressStore) -> Self {
        let mut words = crate::seeds::seed_word_bank();
        cfg.extend_word_bank(&mut words);
        let generator = Generator::new(words);
        info!(
            target: "shibu_engine",
            easy = generator.words().easy.len(),
            medium = generator.words().medium.len(),
            hard = generator.words().hard.len(),
            total_stars = store.snapshot().total_stars,
            "Engine state ready"
        );
        Self {
            generator,
            store,
            messages: cfg.messages.clone(),
            timing: cfg.timing.clone(),
            scheduler: Scheduler::new(),
            run: None,
        }
    }

    pub fn run(&self) -> Option<&LevelRun> {
        self.run.as_ref()
    }

    /// Timers queued by the last call, for the driver to arm.
    pub fn take_timers(&mut self) -> Vec<Timer> {
        self.scheduler.take_pending()
    }

    pub fn progress_message(&self) -> ServerMessage {
        let progress = self.store.snapshot().clone();
        let summary = summarize(&progress);
        let badges = badge_catalog(&progress);
        ServerMessage::Progress { progress, summary, badges }
    }

    /// Raw generator call; the answer travels with the instance.
    pub fn generate(&self, activity: ActivityType, level: u32, seed: Option<u64>) -> ServerMessage {
        let instance = self.generator.generate_seeded(activity, level, seed);
        ServerMessage::Instance { instance }
    }

    /// Enter a level. Supersedes whatever was running.
    #[instrument(level = "info", skip(self))]
    pub fn start_level(&mut self, world: &str, level: u32, seed: Option<u64>) -> Vec<ServerMessage> {
        self.scheduler.invalidate();
        self.run = None;

        let Some(activity) = ActivityType::for_world(world, level) else {
            warn!(target: "activity", %world, level, "No activity for world");
            return vec![ServerMessage::Unavailable { world: world.to_string() }];
        };
        let instance = self.generator.generate_seeded(activity, level, question_seed(seed, 0));
        let board = Board::from_instance(&instance);
        let run = LevelRun {
            attempt_id: Uuid::new_v4(),
            world: world.to_string(),
            level,
            session: SessionState::new(activity),
            instance,
            board,
            phase: Phase::Playing,
            seed,
        };
        info!(target: "activity", %world, level, ?activity, attempt = %run.attempt_id, "Level started");
        self.store.set_current_level(level);

        let mut out = vec![question_message(&run)];
        if let Some(b) = &run.board {
            out.push(ServerMessage::Board { board: b.out() });
        }
        self.run = Some(run);
        out
    }

    /// Score a typed answer (quiz activities) or a finished canvas (art).
    #[instrument(level = "info", skip(self, answer))]
    pub fn submit_answer(&mut self, answer: Submission) -> Vec<ServerMessage> {
        let Some(run) = self.run.as_mut() else {
            return vec![no_level()];
        };
        if run.phase != Phase::Playing {
            debug!(target: "activity", phase = ?run.phase, "Answer ignored outside play");
            return vec![];
        }
        let activity = run.session.activity;
        if activity.is_board() && activity != ActivityType::ArtRecreate {
            return vec![error("This activity is played on its board")];
        }

        let outcome = record_response(&run.session, &answer, &run.instance);
        run.session = outcome.state;
        let expected = run.instance.expected_text();
        let signal: Signal = CoreEvent::answered(outcome.is_correct, &expected, &self.messages).into();
        let msg = ServerMessage::AnswerResult {
            correct: outcome.is_correct,
            expected,
            correct_so_far: run.session.correct,
            attempted: run.session.attempted,
            signal,
        };

        if run.session.activity == ActivityType::ArtRecreate {
            if outcome.is_correct {
                if let Some(Board::Art(c)) = run.board.as_mut() {
                    c.completed = true;
                }
                run.phase = Phase::Finishing;
                self.scheduler.schedule(Transition::FinishLevel, self.timing.celebration());
            }
        } else {
            run.phase = Phase::Feedback;
            self.scheduler.schedule(Transition::NextQuestion, self.timing.feedback());
        }
        vec![msg]
    }

    pub fn flip_card(&mut self, index: usize) -> Vec<ServerMessage> {
        let Some(run) = self.run.as_mut() else {
            return vec![no_level()];
        };
        let Some(Board::Memory(board)) = run.board.as_mut() else {
            return vec![error("No memory board in play")];
        };
        if run.phase != Phase::Playing {
            return vec![];
        }
        let outcome = board.flip(index);
        debug!(target: "activity", index, ?outcome, moves = board.moves, "Card flipped");
        let out = BoardOut::Memory { board: board.clone(), outcome: Some(outcome) };

        if board.is_complete() {
            run.session = run.session.record_board(board.efficiency());
            run.phase = Phase::Finishing;
            self.scheduler.schedule(Transition::FinishLevel, self.timing.celebration());
        } else if board.needs_settle() {
            self.scheduler.schedule(Transition::HideCards, self.timing.card_hide());
        }
        vec![ServerMessage::Board { board: out }]
    }

    pub fn place_shape(&mut self, piece_id: &str, slot_id: &str) -> Vec<ServerMessage> {
        let Some(run) = self.run.as_mut() else {
            return vec![no_level()];
        };
        let Some(Board::Shapes(board)) = run.board.as_mut() else {
            return vec![error("No shape board in play")];
        };
        if run.phase != Phase::Playing {
            return vec![];
        }
        let outcome = board.drop_piece(piece_id, slot_id);
        debug!(target: "activity", %piece_id, %slot_id, ?outcome, attempts = board.attempts, "Shape dropped");
        let out = BoardOut::Shapes { board: board.clone(), outcome: Some(outcome) };

        if board.is_complete() {
            run.session = run.session.record_board(board.efficiency());
            run.phase = Phase::Finishing;
            self.scheduler.schedule(Transition::FinishLevel, self.timing.celebration());
        }
        vec![ServerMessage::Board { board: out }]
    }

    /// Paint a canvas cell; a canvas matching the target is submitted right away.
    pub fn paint_cell(&mut self, row: usize, col: usize, color: Paint) -> Vec<ServerMessage> {
        let Some(run) = self.run.as_mut() else {
            return vec![no_level()];
        };
        let Some(Board::Art(canvas)) = run.board.as_mut() else {
            return vec![error("No canvas in play")];
        };
        if run.phase != Phase::Playing {
            return vec![];
        }
        let matches = canvas.paint(row, col, color);
        let cells = canvas.cells.clone();
        let mut out = vec![ServerMessage::Board { board: BoardOut::Art { canvas: canvas.clone() } }];
        if matches {
            out.extend(self.submit_answer(Submission::Grid(cells)));
        }
        out
    }

    pub fn reset_canvas(&mut self) -> Vec<ServerMessage> {
        let Some(run) = self.run.as_mut() else {
            return vec![no_level()];
        };
        let Some(Board::Art(canvas)) = run.board.as_mut() else {
            return vec![error("No canvas in play")];
        };
        if run.phase != Phase::Playing {
            return vec![];
        }
        canvas.reset();
        vec![ServerMessage::Board { board: BoardOut::Art { canvas: canvas.clone() } }]
    }

    /// Handle a timer firing. Stale firings are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn on_timer(&mut self, fired: Fired) -> Vec<ServerMessage> {
        if !self.scheduler.is_current(&fired) {
            debug!(target: "activity", ?fired, live = self.scheduler.generation(), "Stale timer ignored");
            return vec![];
        }
        let Some(run) = self.run.as_mut() else {
            return vec![];
        };
        match fired.transition {
            Transition::HideCards => match run.board.as_mut() {
                Some(Board::Memory(board)) if board.needs_settle() => {
                    board.settle();
                    vec![ServerMessage::Board { board: BoardOut::Memory { board: board.clone(), outcome: None } }]
                }
                _ => vec![],
            },
            Transition::NextQuestion if run.phase == Phase::Feedback => {
                if run.session.is_finished() {
                    return self.finish_level();
                }
                let index = run.session.question_index;
                run.instance = self.generator.generate_seeded(
                    run.session.activity,
                    run.level,
                    question_seed(run.seed, index),
                );
                run.phase = Phase::Playing;
                vec![question_message(run)]
            }
            Transition::FinishLevel if run.phase == Phase::Finishing => self.finish_level(),
            _ => {
                debug!(target: "activity", ?fired, phase = ?run.phase, "Timer does not apply to phase");
                vec![]
            }
        }
    }

    /// Replay from the next level of the same world.
    pub fn next_level(&mut self) -> Vec<ServerMessage> {
        match self.run.as_ref() {
            Some(run) => {
                let (world, level) = (run.world.clone(), run.level.saturating_add(1));
                self.start_level(&world, level, None)
            }
            None => vec![no_level()],
        }
    }

    /// Abandon the running level. Pending timers become stale.
    pub fn leave(&mut self) -> Vec<ServerMessage> {
        self.scheduler.invalidate();
        if let Some(run) = self.run.take() {
            info!(target: "activity", world = %run.world, level = run.level, phase = ?run.phase, "Level left");
        }
        vec![self.progress_message()]
    }

    fn finish_level(&mut self) -> Vec<ServerMessage> {
        self.scheduler.invalidate();
        let Some(run) = self.run.as_mut() else {
            return vec![];
        };
        let stars: StarRating = finalize(&run.session);
        run.phase = Phase::Completed;
        let report = self.store.complete_level(&run.world, run.level, stars);
        info!(
            target: "activity",
            world = %run.world,
            level = run.level,
            stars = stars.stars(),
            correct = run.session.correct,
            total = run.session.total_questions,
            new_badges = report.new_badges.len(),
            "Level completed"
        );

        let mut signals: Vec<Signal> =
            vec![CoreEvent::level_completed(&run.world, run.level, stars, &self.messages).into()];
        signals.extend(report.new_badges.iter().map(|b| Signal::from(CoreEvent::badge_earned(b, &self.messages))));
        vec![ServerMessage::LevelComplete {
            world: run.world.clone(),
            level: run.level,
            stars,
            progress: report.progress,
            signals,
        }]
    }
}

/// Per-question seed so a seeded level replays identically.
fn question_seed(seed: Option<u64>, index: u32) -> Option<u64> {
    seed.map(|s| s.wrapping_add(u64::from(index)))
}

fn question_message(run: &LevelRun) -> ServerMessage {
    ServerMessage::Question {
        attempt_id: run.attempt_id,
        world: run.world.clone(),
        level: run.level,
        index: run.session.question_index,
        total: run.session.total_questions,
        question: to_question(&run.instance),
    }
}

fn no_level() -> ServerMessage {
    error("No level in progress")
}

fn error(message: &str) -> ServerMessage {
    ServerMessage::Error { message: message.to_string() }
}
