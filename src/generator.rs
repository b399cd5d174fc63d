//! Procedural activity generation.
//!
//! Every generator is a pure function of (activity, level, random source). Interactive
//! play draws from entropy; tests and replays pass a seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    blank_grid, ActivityInstance, ActivityType, Answer, Card, CountKind, DifficultyTier, Grid,
    Operator, Paint, Prompt, ShapePiece, ShapeSlot, WordBank, WordEntry,
};
use crate::seeds::{
    seed_word_bank, CLOSED_PATTERNS, COLOR_PALETTE, COUNT_OBJECTS, MAX_MEMORY_PAIRS,
    MEMORY_FACES, PATTERN_DISTRACTORS, PATTERN_SYMBOLS, SHAPE_COLORS, SHAPE_TYPES,
};

/// Shuffles tried before falling back to a rotation.
const MAX_RESHUFFLES: usize = 8;

/// True if some permutation of `word` differs from it.
pub fn is_scramblable(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => chars.any(|c| c != first),
        None => false,
    }
}

/// Generates activity instances from a vocabulary bank and the built-in catalogs.
#[derive(Clone, Debug)]
pub struct Generator {
    words: WordBank,
}

impl Default for Generator {
    fn default() -> Self {
        Self { words: seed_word_bank() }
    }
}

impl Generator {
    /// Build a generator, dropping words that cannot be scrambled.
    pub fn new(mut words: WordBank) -> Self {
        for tier in [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard] {
            words.tier_mut(tier).retain(|e| {
                let ok = is_scramblable(&e.word);
                if !ok {
                    warn!(target: "activity", word = %e.word, "Dropping vocabulary entry that cannot be scrambled");
                }
                ok
            });
        }
        Self { words }
    }

    pub fn words(&self) -> &WordBank {
        &self.words
    }

    /// Generate with a fixed seed (reproducible) or from entropy when `seed` is `None`.
    pub fn generate_seeded(&self, activity: ActivityType, level: u32, seed: Option<u64>) -> ActivityInstance {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        self.generate(activity, level, &mut rng)
    }

    #[instrument(level = "debug", skip(self, rng))]
    pub fn generate<R: Rng + ?Sized>(&self, activity: ActivityType, level: u32, rng: &mut R) -> ActivityInstance {
        let tier = DifficultyTier::from_level(level);
        let id = Uuid::from_bytes(rng.gen());
        let (prompt, answer, options) = match activity {
            ActivityType::Arithmetic => {
                let (p, a) = arithmetic(tier, rng);
                (p, a, Vec::new())
            }
            ActivityType::WordUnscramble => {
                let (p, a) = self.word_unscramble(tier, rng);
                (p, a, Vec::new())
            }
            ActivityType::PatternSequence => pattern_sequence(tier, rng),
            ActivityType::ColorMatch => color_match(level, rng),
            ActivityType::ShapeMatch => {
                let (p, a) = shape_match(level, rng);
                (p, a, Vec::new())
            }
            ActivityType::MemoryMatch => {
                let (p, a) = memory_match(level, rng);
                (p, a, Vec::new())
            }
            ActivityType::ArtRecreate => {
                let (p, a) = art_recreate(tier);
                (p, a, Vec::new())
            }
            ActivityType::CountLearn => {
                let (p, a) = count_learn(tier, rng);
                (p, a, Vec::new())
            }
        };
        debug!(target: "activity", ?activity, level, ?tier, %id, options = options.len(), "Generated instance");
        ActivityInstance { id, activity, level, tier, prompt, answer, options }
    }

    fn word_unscramble<R: Rng + ?Sized>(&self, tier: DifficultyTier, rng: &mut R) -> (Prompt, Answer) {
        let fallback;
        let list: &[WordEntry] = if self.words.tier(tier).is_empty() {
            fallback = seed_word_bank();
            fallback.tier(tier)
        } else {
            self.words.tier(tier)
        };
        let pick = &list[rng.gen_range(0..list.len())];
        let scrambled = scramble(&pick.word, rng);
        (
            Prompt::WordUnscramble { scrambled, hint: pick.hint.clone() },
            Answer::Word(pick.word.clone()),
        )
    }
}

/// Permutes the letters of `word` so the result never equals the input
/// (for any scramblable word).
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let original: Vec<char> = word.chars().collect();
    let mut chars = original.clone();
    for _ in 0..MAX_RESHUFFLES {
        chars.shuffle(rng);
        if chars != original {
            return chars.into_iter().collect();
        }
    }
    // Left rotation by one only reproduces words of a single repeated letter.
    chars = original;
    chars.rotate_left(1);
    chars.into_iter().collect()
}

fn arithmetic<R: Rng + ?Sized>(tier: DifficultyTier, rng: &mut R) -> (Prompt, Answer) {
    const MEDIUM_OPS: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];
    const HARD_OPS: [Operator; 4] = [Operator::Add, Operator::Subtract, Operator::Multiply, Operator::Divide];

    let (mut left, mut right, operator): (i64, i64, Operator) = match tier {
        DifficultyTier::Easy => {
            let op = if rng.gen_bool(0.7) { Operator::Add } else { Operator::Subtract };
            (rng.gen_range(1..=10), rng.gen_range(1..=10), op)
        }
        DifficultyTier::Medium => (
            rng.gen_range(1..=20),
            rng.gen_range(1..=10),
            MEDIUM_OPS[rng.gen_range(0..MEDIUM_OPS.len())],
        ),
        DifficultyTier::Hard => (
            rng.gen_range(1..=50),
            rng.gen_range(1..=12),
            HARD_OPS[rng.gen_range(0..HARD_OPS.len())],
        ),
    };

    let answer = match operator {
        Operator::Add => left + right,
        Operator::Subtract => {
            if right > left {
                std::mem::swap(&mut left, &mut right);
            }
            left - right
        }
        Operator::Multiply => left * right,
        Operator::Divide => {
            // Built backwards from the quotient so the division is exact.
            let quotient = rng.gen_range(1..=12);
            left = quotient * right;
            quotient
        }
    };
    (Prompt::Arithmetic { left, right, operator }, Answer::Number(answer))
}

fn pattern_sequence<R: Rng + ?Sized>(tier: DifficultyTier, rng: &mut R) -> (Prompt, Answer, Vec<String>) {
    let (sequence, answer, mut options): (Vec<String>, String, Vec<String>) = match tier {
        DifficultyTier::Easy => {
            let mut symbols = PATTERN_SYMBOLS.to_vec();
            symbols.shuffle(rng);
            let (a, b) = (symbols[0], symbols[1]);
            let sequence: Vec<String> = (0..4).map(|i| (if i % 2 == 0 { a } else { b }).to_string()).collect();
            let mut spare: Vec<&str> = symbols[2..].iter().chain(PATTERN_DISTRACTORS.iter()).copied().collect();
            spare.shuffle(rng);
            let options = [a, b, spare[0], spare[1]].iter().map(|s| s.to_string()).collect();
            (sequence, a.to_string(), options)
        }
        DifficultyTier::Medium => {
            let start: i64 = rng.gen_range(1..=5);
            let step: i64 = rng.gen_range(1..=3);
            let term = |i: i64| (start + i * step).to_string();
            let sequence = (0..4).map(|i| term(i)).collect();
            // Repeating the last term or skipping ahead breaks the constant step.
            let options = vec![term(4), term(3), term(5), term(6)];
            (sequence, term(4), options)
        }
        DifficultyTier::Hard => {
            let p = &CLOSED_PATTERNS[rng.gen_range(0..CLOSED_PATTERNS.len())];
            let mut options = vec![p.answer.to_string()];
            options.extend(p.distractors.iter().map(|d| d.to_string()));
            (p.sequence.iter().map(|s| s.to_string()).collect(), p.answer.to_string(), options)
        }
    };
    options.shuffle(rng);
    (Prompt::PatternSequence { sequence }, Answer::Choice(answer), options)
}

fn color_match<R: Rng + ?Sized>(level: u32, rng: &mut R) -> (Prompt, Answer, Vec<String>) {
    let available = (4 + 2 * level as usize).min(COLOR_PALETTE.len());
    let target = rng.gen_range(0..available);
    let others: Vec<usize> = (0..available).filter(|&i| i != target).collect();
    let mut options: Vec<String> = others
        .choose_multiple(rng, 3)
        .map(|&i| COLOR_PALETTE[i].1.to_string())
        .collect();
    let (hex, name) = COLOR_PALETTE[target];
    options.push(name.to_string());
    options.shuffle(rng);
    (
        Prompt::ColorMatch { target_hex: hex.into(), target_name: name.into() },
        Answer::Choice(name.into()),
        options,
    )
}

fn shape_match<R: Rng + ?Sized>(level: u32, rng: &mut R) -> (Prompt, Answer) {
    let count = (3 + level as usize).min(SHAPE_TYPES.len());
    let mut pieces: Vec<ShapePiece> = SHAPE_TYPES[..count]
        .iter()
        .enumerate()
        .map(|(i, shape)| ShapePiece {
            id: format!("shape-{}", i),
            shape: shape.to_string(),
            color: SHAPE_COLORS[i % SHAPE_COLORS.len()].to_string(),
            placed: false,
        })
        .collect();
    let mut slots: Vec<ShapeSlot> = SHAPE_TYPES[..count]
        .iter()
        .enumerate()
        .map(|(i, shape)| ShapeSlot { id: format!("slot-{}", i), shape: shape.to_string(), filled: false })
        .collect();
    pieces.shuffle(rng);
    slots.shuffle(rng);
    (Prompt::ShapeMatch { pieces, slots }, Answer::Efficiency { ideal: count as u32 })
}

fn memory_match<R: Rng + ?Sized>(level: u32, rng: &mut R) -> (Prompt, Answer) {
    let pairs = (4 + level as usize).min(MAX_MEMORY_PAIRS);
    let mut faces: Vec<&str> = MEMORY_FACES[..pairs].iter().chain(MEMORY_FACES[..pairs].iter()).copied().collect();
    faces.shuffle(rng);
    let cards = faces
        .into_iter()
        .enumerate()
        .map(|(id, face)| Card { id, face: face.to_string(), flipped: false, matched: false })
        .collect();
    (Prompt::MemoryMatch { cards }, Answer::Efficiency { ideal: pairs as u32 })
}

/// Target picture for the art canvas.
pub fn art_target(tier: DifficultyTier) -> Grid {
    let size = match tier {
        DifficultyTier::Easy => 4,
        DifficultyTier::Medium => 5,
        DifficultyTier::Hard => 6,
    };
    let mut grid = blank_grid(size);
    for (r, row) in grid.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            let painted = match tier {
                DifficultyTier::Easy => r == size / 2 || c == size / 2,
                DifficultyTier::Medium => (r + c) % 2 == 0,
                DifficultyTier::Hard => r == 0 || c == 0 || r == size - 1 || c == size - 1,
            };
            if painted {
                *cell = match tier {
                    DifficultyTier::Easy => Paint::Red,
                    DifficultyTier::Medium => Paint::Blue,
                    DifficultyTier::Hard => Paint::Green,
                };
            }
        }
    }
    grid
}

fn art_recreate(tier: DifficultyTier) -> (Prompt, Answer) {
    let target = art_target(tier);
    (
        Prompt::ArtRecreate { target: target.clone(), palette: Paint::PALETTE.to_vec() },
        Answer::Grid(target),
    )
}

fn count_learn<R: Rng + ?Sized>(tier: DifficultyTier, rng: &mut R) -> (Prompt, Answer) {
    let roll: f64 = rng.gen();
    match tier {
        DifficultyTier::Easy => counting(1, 10, rng),
        DifficultyTier::Medium if roll < 0.7 => counting(5, 15, rng),
        DifficultyTier::Medium => addition(1, 10, rng),
        DifficultyTier::Hard if roll < 0.4 => counting(10, 20, rng),
        DifficultyTier::Hard if roll < 0.7 => addition(1, 15, rng),
        DifficultyTier::Hard => subtraction(5, 15, rng),
    }
}

fn object<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    COUNT_OBJECTS[rng.gen_range(0..COUNT_OBJECTS.len())]
}

fn counting<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> (Prompt, Answer) {
    let n = rng.gen_range(min..=max);
    let objects = vec![object(rng).to_string(); n];
    (Prompt::CountLearn { count_kind: CountKind::Count, objects }, Answer::Number(n as i64))
}

fn addition<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> (Prompt, Answer) {
    let (a, b) = (rng.gen_range(min..=max), rng.gen_range(min..=max));
    let (ea, eb) = (object(rng), object(rng));
    let mut objects = vec![ea.to_string(); a];
    objects.push("➕".into());
    objects.extend(std::iter::repeat(eb.to_string()).take(b));
    (Prompt::CountLearn { count_kind: CountKind::Add, objects }, Answer::Number((a + b) as i64))
}

fn subtraction<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> (Prompt, Answer) {
    let total = rng.gen_range(min..=max) + 5;
    let taken = rng.gen_range(min..=max.min(total));
    let mut objects = vec![object(rng).to_string(); total];
    objects.push("➖".into());
    objects.extend(std::iter::repeat("❌".to_string()).take(taken));
    (
        Prompt::CountLearn { count_kind: CountKind::Subtract, objects },
        Answer::Number((total - taken) as i64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const LEVELS: [u32; 6] = [1, 2, 3, 4, 5, 8];

    fn gen(activity: ActivityType, level: u32, seed: u64) -> ActivityInstance {
        Generator::default().generate_seeded(activity, level, Some(seed))
    }

    #[test]
    fn test_same_seed_reproduces_instance() {
        for a in ActivityType::ALL {
            assert_eq!(gen(a, 3, 99), gen(a, 3, 99));
        }
    }

    #[test]
    fn test_arithmetic_results_non_negative_and_exact() {
        let mut saw_divide = false;
        for level in LEVELS {
            for seed in 0..400 {
                let inst = gen(ActivityType::Arithmetic, level, seed);
                let Prompt::Arithmetic { left, right, operator } = inst.prompt else { panic!("wrong prompt") };
                let Answer::Number(answer) = inst.answer else { panic!("wrong answer") };
                assert!(answer >= 0, "{} {:?} {} = {}", left, operator, right, answer);
                match operator {
                    Operator::Add => assert_eq!(left + right, answer),
                    Operator::Subtract => assert_eq!(left - right, answer),
                    Operator::Multiply => assert_eq!(left * right, answer),
                    Operator::Divide => {
                        saw_divide = true;
                        assert_eq!(left % right, 0);
                        assert_eq!(left / right, answer);
                    }
                }
            }
        }
        assert!(saw_divide);
    }

    #[test]
    fn test_operators_by_tier() {
        for seed in 0..200 {
            let Prompt::Arithmetic { operator, .. } = gen(ActivityType::Arithmetic, 1, seed).prompt else { panic!() };
            assert!(matches!(operator, Operator::Add | Operator::Subtract));
            let Prompt::Arithmetic { operator, .. } = gen(ActivityType::Arithmetic, 4, seed).prompt else { panic!() };
            assert_ne!(operator, Operator::Divide);
        }
    }

    #[test]
    fn test_scramble_never_equals_word() {
        for level in LEVELS {
            for seed in 0..300 {
                let inst = gen(ActivityType::WordUnscramble, level, seed);
                let Prompt::WordUnscramble { scrambled, .. } = &inst.prompt else { panic!() };
                let Answer::Word(word) = &inst.answer else { panic!() };
                assert_ne!(scrambled, word);
                let mut a: Vec<char> = scrambled.chars().collect();
                let mut b: Vec<char> = word.chars().collect();
                a.sort();
                b.sort();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_scramble_two_letter_word() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(scramble("ab", &mut rng), "ba");
        }
    }

    #[test]
    fn test_unscramblable_words_dropped() {
        let mut bank = WordBank::default();
        bank.easy.push(WordEntry { word: "aaa".into(), hint: "x".into() });
        bank.easy.push(WordEntry { word: "bee".into(), hint: "🐝".into() });
        let g = Generator::new(bank);
        assert_eq!(g.words().easy.len(), 1);
        assert_eq!(g.words().easy[0].word, "bee");
    }

    #[test]
    fn test_empty_tier_falls_back_to_seeds() {
        let g = Generator::new(WordBank::default());
        let inst = g.generate_seeded(ActivityType::WordUnscramble, 5, Some(3));
        let Answer::Word(w) = inst.answer else { panic!() };
        assert!(seed_word_bank().hard.iter().any(|e| e.word == w));
    }

    fn assert_options_valid(inst: &ActivityInstance) {
        let Answer::Choice(answer) = &inst.answer else { panic!("choice expected") };
        assert_eq!(inst.options.iter().filter(|o| *o == answer).count(), 1);
        let set: HashSet<&String> = inst.options.iter().collect();
        assert_eq!(set.len(), inst.options.len());
    }

    #[test]
    fn test_pattern_options_contain_answer_once() {
        for level in LEVELS {
            for seed in 0..300 {
                let inst = gen(ActivityType::PatternSequence, level, seed);
                assert_options_valid(&inst);
                assert_eq!(inst.options.len(), 4);
            }
        }
    }

    #[test]
    fn test_medium_pattern_extrapolates() {
        for seed in 0..100 {
            let inst = gen(ActivityType::PatternSequence, 3, seed);
            let Prompt::PatternSequence { sequence } = &inst.prompt else { panic!() };
            let nums: Vec<i64> = sequence.iter().map(|s| s.parse().unwrap()).collect();
            let step = nums[1] - nums[0];
            assert_eq!(inst.answer, Answer::Choice((nums[3] + step).to_string()));
        }
    }

    #[test]
    fn test_color_options() {
        for level in [0, 1, 3, 6] {
            for seed in 0..300 {
                let inst = gen(ActivityType::ColorMatch, level, seed);
                assert_eq!(inst.options.len(), 4);
                assert_options_valid(&inst);
            }
        }
    }

    #[test]
    fn test_memory_deck_is_pairs() {
        for (level, pairs) in [(1, 5), (3, 7), (4, 8), (9, 8)] {
            let inst = gen(ActivityType::MemoryMatch, level, 11);
            let Prompt::MemoryMatch { cards } = &inst.prompt else { panic!() };
            assert_eq!(cards.len(), pairs * 2);
            for c in cards {
                assert_eq!(cards.iter().filter(|o| o.face == c.face).count(), 2);
            }
            assert_eq!(inst.answer, Answer::Efficiency { ideal: pairs as u32 });
        }
    }

    #[test]
    fn test_shape_set_size() {
        let inst = gen(ActivityType::ShapeMatch, 2, 5);
        let Prompt::ShapeMatch { pieces, slots } = &inst.prompt else { panic!() };
        assert_eq!(pieces.len(), 5);
        assert_eq!(slots.len(), 5);
        let big = gen(ActivityType::ShapeMatch, 10, 5);
        assert_eq!(big.answer, Answer::Efficiency { ideal: 6 });
    }

    #[test]
    fn test_art_targets() {
        let easy = art_target(DifficultyTier::Easy);
        assert_eq!(easy.len(), 4);
        assert_eq!(easy[2][0], Paint::Red);
        assert_eq!(easy[0][0], Paint::White);

        let medium = art_target(DifficultyTier::Medium);
        assert_eq!(medium.len(), 5);
        assert_eq!(medium[0][0], Paint::Blue);
        assert_eq!(medium[0][1], Paint::White);

        let hard = art_target(DifficultyTier::Hard);
        assert_eq!(hard.len(), 6);
        assert_eq!(hard[0][3], Paint::Green);
        assert_eq!(hard[5][5], Paint::Green);
        assert_eq!(hard[2][2], Paint::White);
    }

    #[test]
    fn test_count_learn_answers_non_negative() {
        for level in LEVELS {
            for seed in 0..300 {
                let inst = gen(ActivityType::CountLearn, level, seed);
                let Answer::Number(n) = inst.answer else { panic!() };
                assert!(n >= 0);
                let Prompt::CountLearn { count_kind, objects } = &inst.prompt else { panic!() };
                if *count_kind == CountKind::Count {
                    assert_eq!(objects.len() as i64, n);
                }
            }
        }
    }
}
