//! Dice sources. Every random decision in a tick goes through [`Dice`], so a
//! tick is exactly reproducible from the sequence of rolls it consumed.

use rand::Rng;

use super::constants::DICE_SIDES;

/// Produces one integer roll per call.
///
/// Production sources roll 1..=20, but any `i32` is accepted. Resolvers add
/// bonuses with saturating arithmetic.
pub trait Dice {
    fn roll(&mut self) -> i32;

    /// Picks an element by `roll mod len`. Returns `None` for an empty slice
    /// without consuming a roll.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.roll().rem_euclid(items.len() as i32) as usize;
        items.get(index)
    }

    /// Picks a flavor line. An empty list yields an empty string and no roll.
    fn flavor(&mut self, messages: &[String]) -> String {
        self.pick(messages).cloned().unwrap_or_default()
    }
}

impl<F: FnMut() -> i32> Dice for F {
    fn roll(&mut self) -> i32 {
        self()
    }
}

/// Uniform 1..=20 rolls from any RNG.
///
/// Pass `RandomDice::new(rand::thread_rng())` in production, or a seeded
/// `ChaCha8Rng` for reproducible runs.
#[derive(Debug, Clone)]
pub struct RandomDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Dice for RandomDice<R> {
    fn roll(&mut self) -> i32 {
        self.rng.gen_range(1..=DICE_SIDES)
    }
}

/// Replays a fixed sequence of rolls, wrapping around at the end.
/// An empty script always rolls 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: Vec<i32>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl Into<Vec<i32>>) -> Self {
        Self {
            rolls: rolls.into(),
            cursor: 0,
        }
    }

    /// Number of rolls consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> i32 {
        if self.rolls.is_empty() {
            self.cursor += 1;
            return 1;
        }
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}

/// Records every roll of an inner source so the tick can be replayed with
/// [`ScriptedDice`].
#[derive(Debug, Clone)]
pub struct RecordingDice<D> {
    inner: D,
    rolls: Vec<i32>,
}

impl<D: Dice> RecordingDice<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            rolls: Vec::new(),
        }
    }

    pub fn rolls(&self) -> &[i32] {
        &self.rolls
    }

    pub fn replay(&self) -> ScriptedDice {
        ScriptedDice::new(self.rolls.clone())
    }
}

impl<D: Dice> Dice for RecordingDice<D> {
    fn roll(&mut self) -> i32 {
        let roll = self.inner.roll();
        self.rolls.push(roll);
        roll
    }
}
