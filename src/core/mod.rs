//! Engine core: dice, constants, economy, progression and the tick.

pub mod constants;
pub mod dice;
pub mod economy;
pub mod error;
pub mod progression;
pub mod tick;

pub use dice::{Dice, RandomDice, RecordingDice, ScriptedDice};
pub use error::ResolveError;
pub use tick::{tick, TickEvent, TickResult};
