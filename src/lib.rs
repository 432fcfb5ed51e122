//! Lua scripting surface for the engine: a font-rendering handle bound as
//! collector-managed userdata, plus a handful of simulation accessors. The
//! renderer and simulation themselves live behind the trait seams in
//! [`fonts`], [`units`] and [`sim`].

pub mod command;
pub mod error;
pub mod events;
pub mod fonts;
pub mod scripting;
pub mod sim;
pub mod units;

pub use command::Command;
pub use error::EngineError;
pub use events::{GameEvent, GameEventBus};
pub use fonts::{DrawOptions, FontArena, FontFace, FontId, FontLoader, TextExtents};
pub use scripting::{ScriptError, ScriptHost};
pub use sim::{GameState, QuadField, SimContext};
pub use units::{CommandAi, Unit, UnitLoader, UnitRef};
