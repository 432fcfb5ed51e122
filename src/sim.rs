use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tracing::{info, warn};

use crate::command::Command;
use crate::events::GameEventBus;
use crate::units::{Unit, UnitLoader, UnitRef};

/// Spatial index over unit positions, owned by the simulation.
pub trait QuadField {
    fn units_at(&self, pos: Vec3, radius: f32) -> Vec<Rc<RefCell<Unit>>>;
}

#[derive(Default)]
pub struct GameState {
    pub game_over: bool,
}

/// Everything the forwarder functions touch, passed explicitly instead of
/// reaching for engine singletons.
pub struct SimContext {
    pub game: GameState,
    pub unit_loader: Box<dyn UnitLoader>,
    pub quad_field: Box<dyn QuadField>,
    pub events: GameEventBus,
}

impl SimContext {
    pub fn new(unit_loader: Box<dyn UnitLoader>, quad_field: Box<dyn QuadField>) -> Self {
        Self {
            game: GameState::default(),
            unit_loader,
            quad_field,
            events: GameEventBus::default(),
        }
    }
}

/// Raises the game-over flag and emits the end-of-game summary trigger.
/// Only the first call does anything.
pub fn end_game(ctx: &mut SimContext) {
    if ctx.game.game_over {
        return;
    }
    ctx.game.game_over = true;
    let frame = ctx.events.frame;
    ctx.events
        .emit("game_over", serde_json::json!({ "frame": frame }), None);
    info!("[Rampart sim] Game over raised at frame {frame}");
}

/// Silent no-op when the ref is stale; the unit may have died this frame.
pub fn unit_give_command(unit: &UnitRef, cmd: &Command) {
    let Some(unit) = unit.upgrade() else {
        return;
    };
    unit.borrow_mut().command_ai.give_command(cmd.clone());
}

pub fn command_add_param(cmd: &mut Command, param: f32) {
    cmd.push_param(param);
}

/// `None` when the loader rejects the request; the failure is logged here so
/// callers can surface a plain nil.
pub fn load_unit(
    ctx: &mut SimContext,
    def_name: &str,
    pos: Vec3,
    team: i32,
    build: bool,
) -> Option<UnitRef> {
    match ctx.unit_loader.load_unit(def_name, pos, team, build) {
        Some(unit) => Some(UnitRef::new(&unit)),
        None => {
            warn!("[Rampart sim] Unit load failed for '{def_name}' (team {team})");
            None
        }
    }
}

/// Count only; the matched set stays inside the simulation.
pub fn count_units_at(ctx: &SimContext, pos: Vec3, radius: f32) -> usize {
    ctx.quad_field.units_at(pos, radius).len()
}
