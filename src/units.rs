use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec3;

use crate::command::Command;

/// Per-unit command queue, owned by the engine's command subsystem.
pub trait CommandAi {
    fn give_command(&mut self, cmd: Command);
}

/// Creates units inside the running simulation. Returns `None` when the
/// definition is unknown or the unit cap is hit.
pub trait UnitLoader {
    fn load_unit(
        &mut self,
        def_name: &str,
        pos: Vec3,
        team: i32,
        build: bool,
    ) -> Option<Rc<RefCell<Unit>>>;
}

pub struct Unit {
    pub id: u64,
    pub def_name: String,
    pub pos: Vec3,
    pub team: i32,
    pub command_ai: Box<dyn CommandAi>,
}

/// Nullable reference to a simulation unit. The simulation owns units and may
/// destroy them at any frame, so holders must upgrade before every use and
/// treat a dead ref as a silent no-op.
#[derive(Clone, Default)]
pub struct UnitRef(Weak<RefCell<Unit>>);

impl UnitRef {
    pub fn new(unit: &Rc<RefCell<Unit>>) -> Self {
        Self(Rc::downgrade(unit))
    }

    /// A ref that was never attached, or whose unit is already gone.
    pub fn null() -> Self {
        Self(Weak::new())
    }

    pub fn upgrade(&self) -> Option<Rc<RefCell<Unit>>> {
        self.0.upgrade()
    }

    pub fn is_stale(&self) -> bool {
        self.0.strong_count() == 0
    }
}
