use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use mlua::{HookTriggers, Lua, VmState};
use tracing::warn;

use crate::fonts::{FontArena, FontLoader};
use crate::scripting::{ScriptError, ScriptErrors};
use crate::sim::SimContext;

#[derive(Clone, Copy)]
struct ScriptExecutionLimits {
    budget_ms: u64,
    instruction_interval: u32,
}

impl Default for ScriptExecutionLimits {
    fn default() -> Self {
        Self {
            budget_ms: env_u64(
                "RAMPART_SCRIPT_BUDGET_MS",
                crate::scripting::DEFAULT_SCRIPT_BUDGET_MS,
            )
            .max(1),
            instruction_interval: env_u64(
                "RAMPART_SCRIPT_HOOK_INSTRUCTION_INTERVAL",
                crate::scripting::DEFAULT_SCRIPT_HOOK_INSTRUCTION_INTERVAL as u64,
            )
            .clamp(100, 1_000_000) as u32,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn script_execution_limits() -> &'static ScriptExecutionLimits {
    static LIMITS: OnceLock<ScriptExecutionLimits> = OnceLock::new();
    LIMITS.get_or_init(ScriptExecutionLimits::default)
}

fn call_lua_with_budget<T, F>(
    lua: &Lua,
    max_duration: Duration,
    instruction_interval: u32,
    f: F,
) -> mlua::Result<T>
where
    F: FnOnce() -> mlua::Result<T>,
{
    let started = Instant::now();
    let budget_ms = max_duration.as_secs_f64() * 1000.0;
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(instruction_interval.max(1)),
        move |_lua, _debug| {
            if started.elapsed() >= max_duration {
                return Err(mlua::Error::RuntimeError(format!(
                    "Script execution budget exceeded ({budget_ms:.1}ms)"
                )));
            }
            Ok(VmState::Continue)
        },
    );
    let out = f();
    lua.remove_hook();
    out
}

/// Owns the Lua state and wires both binding surfaces into it. Everything
/// runs on the caller's thread; shared state is plain `Rc`/`RefCell`.
pub struct ScriptHost {
    lua: Lua,
    sim: Rc<RefCell<SimContext>>,
    fonts: Rc<RefCell<FontArena>>,
    drawing: Rc<Cell<bool>>,
    errors: ScriptErrors,
}

impl ScriptHost {
    pub fn new(loader: Rc<dyn FontLoader>, sim: SimContext) -> mlua::Result<Self> {
        let lua = Lua::new();
        let sim = Rc::new(RefCell::new(sim));
        let fonts = Rc::new(RefCell::new(FontArena::default()));
        let drawing = Rc::new(Cell::new(false));

        super::fonts::install(&lua, fonts.clone(), loader, drawing.clone())?;
        super::sim::install(&lua, sim.clone())?;

        Ok(Self {
            lua,
            sim,
            fonts,
            drawing,
            errors: ScriptErrors::default(),
        })
    }

    /// The engine flips this around its draw call-ins; font draw calls are
    /// rejected while it is off.
    pub fn set_drawing_enabled(&self, enabled: bool) {
        self.drawing.set(enabled);
    }

    /// Advances the frame stamp used by events and error reports.
    pub fn tick(&self) {
        self.sim.borrow_mut().events.tick();
    }

    pub fn sim(&self) -> Rc<RefCell<SimContext>> {
        self.sim.clone()
    }

    pub fn fonts(&self) -> Rc<RefCell<FontArena>> {
        self.fonts.clone()
    }

    pub fn errors(&self) -> &[ScriptError] {
        &self.errors.entries
    }

    /// Runs one chunk to completion under the execution budget. A failure
    /// aborts the chunk only; it is recorded and handed back to the caller.
    pub fn run(&mut self, name: &str, source: &str) -> mlua::Result<()> {
        let limits = script_execution_limits();
        let result = call_lua_with_budget(
            &self.lua,
            Duration::from_millis(limits.budget_ms),
            limits.instruction_interval,
            || self.lua.load(source).set_name(name).exec(),
        );
        if let Err(err) = &result {
            let frame = self.sim.borrow().events.frame;
            self.errors.push(ScriptError {
                script_name: name.to_string(),
                error_message: err.to_string(),
                frame,
            });
            warn!("[Rampart scripts] '{name}' failed: {err}");
        }
        result
    }

    /// Forces a full GC cycle so dropped font handles release their slots
    /// deterministically when the host wants them gone.
    pub fn collect_garbage(&self) -> mlua::Result<()> {
        self.lua.gc_collect()
    }
}
