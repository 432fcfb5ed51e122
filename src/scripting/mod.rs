mod fonts;
mod sim;
pub mod vm;


use serde::{Deserialize, Serialize};

pub const DEFAULT_SCRIPT_BUDGET_MS: u64 = 20;
pub const DEFAULT_SCRIPT_HOOK_INSTRUCTION_INTERVAL: u32 = 10_000;

pub use vm::ScriptHost;

const MAX_SCRIPT_ERRORS: usize = 100;

#[derive(Serialize, Deserialize, Clone)]
pub struct ScriptError {
    pub script_name: String,
    pub error_message: String,
    pub frame: u64,
}

/// Bounded buffer of script failures. A failing chunk aborts only itself;
/// the host reads this buffer to report what went wrong.
#[derive(Default)]
pub struct ScriptErrors {
    pub entries: Vec<ScriptError>,
}

impl ScriptErrors {
    pub fn push(&mut self, entry: ScriptError) {
        self.entries.push(entry);
        if self.entries.len() > MAX_SCRIPT_ERRORS {
            let excess = self.entries.len() - MAX_SCRIPT_ERRORS;
            self.entries.drain(0..excess);
        }
    }
}
