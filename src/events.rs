use std::collections::VecDeque;

use serde::Serialize;
use tracing::warn;

const MAX_EVENTS: usize = 500;

#[derive(Serialize, Clone)]
pub struct GameEvent {
    pub name: String,
    pub data: serde_json::Value,
    pub frame: u64,
    pub source_unit: Option<u64>,
}

/// Bounded buffer of engine-visible happenings. The host drains or inspects
/// `recent`; scripts only ever append through the forwarder functions.
#[derive(Default)]
pub struct GameEventBus {
    pub recent: VecDeque<GameEvent>,
    pub frame: u64,
    pub dropped_events: u64,
    last_overflow_log_frame: u64,
}

impl GameEventBus {
    /// Advanced by the host once per simulation frame.
    pub fn tick(&mut self) {
        self.frame = self.frame.saturating_add(1);
    }

    pub fn emit(
        &mut self,
        name: impl Into<String>,
        data: serde_json::Value,
        source_unit: Option<u64>,
    ) {
        self.recent.push_back(GameEvent {
            name: name.into(),
            data,
            frame: self.frame,
            source_unit,
        });
        if self.recent.len() > MAX_EVENTS {
            let excess = self.recent.len() - MAX_EVENTS;
            for _ in 0..excess {
                self.recent.pop_front();
            }
            self.dropped_events = self.dropped_events.saturating_add(excess as u64);
            if self.frame.saturating_sub(self.last_overflow_log_frame) >= 60 {
                self.last_overflow_log_frame = self.frame;
                warn!(
                    "[Rampart events] Dropped {} buffered events (total dropped: {})",
                    excess, self.dropped_events
                );
            }
        }
    }
}
