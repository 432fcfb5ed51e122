use serde::{Deserialize, Serialize};

/// An order queued against a unit: a command identifier plus an ordered list
/// of numeric parameters. Parameters are append-only.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Command {
    pub id: i32,
    pub params: Vec<f32>,
}

impl Command {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            params: Vec::new(),
        }
    }

    pub fn push_param(&mut self, param: f32) {
        self.params.push(param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_append_in_order() {
        let mut cmd = Command::new(25);
        cmd.push_param(128.0);
        cmd.push_param(0.0);
        cmd.push_param(-64.5);
        assert_eq!(cmd.id, 25);
        assert_eq!(cmd.params, vec![128.0, 0.0, -64.5]);
    }
}
