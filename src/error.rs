use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to load font '{path}': {reason}")]
    FontLoad { path: String, reason: String },

    #[error("attempt to use a deleted font")]
    DeletedFont,

    #[error("{caller}(): drawing calls are only allowed inside a draw callback")]
    NoDrawContext { caller: &'static str },
}

impl From<EngineError> for mlua::Error {
    fn from(err: EngineError) -> Self {
        mlua::Error::RuntimeError(err.to_string())
    }
}
