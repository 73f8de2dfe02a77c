//! Error types
//!
//! The simulation itself never fails once a game exists; errors only come from
//! construction, configuration and the browser layer.

use thiserror::Error;

/// Errors that can occur while setting up or hosting a game.
#[derive(Error, Debug)]
pub enum BreakoutError {
    /// No eligible blocks: there is nothing to play.
    #[error("no eligible blocks on the page")]
    NoBlocks,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A DOM lookup or mutation failed.
    #[error("dom error: {0}")]
    Dom(String),
}

impl BreakoutError {
    /// Construction aborts that should be treated as "skip the game", not as a failure
    pub fn is_nothing_to_play(&self) -> bool {
        matches!(self, BreakoutError::NoBlocks)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<BreakoutError> for wasm_bindgen::JsValue {
    fn from(err: BreakoutError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
