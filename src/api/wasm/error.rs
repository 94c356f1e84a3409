//! Error objects thrown into the JS side.

use tracerr::Traced;
use wasm_bindgen::prelude::*;

use crate::media::{
    GetDisplayMediaError, GetUserMediaError, PermissionsUnavailableError,
};

/// Error thrown into the JS side, carrying its name, a human-readable
/// message, and the Rust-side stacktrace it was propagated along.
#[wasm_bindgen]
pub struct ArgusError {
    /// Name of this [`ArgusError`].
    name: &'static str,

    /// Message of this [`ArgusError`].
    message: String,

    /// Stacktrace of this [`ArgusError`].
    trace: String,
}

#[wasm_bindgen]
impl ArgusError {
    /// Returns name of this [`ArgusError`].
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn name(&self) -> String {
        self.name.to_owned()
    }

    /// Returns message of this [`ArgusError`].
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Returns stacktrace of this [`ArgusError`].
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn trace(&self) -> String {
        self.trace.clone()
    }
}

impl From<Traced<PermissionsUnavailableError>> for ArgusError {
    fn from(err: Traced<PermissionsUnavailableError>) -> Self {
        Self {
            name: "PermissionsUnavailable",
            message: err.as_ref().to_string(),
            trace: err.trace().to_string(),
        }
    }
}

impl From<Traced<GetUserMediaError>> for ArgusError {
    fn from(err: Traced<GetUserMediaError>) -> Self {
        Self {
            name: "GetUserMediaFailed",
            message: err.as_ref().to_string(),
            trace: err.trace().to_string(),
        }
    }
}

impl From<Traced<GetDisplayMediaError>> for ArgusError {
    fn from(err: Traced<GetDisplayMediaError>) -> Self {
        Self {
            name: "GetDisplayMediaFailed",
            message: err.as_ref().to_string(),
            trace: err.trace().to_string(),
        }
    }
}
