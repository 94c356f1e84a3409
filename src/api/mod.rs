//! External APIs of this crate.

#[cfg(target_arch = "wasm32")]
pub mod wasm;
