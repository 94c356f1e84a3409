//! `wasm32-unknown-unknown` platform backend based on [`web-sys`].
//!
//! [`web-sys`]: https://docs.rs/web-sys

mod constraints;
mod error;
mod media_devices;
mod media_track;

use std::future::Future;

use web_sys::Window;

#[doc(inline)]
pub use self::{
    media_devices::WebMediaDevices, media_track::WebMediaStreamTrack,
};

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

/// No-op placeholder for the panic hook installer.
#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

/// Returns [`Window`] object.
///
/// # Panics
///
/// When global [`Window`] object is inaccessible.
#[must_use]
pub fn window() -> Window {
    // Cannot use `lazy_static` since `window` is `!Sync`.
    // Safe to unwrap.
    web_sys::window().unwrap()
}

/// Spawns the provided future on the current thread.
pub fn spawn<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}

/// Initializes the [`log`]ging of this crate, routing records to the
/// browser console.
///
/// Must be called at most once.
pub fn init_logger() {
    wasm_logger::init(wasm_logger::Config::default());
}
