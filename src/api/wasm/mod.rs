//! External API for the `wasm32-unknown-unknown` target, designed to be
//! used in a web environment with JavaScript.

pub mod error;
pub mod local_media_track;
pub mod media_device_info;
pub mod media_manager;

use wasm_bindgen::prelude::*;

use crate::platform;

#[doc(inline)]
pub use self::{
    error::ArgusError, local_media_track::LocalMediaTrack,
    media_device_info::MediaDeviceInfo, media_manager::MediaManager,
};

/// Initializes the [`log`]-based logging of this crate, routing records to
/// the browser console.
///
/// Must be called at most once, before the first [`MediaManager`] is
/// constructed.
#[wasm_bindgen]
pub fn init_logger() {
    platform::init_logger();
}
