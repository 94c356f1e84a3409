//! Representation of a [MediaDeviceInfo][1] for the JS side.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#device-info

use derive_more::From;
use wasm_bindgen::prelude::*;

use crate::media;

/// Representation of a [MediaDeviceInfo][1].
///
/// [1]: https://w3.org/TR/mediacapture-streams/#device-info
#[wasm_bindgen]
#[derive(From)]
pub struct MediaDeviceInfo(media::MediaDeviceInfo);

#[wasm_bindgen]
impl MediaDeviceInfo {
    /// Returns unique identifier of the represented device.
    #[wasm_bindgen(getter = deviceId)]
    #[must_use]
    pub fn device_id(&self) -> String {
        self.0.device_id().to_owned()
    }

    /// Returns kind of the represented device
    /// (`videoinput`/`audioinput`/`audiooutput`).
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn kind(&self) -> String {
        self.0.kind().to_string()
    }

    /// Returns label describing the represented device (for example
    /// "External USB Webcam").
    ///
    /// Empty string if the device has no associated label.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn label(&self) -> String {
        self.0.label().to_owned()
    }

    /// Returns group identifier of the represented device, if any.
    #[wasm_bindgen(getter = groupId)]
    #[must_use]
    pub fn group_id(&self) -> Option<String> {
        self.0.group_id().map(ToOwned::to_owned)
    }
}
