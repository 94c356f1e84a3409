//! Wrapper around a live media track for the JS side.

use std::rc::Rc;

use derive_more::From;
use wasm_bindgen::prelude::*;

use crate::platform;

/// Wrapper around a live [MediaStreamTrack][1] acquired via a
/// [`MediaManager`] capture request.
///
/// [`MediaManager`]: crate::api::wasm::MediaManager
/// [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack
#[wasm_bindgen]
#[derive(From)]
pub struct LocalMediaTrack(Rc<dyn platform::MediaStreamTrack>);

#[wasm_bindgen]
impl LocalMediaTrack {
    /// Returns unique identifier of the underlying track.
    #[must_use]
    pub fn id(&self) -> String {
        self.0.id()
    }

    /// Returns kind of the underlying track (`audio`/`video`).
    #[must_use]
    pub fn kind(&self) -> String {
        self.0.kind().to_string()
    }

    /// Returns the underlying [MediaStreamTrack][1], e.g. to attach it to
    /// a media element.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack
    #[must_use]
    pub fn get_track(&self) -> web_sys::MediaStreamTrack {
        self.0.sys_track()
    }

    /// Stops the underlying track, releasing its device.
    pub fn stop(&self) {
        self.0.stop();
    }
}
