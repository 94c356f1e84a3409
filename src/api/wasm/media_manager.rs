//! JS side of the [`media::MediaManager`].
//!
//! [`media::MediaManager`]: crate::media::MediaManager

use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::{
    browser::{BrowserIdentity, NavigatorInfo},
    media::{
        self, AudioTrackConstraints, MediaStreamConstraints,
        VideoTrackConstraints,
    },
    platform::{self, WebMediaDevices},
};

use super::{ArgusError, LocalMediaTrack, MediaDeviceInfo};

/// Manager of media capabilities permissions and enumerable devices,
/// backed by the browser's `navigator`.
///
/// Construct one instance from the application's composition root and pass
/// it around: all methods are safe to call before readiness, and
/// [`MediaManager::on_ready`] resolves once the initial probe-and-refresh
/// sequence has completed.
#[wasm_bindgen]
pub struct MediaManager(media::MediaManager);

#[wasm_bindgen]
impl MediaManager {
    /// Instantiates a new [`MediaManager`], resolving the runtime identity
    /// from the `navigator` and spawning the initial probe-and-refresh
    /// sequence.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        platform::set_panic_hook();

        let navigator = platform::window().navigator();
        let browser = BrowserIdentity::detect(&NavigatorInfo {
            user_agent: navigator.user_agent().unwrap_or_default(),
            vendor: navigator.vendor(),
            platform: navigator.platform().unwrap_or_default(),
            app_version: navigator.app_version().unwrap_or_default(),
        });

        let manager = media::MediaManager::new(
            Rc::new(WebMediaDevices::new()),
            browser,
        );

        let bootstrap = manager.clone();
        platform::spawn(async move {
            bootstrap.bootstrap().await;
        });

        Self(manager)
    }

    /// Returns the resolved browser family.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn browser(&self) -> String {
        self.0.browser().browser().to_owned()
    }

    /// Returns the resolved browser version.
    #[wasm_bindgen(getter = browserVersion)]
    #[must_use]
    pub fn browser_version(&self) -> String {
        self.0.browser().version().to_owned()
    }

    /// Returns the resolved operating system family.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn os(&self) -> String {
        self.0.browser().os().to_owned()
    }

    /// Resolves once the initial probe-and-refresh sequence has completed.
    ///
    /// Resolves immediately when subscribed after the fact.
    #[must_use]
    pub fn on_ready(&self) -> Promise {
        let ready = self.0.on_ready();
        future_to_promise(async move {
            ready.await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Queries the browser for the current state of both capabilities.
    ///
    /// Rejects with an [`ArgusError`] named `PermissionsUnavailable` when the
    /// Permissions API is absent; capabilities can still be requested on
    /// demand then.
    #[must_use]
    pub fn probe_permissions(&self) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            this.probe_permissions()
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(ArgusError::from)
                .map_err(JsValue::from)
        })
    }

    /// Requests the provided capabilities from the user, releasing any
    /// acquired media immediately.
    #[must_use]
    pub fn request_permissions(&self, video: bool, audio: bool) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            this.request_permissions(video, audio).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Refreshes the device catalog from the browser's enumeration
    /// facility.
    #[must_use]
    pub fn refresh_devices(&self) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            this.refresh_devices().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Indicates whether camera access is currently believed granted.
    #[must_use]
    pub fn has_camera_access(&self) -> bool {
        self.0.has_camera_access()
    }

    /// Indicates whether microphone access is currently believed granted.
    #[must_use]
    pub fn has_microphone_access(&self) -> bool {
        self.0.has_microphone_access()
    }

    /// Returns the tracked camera permission state
    /// (`granted`/`denied`/`prompt`).
    #[wasm_bindgen(getter = cameraPermission)]
    #[must_use]
    pub fn camera_permission(&self) -> String {
        self.0.camera_permission().to_string()
    }

    /// Returns the tracked microphone permission state
    /// (`granted`/`denied`/`prompt`).
    #[wasm_bindgen(getter = microphonePermission)]
    #[must_use]
    pub fn microphone_permission(&self) -> String {
        self.0.microphone_permission().to_string()
    }

    /// Returns the whole device catalog.
    #[must_use]
    pub fn get_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.devices())
    }

    /// Returns all input devices of the catalog.
    #[must_use]
    pub fn get_input_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.input_devices())
    }

    /// Returns all output devices of the catalog.
    #[must_use]
    pub fn get_output_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.output_devices())
    }

    /// Returns all video input devices of the catalog.
    #[must_use]
    pub fn get_camera_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.camera_devices())
    }

    /// Returns all audio input devices of the catalog.
    #[must_use]
    pub fn get_audio_input_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.audio_input_devices())
    }

    /// Returns all audio output devices of the catalog.
    #[must_use]
    pub fn get_audio_output_devices(&self) -> js_sys::Array {
        to_js_devices(self.0.audio_output_devices())
    }

    /// Resolves into the default camera device, or `undefined` when camera
    /// access cannot be obtained or no camera is attached.
    #[must_use]
    pub fn get_default_camera_device(&self) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            Ok(this.default_camera_device().await.map_or(
                JsValue::UNDEFINED,
                |info| JsValue::from(MediaDeviceInfo::from(info)),
            ))
        })
    }

    /// Resolves into the default microphone device, or `undefined` when
    /// microphone access cannot be obtained or no microphone is attached.
    #[must_use]
    pub fn get_default_microphone_device(&self) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            Ok(this.default_microphone_device().await.map_or(
                JsValue::UNDEFINED,
                |info| JsValue::from(MediaDeviceInfo::from(info)),
            ))
        })
    }

    /// Requests a live camera stream, optionally pinned to the device with
    /// the provided identifier.
    ///
    /// Resolves into an array of [`LocalMediaTrack`]s.
    #[must_use]
    pub fn request_camera_stream(
        &self,
        device_id: Option<String>,
    ) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            let mut video = VideoTrackConstraints::new();
            if let Some(device_id) = device_id {
                video.device_id(device_id);
            }
            let mut caps = MediaStreamConstraints::new();
            caps.video(video);

            this.request_camera_stream_with_constraints(caps)
                .await
                .map(to_js_tracks)
                .map_err(ArgusError::from)
                .map_err(JsValue::from)
        })
    }

    /// Requests a live microphone stream, optionally pinned to the device
    /// with the provided identifier.
    ///
    /// Resolves into an array of [`LocalMediaTrack`]s.
    #[must_use]
    pub fn request_microphone_stream(
        &self,
        device_id: Option<String>,
    ) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            let mut audio = AudioTrackConstraints::new();
            if let Some(device_id) = device_id {
                audio.device_id(device_id);
            }
            let mut caps = MediaStreamConstraints::new();
            caps.audio(audio);

            this.request_microphone_stream_with_constraints(caps)
                .await
                .map(to_js_tracks)
                .map_err(ArgusError::from)
                .map_err(JsValue::from)
        })
    }

    /// Requests a display (screen/window) capture stream, with optional
    /// audio.
    ///
    /// Resolves into an array of [`LocalMediaTrack`]s.
    #[must_use]
    pub fn request_display_stream(&self, audio: Option<bool>) -> Promise {
        let this = self.0.clone();
        future_to_promise(async move {
            this.request_display_stream(audio.unwrap_or_default())
                .await
                .map(to_js_tracks)
                .map_err(ArgusError::from)
                .map_err(JsValue::from)
        })
    }

    /// Stops and drops every track acquired via camera capture requests.
    pub fn stop_camera_streams(&self) {
        self.0.stop_camera_streams();
    }

    /// Stops and drops every track acquired via microphone capture
    /// requests.
    pub fn stop_microphone_streams(&self) {
        self.0.stop_microphone_streams();
    }

    /// Stops and drops every track acquired via display capture requests.
    pub fn stop_display_streams(&self) {
        self.0.stop_display_streams();
    }
}

impl Default for MediaManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds the provided devices into a JS array of [`MediaDeviceInfo`]s.
fn to_js_devices(devices: Vec<media::MediaDeviceInfo>) -> js_sys::Array {
    devices.into_iter().fold(js_sys::Array::new(), |array, info| {
        array.push(&JsValue::from(MediaDeviceInfo::from(info)));
        array
    })
}

/// Folds the provided tracks into a JS array of [`LocalMediaTrack`]s.
fn to_js_tracks(
    tracks: Vec<Rc<dyn platform::MediaStreamTrack>>,
) -> JsValue {
    tracks
        .into_iter()
        .fold(js_sys::Array::new(), |array, track| {
            array.push(&JsValue::from(LocalMediaTrack::from(track)));
            array
        })
        .into()
}
