//! Conversion of portable constraints into [`web-sys`] ones.
//!
//! [`web-sys`]: https://docs.rs/web-sys

use wasm_bindgen::JsValue;
use web_sys::{
    DisplayMediaStreamConstraints as SysDisplayMediaStreamConstraints,
    MediaStreamConstraints as SysMediaStreamConstraints,
    MediaTrackConstraints as SysMediaTrackConstraints,
};

use crate::media::{
    AudioTrackConstraints, DisplayMediaStreamConstraints,
    MediaStreamConstraints, VideoTrackConstraints,
};

impl From<MediaStreamConstraints> for SysMediaStreamConstraints {
    fn from(caps: MediaStreamConstraints) -> Self {
        let mut constraints = Self::new();

        match caps.get_video() {
            Some(video) => {
                constraints.video(&JsValue::from(track_constraints(
                    video.get_device_id(),
                    video.get_width(),
                    video.get_height(),
                )));
            }
            None => {
                constraints.video(&JsValue::FALSE);
            }
        }
        match caps.get_audio() {
            Some(audio) => {
                constraints.audio(&JsValue::from(track_constraints(
                    audio.get_device_id(),
                    None,
                    None,
                )));
            }
            None => {
                constraints.audio(&JsValue::FALSE);
            }
        }

        constraints
    }
}

impl From<&AudioTrackConstraints> for SysMediaTrackConstraints {
    fn from(caps: &AudioTrackConstraints) -> Self {
        track_constraints(caps.get_device_id(), None, None)
    }
}

impl From<&VideoTrackConstraints> for SysMediaTrackConstraints {
    fn from(caps: &VideoTrackConstraints) -> Self {
        track_constraints(
            caps.get_device_id(),
            caps.get_width(),
            caps.get_height(),
        )
    }
}

impl From<DisplayMediaStreamConstraints> for SysDisplayMediaStreamConstraints {
    fn from(caps: DisplayMediaStreamConstraints) -> Self {
        let mut constraints = Self::new();

        let video = js_sys::Object::new();
        // Infallible: fresh plain object.
        drop(js_sys::Reflect::set(
            &video,
            &JsValue::from_str("cursor"),
            &JsValue::from_str("always"),
        ));
        constraints.video(&JsValue::from(video));
        constraints.audio(&JsValue::from_bool(caps.is_audio_requested()));

        constraints
    }
}

/// Builds [`SysMediaTrackConstraints`] out of the provided knobs.
fn track_constraints(
    device_id: Option<&str>,
    width: Option<u32>,
    height: Option<u32>,
) -> SysMediaTrackConstraints {
    let mut constraints = SysMediaTrackConstraints::new();
    if let Some(device_id) = device_id {
        constraints.device_id(&JsValue::from_str(device_id));
    }
    if let Some(width) = width {
        constraints.width(&JsValue::from(width));
    }
    if let Some(height) = height {
        constraints.height(&JsValue::from(height));
    }
    constraints
}
