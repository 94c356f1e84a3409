//! Adapters to [Media Capture and Streams API][1].
//!
//! [1]: https://w3.org/TR/mediacapture-streams

mod constraints;
mod device_info;
mod manager;
pub mod resolutions;

use derive_more::Display;

#[doc(inline)]
pub use self::{
    constraints::{
        AudioTrackConstraints, DisplayMediaStreamConstraints,
        MediaStreamConstraints, VideoTrackConstraints,
    },
    device_info::{MediaDeviceInfo, MediaDeviceKind},
    manager::{
        GetDisplayMediaError, GetUserMediaError, MediaManager,
        PermissionsUnavailableError,
    },
    resolutions::{CameraResolution, VideoQuality, CAMERA_RESOLUTIONS},
};

/// [MediaStreamTrack.kind][1] representation.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediastreamtrack-kind
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MediaKind {
    /// Audio track.
    #[display(fmt = "audio")]
    Audio,

    /// Video track.
    #[display(fmt = "video")]
    Video,
}

/// Capability whose permission state is tracked by a [`MediaManager`].
///
/// Closed set: display capture is deliberately absent, being an independent
/// permission domain the browser prompts for on every request.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum MediaPermissionKind {
    /// Camera access.
    #[display(fmt = "camera")]
    Camera,

    /// Microphone access.
    #[display(fmt = "microphone")]
    Microphone,
}

/// Best-known belief about whether a capability is usable without further
/// user interaction.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum PermissionState {
    /// Host will allow access without prompting.
    #[display(fmt = "granted")]
    Granted,

    /// Host will refuse access.
    #[display(fmt = "denied")]
    Denied,

    /// Host must ask the user (or the state is simply unknown).
    #[display(fmt = "prompt")]
    Prompt,
}
