//! Platform-specific functionality.
//!
//! The core of this crate talks to the host browser exclusively through
//! the [`MediaDevices`] contract below, so everything above this module is
//! target-neutral and testable without a browser. The `wasm32` backend
//! implementing the contract over `web-sys` lives in [`wasm`].

mod error;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tracerr::Traced;

use crate::media::{
    DisplayMediaStreamConstraints, MediaDeviceInfo, MediaKind,
    MediaPermissionKind, MediaStreamConstraints, PermissionState,
};

#[doc(inline)]
pub use self::error::Error;

#[cfg(target_arch = "wasm32")]
#[doc(inline)]
pub use self::wasm::{
    init_logger, set_panic_hook, spawn, window, WebMediaDevices,
    WebMediaStreamTrack,
};

/// Media devices and permissions facilities of the host platform.
///
/// All methods are asynchronous host calls: they may be arbitrarily slow,
/// may fail, and individual facilities may be absent altogether (see
/// [`MediaDevices::supports_permission_queries`]).
#[cfg_attr(feature = "mockable", mockall::automock)]
pub trait MediaDevices {
    /// Indicates whether the host exposes an explicit permission-query
    /// facility at all.
    ///
    /// When `false`, [`MediaDevices::query_permission`] must not be called;
    /// permission state can only be inferred indirectly.
    fn supports_permission_queries(&self) -> bool;

    /// Queries the current permission state of the provided capability.
    ///
    /// Resolves into an [`Error`] when the host rejects the capability
    /// name, a known quirk on some platforms.
    fn query_permission(
        &self,
        kind: MediaPermissionKind,
    ) -> LocalBoxFuture<'static, Result<PermissionState, Traced<Error>>>;

    /// Collects information about the available media input and output
    /// devices.
    ///
    /// On compliant hosts, devices are returned unlabeled (or not at all)
    /// until the corresponding capability has been granted.
    fn enumerate_devices(
        &self,
    ) -> LocalBoxFuture<'static, Result<Vec<MediaDeviceInfo>, Traced<Error>>>;

    /// Prompts the user for permission to use media inputs, producing the
    /// requested types of [`MediaStreamTrack`]s.
    fn get_user_media(
        &self,
        caps: MediaStreamConstraints,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<Error>>,
    >;

    /// Prompts the user to select and grant permission to capture the
    /// contents of a display or portion thereof.
    fn get_display_media(
        &self,
        caps: DisplayMediaStreamConstraints,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<Error>>,
    >;
}

/// Live media track handed out by a [`MediaDevices`] capture call.
pub trait MediaStreamTrack {
    /// Returns unique identifier of this track.
    fn id(&self) -> String;

    /// Returns this track's kind (audio/video).
    fn kind(&self) -> MediaKind;

    /// Stops this track, releasing the underlying device.
    ///
    /// Idempotent: stopping an already stopped track is a no-op.
    fn stop(&self);

    /// Returns the underlying [`web_sys::MediaStreamTrack`].
    #[cfg(target_arch = "wasm32")]
    fn sys_track(&self) -> web_sys::MediaStreamTrack;
}
