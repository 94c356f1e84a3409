//! Browser media devices, permissions and identity management.
//!
//! This crate wraps the browser's [Media Capture and Streams][1] and
//! [Permissions][2] APIs behind a small promise-based surface: requesting
//! camera/microphone/display access, tracking the best-known permission
//! state for each capability, and keeping an up-to-date catalog of
//! enumerable input/output devices.
//!
//! The [`media::MediaManager`] is the heart of the crate. It owns the
//! permission pair and the device catalog, and reconciles them from two
//! independent signals: explicit [Permissions API][2] queries and indirect
//! inference from device enumeration (labeled devices are only visible once
//! access has been granted). The [`browser::BrowserIdentity`] resolver
//! classifies the runtime once at startup, which the manager consults to
//! work around known platform quirks.
//!
//! All host interaction goes through the [`platform::MediaDevices`]
//! contract, implemented over [`web-sys`] for the `wasm32-unknown-unknown`
//! target and mockable everywhere else.
//!
//! [1]: https://w3.org/TR/mediacapture-streams
//! [2]: https://w3.org/TR/permissions
//! [`web-sys`]: https://docs.rs/web-sys

pub mod api;
pub mod browser;
pub mod media;
pub mod platform;

#[doc(inline)]
pub use crate::{
    browser::BrowserIdentity,
    media::{
        MediaDeviceInfo, MediaDeviceKind, MediaManager, MediaPermissionKind,
        PermissionState,
    },
};
