//! [MediaDevices][1] and [Permissions][2] functionality.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediadevices
//! [2]: https://w3.org/TR/permissions

use std::rc::Rc;

use futures::{future::LocalBoxFuture, FutureExt as _};
use tracerr::Traced;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    MediaStreamConstraints as SysMediaStreamConstraints,
    PermissionState as SysPermissionState,
};

use crate::{
    media::{
        DisplayMediaStreamConstraints, MediaDeviceInfo, MediaDeviceKind,
        MediaPermissionKind, MediaStreamConstraints, PermissionState,
    },
    platform::{Error, MediaDevices, MediaStreamTrack},
};

use super::{window, WebMediaStreamTrack};

/// [`MediaDevices`] implementation backed by the browser's `navigator`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMediaDevices;

impl WebMediaDevices {
    /// Instantiates a new [`WebMediaDevices`] backend.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MediaDevices for WebMediaDevices {
    fn supports_permission_queries(&self) -> bool {
        js_sys::Reflect::get(
            window().navigator().as_ref(),
            &JsValue::from_str("permissions"),
        )
        .map_or(false, |permissions| {
            !permissions.is_undefined() && !permissions.is_null()
        })
    }

    fn query_permission(
        &self,
        kind: MediaPermissionKind,
    ) -> LocalBoxFuture<'static, Result<PermissionState, Traced<Error>>>
    {
        async move {
            let permissions = window()
                .navigator()
                .permissions()
                .map_err(Error::from)
                .map_err(tracerr::wrap!())?;

            // No typed descriptor in `web-sys`, so build a plain
            // `{ name: "<capability>" }` object.
            let descriptor = js_sys::Object::new();
            js_sys::Reflect::set(
                &descriptor,
                &JsValue::from_str("name"),
                &JsValue::from_str(&kind.to_string()),
            )
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

            let status = JsFuture::from(
                permissions
                    .query(&descriptor)
                    .map_err(Error::from)
                    .map_err(tracerr::wrap!())?,
            )
            .await
            .map(web_sys::PermissionStatus::from)
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

            Ok(match status.state() {
                SysPermissionState::Granted => PermissionState::Granted,
                SysPermissionState::Denied => PermissionState::Denied,
                _ => PermissionState::Prompt,
            })
        }
        .boxed_local()
    }

    fn enumerate_devices(
        &self,
    ) -> LocalBoxFuture<'static, Result<Vec<MediaDeviceInfo>, Traced<Error>>>
    {
        async {
            let media_devices = window()
                .navigator()
                .media_devices()
                .map_err(Error::from)
                .map_err(tracerr::wrap!())?;

            let devices = JsFuture::from(
                media_devices
                    .enumerate_devices()
                    .map_err(Error::from)
                    .map_err(tracerr::wrap!())?,
            )
            .await
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

            Ok(js_sys::Array::from(&devices)
                .values()
                .into_iter()
                .filter_map(|info| {
                    let info = web_sys::MediaDeviceInfo::from(info.unwrap());
                    device_info(&info)
                })
                .collect())
        }
        .boxed_local()
    }

    fn get_user_media(
        &self,
        caps: MediaStreamConstraints,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<Error>>,
    > {
        async move {
            let media_devices = window()
                .navigator()
                .media_devices()
                .map_err(Error::from)
                .map_err(tracerr::wrap!())?;

            let caps = SysMediaStreamConstraints::from(caps);
            let stream = JsFuture::from(
                media_devices
                    .get_user_media_with_constraints(&caps)
                    .map_err(Error::from)
                    .map_err(tracerr::wrap!())?,
            )
            .await
            .map(web_sys::MediaStream::from)
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

            Ok(stream_tracks(&stream))
        }
        .boxed_local()
    }

    fn get_display_media(
        &self,
        caps: DisplayMediaStreamConstraints,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<Error>>,
    > {
        async move {
            let media_devices = window()
                .navigator()
                .media_devices()
                .map_err(Error::from)
                .map_err(tracerr::wrap!())?;

            let stream = JsFuture::from(
                media_devices
                    .get_display_media_with_constraints(&caps.into())
                    .map_err(Error::from)
                    .map_err(tracerr::wrap!())?,
            )
            .await
            .map(web_sys::MediaStream::from)
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

            Ok(stream_tracks(&stream))
        }
        .boxed_local()
    }
}

/// Converts a [`web_sys::MediaDeviceInfo`] into the portable
/// [`MediaDeviceInfo`].
///
/// Returns [`None`] for device kinds this crate does not track.
fn device_info(info: &web_sys::MediaDeviceInfo) -> Option<MediaDeviceInfo> {
    let kind = match info.kind() {
        web_sys::MediaDeviceKind::Audioinput => MediaDeviceKind::AudioInput,
        web_sys::MediaDeviceKind::Videoinput => MediaDeviceKind::VideoInput,
        web_sys::MediaDeviceKind::Audiooutput => MediaDeviceKind::AudioOutput,
        _ => return None,
    };
    let group_id = Some(info.group_id()).filter(|id| !id.is_empty());

    Some(MediaDeviceInfo::new(
        info.device_id(),
        kind,
        info.label(),
        group_id,
    ))
}

/// Collects all tracks of the provided [`web_sys::MediaStream`].
///
/// # Panics
///
/// If the stream's track list contains something that is not a
/// [`web_sys::MediaStreamTrack`].
fn stream_tracks(
    stream: &web_sys::MediaStream,
) -> Vec<Rc<dyn MediaStreamTrack>> {
    js_sys::try_iter(&stream.get_tracks())
        .unwrap()
        .unwrap()
        .map(|track| {
            let track = WebMediaStreamTrack::from(
                web_sys::MediaStreamTrack::from(track.unwrap()),
            );
            Rc::new(track) as Rc<dyn MediaStreamTrack>
        })
        .collect()
}
