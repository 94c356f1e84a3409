//! Wrapper around a [MediaStreamTrack][1] received from a
//! [getUserMedia()][2]/[getDisplayMedia()][3] request.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack
//! [2]: https://w3.org/TR/mediacapture-streams/#dom-mediadevices-getusermedia
//! [3]: https://w3.org/TR/screen-capture/#dom-mediadevices-getdisplaymedia

use web_sys::MediaStreamTrack as SysMediaStreamTrack;

use crate::{media::MediaKind, platform};

/// Wrapper around a [`SysMediaStreamTrack`].
#[derive(Clone, Debug)]
pub struct WebMediaStreamTrack {
    /// Actual underlying [`SysMediaStreamTrack`].
    sys_track: SysMediaStreamTrack,

    /// Cached kind of the underlying [`SysMediaStreamTrack`].
    kind: MediaKind,
}

impl From<SysMediaStreamTrack> for WebMediaStreamTrack {
    fn from(sys_track: SysMediaStreamTrack) -> Self {
        let kind = match sys_track.kind().as_ref() {
            "audio" => MediaKind::Audio,
            "video" => MediaKind::Video,
            _ => unreachable!(),
        };
        Self { sys_track, kind }
    }
}

impl platform::MediaStreamTrack for WebMediaStreamTrack {
    fn id(&self) -> String {
        self.sys_track.id()
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn stop(&self) {
        self.sys_track.stop();
    }

    fn sys_track(&self) -> SysMediaStreamTrack {
        self.sys_track.clone()
    }
}
