//! [MediaDeviceInfo][1] related objects.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#device-info

use derive_more::Display;

/// [MediaDeviceKind][1] representation.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediadevicekind
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MediaDeviceKind {
    /// Audio input device (for example, a microphone).
    #[display(fmt = "audioinput")]
    AudioInput,

    /// Video input device (for example, a webcam).
    #[display(fmt = "videoinput")]
    VideoInput,

    /// Audio output device (for example, a pair of headphones).
    #[display(fmt = "audiooutput")]
    AudioOutput,
}

impl MediaDeviceKind {
    /// Indicates whether devices of this kind produce media.
    #[inline]
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::AudioInput | Self::VideoInput)
    }

    /// Indicates whether devices of this kind consume media.
    #[inline]
    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(self, Self::AudioOutput)
    }
}

/// Representation of one enumerable input/output endpoint known to the host
/// platform.
///
/// Device identifiers are only stable within a single permission-granted
/// session; the host platform does not guarantee them durable across
/// restarts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaDeviceInfo {
    device_id: String,
    kind: MediaDeviceKind,
    label: String,
    group_id: Option<String>,
}

impl MediaDeviceInfo {
    /// Builds a new [`MediaDeviceInfo`] out of the provided fields.
    #[must_use]
    pub fn new(
        device_id: String,
        kind: MediaDeviceKind,
        label: String,
        group_id: Option<String>,
    ) -> Self {
        Self {
            device_id,
            kind,
            label,
            group_id,
        }
    }

    /// Returns unique identifier of the represented device.
    #[inline]
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns kind of the represented device.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MediaDeviceKind {
        self.kind
    }

    /// Returns label describing the represented device (for example
    /// "External USB Webcam").
    ///
    /// Empty until the corresponding capability has been granted.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns group identifier of the represented device, if any.
    ///
    /// Two devices have the same group identifier if they belong to the
    /// same physical device. For example, the audio input and output
    /// devices representing the speaker and microphone of the same headset
    /// have the same [groupId][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediadeviceinfo-groupid
    #[inline]
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }
}
