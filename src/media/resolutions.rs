//! Well-known camera capture resolutions.

use derive_more::Display;

use super::VideoTrackConstraints;

/// Coarse quality band of a [`CameraResolution`].
#[derive(Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd)]
pub enum VideoQuality {
    /// Sub-VGA resolutions.
    #[display(fmt = "low")]
    Low,

    /// VGA up to 720p.
    #[display(fmt = "medium")]
    Medium,

    /// Full HD and above.
    #[display(fmt = "high")]
    High,
}

/// One well-known camera resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CameraResolution {
    /// Frame width, in pixels.
    pub width: u32,

    /// Frame height, in pixels.
    pub height: u32,

    /// Conventional name of the resolution.
    pub name: &'static str,

    /// Aspect ratio of the frame.
    pub ratio: &'static str,

    /// Quality band this resolution belongs to.
    pub quality: VideoQuality,
}

impl CameraResolution {
    /// Returns [`VideoTrackConstraints`] requesting this resolution as the
    /// ideal frame size.
    #[must_use]
    pub fn to_constraints(&self) -> VideoTrackConstraints {
        let mut constraints = VideoTrackConstraints::new();
        constraints.width(self.width);
        constraints.height(self.height);
        constraints
    }
}

/// Camera resolution table, ordered from smallest to largest frame.
pub static CAMERA_RESOLUTIONS: &[CameraResolution] = &[
    CameraResolution {
        width: 160,
        height: 120,
        name: "QQVGA",
        ratio: "4:3",
        quality: VideoQuality::Low,
    },
    CameraResolution {
        width: 176,
        height: 144,
        name: "QCIF",
        ratio: "4:3",
        quality: VideoQuality::Low,
    },
    CameraResolution {
        width: 320,
        height: 240,
        name: "QVGA",
        ratio: "4:3",
        quality: VideoQuality::Low,
    },
    CameraResolution {
        width: 352,
        height: 288,
        name: "CIF",
        ratio: "4:3",
        quality: VideoQuality::Low,
    },
    CameraResolution {
        width: 640,
        height: 360,
        name: "360p(nHD)",
        ratio: "16:9",
        quality: VideoQuality::Medium,
    },
    CameraResolution {
        width: 640,
        height: 480,
        name: "VGA",
        ratio: "4:3",
        quality: VideoQuality::Medium,
    },
    CameraResolution {
        width: 800,
        height: 600,
        name: "SVGA",
        ratio: "4:3",
        quality: VideoQuality::Medium,
    },
    CameraResolution {
        width: 1280,
        height: 720,
        name: "720p(HD)",
        ratio: "16:9",
        quality: VideoQuality::Medium,
    },
    CameraResolution {
        width: 1600,
        height: 1200,
        name: "UXGA",
        ratio: "4:3",
        quality: VideoQuality::High,
    },
    CameraResolution {
        width: 1920,
        height: 1080,
        name: "1080p(FHD)",
        ratio: "16:9",
        quality: VideoQuality::High,
    },
    CameraResolution {
        width: 3840,
        height: 2160,
        name: "4K(UHD)",
        ratio: "16:9",
        quality: VideoQuality::High,
    },
];

/// Looks a [`CameraResolution`] up by its conventional name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static CameraResolution> {
    CAMERA_RESOLUTIONS.iter().find(|res| res.name == name)
}

/// Returns all [`CameraResolution`]s of the provided quality band, smallest
/// first.
pub fn with_quality(
    quality: VideoQuality,
) -> impl Iterator<Item = &'static CameraResolution> {
    CAMERA_RESOLUTIONS
        .iter()
        .filter(move |res| res.quality == quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let vga = by_name("VGA").unwrap();

        assert_eq!(vga.width, 640);
        assert_eq!(vga.height, 480);
        assert_eq!(vga.quality, VideoQuality::Medium);

        assert!(by_name("8K").is_none());
    }

    #[test]
    fn quality_bands_cover_whole_table() {
        let by_bands = with_quality(VideoQuality::Low).count()
            + with_quality(VideoQuality::Medium).count()
            + with_quality(VideoQuality::High).count();

        assert_eq!(by_bands, CAMERA_RESOLUTIONS.len());
    }

    #[test]
    fn resolution_converts_into_constraints() {
        let constraints = by_name("720p(HD)").unwrap().to_constraints();

        assert_eq!(constraints.get_width(), Some(1280));
        assert_eq!(constraints.get_height(), Some(720));
        assert_eq!(constraints.get_device_id(), None);
    }
}
