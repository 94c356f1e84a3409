//! Tracking of media capabilities permissions and enumerable devices.
//!
//! The [`MediaManager`] owns the crate's mutable state: the best-known
//! [`PermissionState`] of the camera and microphone capabilities, the last
//! successfully retrieved device catalog, and the registries of live tracks
//! acquired through it.
//!
//! Permission state is reconciled from two independent, possibly-absent
//! signals: explicit [Permissions API][1] queries and indirect inference
//! from device enumeration — labeled devices are only visible once the
//! corresponding capability has been granted, so their presence proves a
//! grant even when the query facility is missing or rejects.
//!
//! [1]: https://w3.org/TR/permissions

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_more::{Display, From};
use futures::{
    channel::oneshot,
    future::{self, LocalBoxFuture, Shared},
    FutureExt as _,
};
use tracerr::Traced;

use crate::{
    browser::BrowserIdentity,
    media::{
        AudioTrackConstraints, DisplayMediaStreamConstraints,
        MediaDeviceInfo, MediaDeviceKind, MediaPermissionKind,
        MediaStreamConstraints, PermissionState, VideoTrackConstraints,
    },
    platform::{self, MediaDevices, MediaStreamTrack},
};

/// Error of the host not exposing an explicit permission-query facility.
///
/// Recoverable: callers proceed to indirect inference via device
/// enumeration and capture probes.
#[derive(Clone, Copy, Debug, Display)]
#[display(fmt = "Permissions API is not available on this platform")]
pub struct PermissionsUnavailableError;

/// Error of a [getUserMedia()][1] request failing.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediadevices-getusermedia
#[derive(Clone, Debug, Display, From)]
#[display(fmt = "MediaDevices.getUserMedia() failed: {}", _0)]
pub struct GetUserMediaError(platform::Error);

impl GetUserMediaError {
    /// Returns the [`platform::Error`] that caused this error.
    #[inline]
    #[must_use]
    pub fn cause(&self) -> &platform::Error {
        &self.0
    }
}

/// Error of a [getDisplayMedia()][1] request failing.
///
/// [1]: https://w3.org/TR/screen-capture/#dom-mediadevices-getdisplaymedia
#[derive(Clone, Debug, Display, From)]
#[display(fmt = "MediaDevices.getDisplayMedia() failed: {}", _0)]
pub struct GetDisplayMediaError(platform::Error);

impl GetDisplayMediaError {
    /// Returns the [`platform::Error`] that caused this error.
    #[inline]
    #[must_use]
    pub fn cause(&self) -> &platform::Error {
        &self.0
    }
}

/// Permission pair tracked by a [`MediaManager`].
///
/// Both capabilities start out [`PermissionState::Denied`]: a conservative
/// default held until some probe proves otherwise, not an assertion that
/// access has actually been refused.
#[derive(Clone, Copy, Debug)]
struct MediaPermissions {
    camera: PermissionState,
    microphone: PermissionState,
}

impl Default for MediaPermissions {
    fn default() -> Self {
        Self {
            camera: PermissionState::Denied,
            microphone: PermissionState::Denied,
        }
    }
}

impl MediaPermissions {
    /// Returns a mutable reference to the state of the provided capability.
    fn get_mut(&mut self, kind: MediaPermissionKind) -> &mut PermissionState {
        match kind {
            MediaPermissionKind::Camera => &mut self.camera,
            MediaPermissionKind::Microphone => &mut self.microphone,
        }
    }
}

/// Future shared between every caller of one in-flight operation.
type SharedDone = Shared<LocalBoxFuture<'static, ()>>;

/// In-flight [`MediaManager::request_permissions`] call.
struct InFlightRequest {
    video: bool,
    audio: bool,

    /// Generation of this request, so a finished call only clears its own
    /// slot and not a successor's.
    epoch: u64,

    done: SharedDone,
}

/// Actual data of a [`MediaManager`].
struct InnerMediaManager {
    /// Host platform facilities all media operations go through.
    media_devices: Rc<dyn MediaDevices>,

    /// Runtime classification, resolved once at construction.
    browser: BrowserIdentity,

    /// Best-known permission state of both capabilities.
    permissions: RefCell<MediaPermissions>,

    /// Last successfully retrieved device catalog, in platform enumeration
    /// order.
    devices: RefCell<Vec<MediaDeviceInfo>>,

    /// Live tracks acquired via camera capture requests.
    camera_tracks: RefCell<Vec<Rc<dyn MediaStreamTrack>>>,

    /// Live tracks acquired via microphone capture requests.
    microphone_tracks: RefCell<Vec<Rc<dyn MediaStreamTrack>>>,

    /// Live tracks acquired via display capture requests.
    display_tracks: RefCell<Vec<Rc<dyn MediaStreamTrack>>>,

    /// Sender resolving the [`InnerMediaManager::ready`] future once
    /// bootstrap has finished.
    ready_tx: RefCell<Option<oneshot::Sender<()>>>,

    /// One-shot readiness signal, completing for late subscribers too.
    ready: SharedDone,

    /// Currently in-flight permissions request, if any.
    request_in_flight: RefCell<Option<InFlightRequest>>,

    /// Generation counter for [`InFlightRequest`]s.
    request_epoch: Cell<u64>,
}

impl InnerMediaManager {
    fn new(
        media_devices: Rc<dyn MediaDevices>,
        browser: BrowserIdentity,
    ) -> Self {
        let (ready_tx, ready_rx) = oneshot::channel();
        Self {
            media_devices,
            browser,
            permissions: RefCell::default(),
            devices: RefCell::default(),
            camera_tracks: RefCell::default(),
            microphone_tracks: RefCell::default(),
            display_tracks: RefCell::default(),
            ready_tx: RefCell::new(Some(ready_tx)),
            ready: ready_rx.map(|_| ()).boxed_local().shared(),
            request_in_flight: RefCell::new(None),
            request_epoch: Cell::new(0),
        }
    }

    /// Indicates whether camera access is currently believed granted.
    fn has_camera_access(&self) -> bool {
        self.permissions.borrow().camera == PermissionState::Granted
    }

    /// Indicates whether microphone access is currently believed granted.
    fn has_microphone_access(&self) -> bool {
        self.permissions.borrow().microphone == PermissionState::Granted
    }

    /// Runs the initial probe sequence and resolves the readiness signal.
    ///
    /// A missing query facility is not fatal here: the catalog refresh
    /// still recovers whatever a previously granted session exposes.
    async fn bootstrap(&self) {
        if let Err(e) = self.probe_permissions().await {
            log::debug!("Explicit permission probe skipped: {}", e);
            self.refresh_devices().await;
        }
        if let Some(tx) = self.ready_tx.borrow_mut().take() {
            let _ = tx.send(());
        }
    }

    /// Queries the host for the current state of both capabilities.
    ///
    /// Each capability is queried independently and both queries complete
    /// before this method returns. A successful query is adopted verbatim;
    /// a failing one degrades the capability to [`PermissionState::Prompt`]
    /// unless it is already known [`PermissionState::Granted`] — a failing
    /// re-query never downgrades a proven grant.
    async fn probe_permissions(
        &self,
    ) -> Result<(), Traced<PermissionsUnavailableError>> {
        if !self.media_devices.supports_permission_queries() {
            return Err(tracerr::new!(PermissionsUnavailableError));
        }

        let (camera, microphone) = future::join(
            self.media_devices
                .query_permission(MediaPermissionKind::Camera),
            self.media_devices
                .query_permission(MediaPermissionKind::Microphone),
        )
        .await;

        {
            let mut permissions = self.permissions.borrow_mut();
            Self::reconcile(
                permissions.get_mut(MediaPermissionKind::Camera),
                MediaPermissionKind::Camera,
                camera,
            );
            Self::reconcile(
                permissions.get_mut(MediaPermissionKind::Microphone),
                MediaPermissionKind::Microphone,
                microphone,
            );
        }

        // A granted belief should be corroborated by visible devices.
        if self.has_camera_access() || self.has_microphone_access() {
            self.refresh_devices().await;
        }

        Ok(())
    }

    /// Folds one explicit query result into the tracked state.
    ///
    /// A successful query is adopted verbatim. A failing one (unsupported
    /// capability name, or any other query error) degrades the state to
    /// [`PermissionState::Prompt`] unless it is already
    /// [`PermissionState::Granted`].
    fn reconcile(
        state: &mut PermissionState,
        kind: MediaPermissionKind,
        queried: Result<PermissionState, Traced<platform::Error>>,
    ) {
        match queried {
            Ok(reported) => *state = reported,
            Err(e) => {
                log::debug!("{} permission query failed: {}", kind, e);
                if *state != PermissionState::Granted {
                    *state = PermissionState::Prompt;
                }
            }
        }
    }

    /// Issues a live capture request to elicit the permission prompt for
    /// the requested capabilities.
    async fn do_request_permissions(&self, video: bool, audio: bool) {
        // Firefox rejects queries for the camera/microphone permission
        // names, so the state cannot be confirmed either way.
        if self.browser.is_firefox() {
            let mut permissions = self.permissions.borrow_mut();
            permissions.camera = PermissionState::Prompt;
            permissions.microphone = PermissionState::Prompt;
            return;
        }

        let mut caps = MediaStreamConstraints::new();
        if video {
            caps.video(VideoTrackConstraints::new());
        }
        if audio {
            caps.audio(AudioTrackConstraints::new());
        }

        let loadable = match self.media_devices.get_user_media(caps).await {
            Ok(tracks) => {
                // The stream only served to confirm the grant.
                for track in &tracks {
                    track.stop();
                }
                let mut permissions = self.permissions.borrow_mut();
                if video {
                    permissions.camera = PermissionState::Granted;
                }
                if audio {
                    permissions.microphone = PermissionState::Granted;
                }
                true
            }
            Err(e) => {
                log::debug!("Capture probe failed: {}", e);
                false
            }
        };

        if self.probe_permissions().await.is_err() && loadable {
            // Capture works but the query facility is missing (Safari):
            // the successful request is the proof of the grant.
            let mut permissions = self.permissions.borrow_mut();
            if video {
                permissions.camera = PermissionState::Granted;
            }
            if audio {
                permissions.microphone = PermissionState::Granted;
            }
        }

        self.refresh_devices().await;
    }

    /// Refreshes the device catalog from the host's enumeration facility.
    ///
    /// Best-effort: an enumeration failure leaves the current catalog
    /// untouched, and an enumeration yielding no usable records (no stable
    /// identifier, or unlabeled for lack of consent) never overwrites a
    /// non-empty catalog.
    async fn refresh_devices(&self) {
        let enumerated = match self.media_devices.enumerate_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                log::error!("Failed to enumerate devices: {}", e);
                return;
            }
        };

        let usable: Vec<_> = enumerated
            .into_iter()
            .filter(|d| !d.device_id().is_empty() && !d.label().is_empty())
            .collect();
        if !usable.is_empty() {
            *self.devices.borrow_mut() = usable;
        }

        // Labeled devices are only visible once access has been granted,
        // so their presence upgrades a non-granted capability.
        let devices = self.devices.borrow();
        let mut permissions = self.permissions.borrow_mut();
        if permissions.camera != PermissionState::Granted
            && devices
                .iter()
                .any(|d| d.kind() == MediaDeviceKind::VideoInput)
        {
            permissions.camera = PermissionState::Granted;
        }
        if permissions.microphone != PermissionState::Granted
            && devices
                .iter()
                .any(|d| d.kind() == MediaDeviceKind::AudioInput)
        {
            permissions.microphone = PermissionState::Granted;
        }
    }

    /// Returns devices of the current catalog satisfying the provided
    /// predicate.
    fn devices_filtered(
        &self,
        pred: impl Fn(&MediaDeviceInfo) -> bool,
    ) -> Vec<MediaDeviceInfo> {
        self.devices
            .borrow()
            .iter()
            .filter(|d| pred(d))
            .cloned()
            .collect()
    }

    /// Requests a live capture, registering the acquired tracks in the
    /// provided registry and marking the provided capability granted.
    async fn request_stream(
        &self,
        caps: MediaStreamConstraints,
        registry: &RefCell<Vec<Rc<dyn MediaStreamTrack>>>,
        granted: MediaPermissionKind,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetUserMediaError>> {
        let had_access = match granted {
            MediaPermissionKind::Camera => self.has_camera_access(),
            MediaPermissionKind::Microphone => self.has_microphone_access(),
        };

        let tracks = self
            .media_devices
            .get_user_media(caps)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> GetUserMediaError))?;

        registry.borrow_mut().extend(tracks.iter().cloned());
        *self.permissions.borrow_mut().get_mut(granted) =
            PermissionState::Granted;

        // First grant makes labels visible, so the catalog is stale.
        if !had_access {
            self.refresh_devices().await;
        }

        Ok(tracks)
    }

    /// Stops and drops every track of the provided registry.
    fn stop_tracks(&self, registry: &RefCell<Vec<Rc<dyn MediaStreamTrack>>>) {
        for track in registry.borrow_mut().drain(..) {
            track.stop();
        }
    }
}

/// Manager of media capabilities permissions, the device catalog, and the
/// tracks acquired through them.
///
/// Construct one per application from the composition root and pass it by
/// reference: it holds no external resources beyond the live tracks it is
/// told to acquire, so no explicit teardown is needed.
#[derive(Clone)]
pub struct MediaManager(Rc<InnerMediaManager>);

impl MediaManager {
    /// Instantiates a new [`MediaManager`] over the provided platform
    /// facilities and runtime classification.
    ///
    /// Both capabilities start out [`PermissionState::Denied`] until
    /// [`MediaManager::bootstrap`] (or any probe) proves otherwise.
    #[must_use]
    pub fn new(
        media_devices: Rc<dyn MediaDevices>,
        browser: BrowserIdentity,
    ) -> Self {
        Self(Rc::new(InnerMediaManager::new(media_devices, browser)))
    }

    /// Returns the runtime classification this manager was built with.
    #[inline]
    #[must_use]
    pub fn browser(&self) -> &BrowserIdentity {
        &self.0.browser
    }

    /// Runs the initial probe-and-refresh sequence and resolves the
    /// [`MediaManager::on_ready`] signal.
    ///
    /// Intended to be spawned right after construction.
    pub async fn bootstrap(&self) {
        self.0.bootstrap().await;
    }

    /// Resolves once the initial probe-and-refresh sequence has completed.
    ///
    /// Resolves immediately when subscribed after the fact.
    #[must_use]
    pub fn on_ready(&self) -> LocalBoxFuture<'static, ()> {
        self.0.ready.clone().boxed_local()
    }

    /// Queries the host for the current state of both capabilities.
    ///
    /// # Errors
    ///
    /// With [`PermissionsUnavailableError`] if the host exposes no explicit
    /// permission-query facility at all. State is left unchanged then, and
    /// callers should fall back to [`MediaManager::request_permissions`].
    pub async fn probe_permissions(
        &self,
    ) -> Result<(), Traced<PermissionsUnavailableError>> {
        self.0.probe_permissions().await
    }

    /// Requests the provided capabilities from the user, upgrading the
    /// tracked permission state accordingly.
    ///
    /// Any acquired media is released immediately: this call's only purpose
    /// is to elicit the permission prompt and confirm the grant. Calling it
    /// when already granted is a state no-op that still refreshes the
    /// device catalog.
    ///
    /// Overlapping calls are coalesced: a concurrent call with the same
    /// flags awaits the in-flight one instead of re-prompting the user,
    /// and a call with different flags queues up behind it.
    pub async fn request_permissions(&self, video: bool, audio: bool) {
        loop {
            let pending =
                self.0.request_in_flight.borrow().as_ref().map(|in_flight| {
                    (
                        in_flight.video == video
                            && in_flight.audio == audio,
                        in_flight.epoch,
                        in_flight.done.clone(),
                    )
                });
            let (same_flags, epoch, done) = match pending {
                Some(pending) => pending,
                None => break,
            };

            if same_flags && done.peek().is_none() {
                done.await;
                return;
            }

            // Finished or differing: wait it out, then clean the slot up
            // on behalf of an issuer that has not resumed yet.
            done.await;
            let mut in_flight = self.0.request_in_flight.borrow_mut();
            if in_flight.as_ref().map_or(false, |r| r.epoch == epoch) {
                *in_flight = None;
            }
        }

        let epoch = self.0.request_epoch.get().wrapping_add(1);
        self.0.request_epoch.set(epoch);

        let this = Rc::clone(&self.0);
        let done: SharedDone = async move {
            this.do_request_permissions(video, audio).await;
        }
        .boxed_local()
        .shared();

        *self.0.request_in_flight.borrow_mut() = Some(InFlightRequest {
            video,
            audio,
            epoch,
            done: done.clone(),
        });

        done.await;

        let mut in_flight = self.0.request_in_flight.borrow_mut();
        if in_flight.as_ref().map_or(false, |r| r.epoch == epoch) {
            *in_flight = None;
        }
    }

    /// Refreshes the device catalog from the host's enumeration facility.
    ///
    /// Best-effort: failures are logged and swallowed, and a refresh
    /// yielding no usable devices never overwrites a non-empty catalog.
    pub async fn refresh_devices(&self) {
        self.0.refresh_devices().await;
    }

    /// Returns the tracked [`PermissionState`] of the camera capability.
    #[must_use]
    pub fn camera_permission(&self) -> PermissionState {
        self.0.permissions.borrow().camera
    }

    /// Returns the tracked [`PermissionState`] of the microphone
    /// capability.
    #[must_use]
    pub fn microphone_permission(&self) -> PermissionState {
        self.0.permissions.borrow().microphone
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

    /// Returns the whole device catalog, in platform enumeration order.
    #[must_use]
    pub fn devices(&self) -> Vec<MediaDeviceInfo> {
        self.0.devices.borrow().clone()
    }

    /// Returns all input devices of the catalog.
    #[must_use]
    pub fn input_devices(&self) -> Vec<MediaDeviceInfo> {
        self.0.devices_filtered(|d| d.kind().is_input())
    }

    /// Returns all output devices of the catalog.
    #[must_use]
    pub fn output_devices(&self) -> Vec<MediaDeviceInfo> {
        self.0.devices_filtered(|d| d.kind().is_output())
    }

    /// Returns all video input devices of the catalog.
    #[must_use]
    pub fn camera_devices(&self) -> Vec<MediaDeviceInfo> {
        self.0
            .devices_filtered(|d| d.kind() == MediaDeviceKind::VideoInput)
    }

    /// Returns all audio input devices of the catalog.
    #[must_use]
    pub fn audio_input_devices(&self) -> Vec<MediaDeviceInfo> {
        self.0
            .devices_filtered(|d| d.kind() == MediaDeviceKind::AudioInput)
    }

    /// Returns all audio output devices of the catalog.
    #[must_use]
    pub fn audio_output_devices(&self) -> Vec<MediaDeviceInfo> {
        self.0
            .devices_filtered(|d| d.kind() == MediaDeviceKind::AudioOutput)
    }

    /// Returns the default camera device: the first video input of the
    /// catalog.
    ///
    /// When camera access is not granted yet, one
    /// [`MediaManager::request_permissions`] round is attempted first.
    /// Returns [`None`] when access cannot be obtained or no video input
    /// device is attached.
    pub async fn default_camera_device(&self) -> Option<MediaDeviceInfo> {
        if !self.has_camera_access() {
            self.request_permissions(true, false).await;
            if !self.has_camera_access() {
                return None;
            }
        }
        self.camera_devices().into_iter().next()
    }

    /// Returns the default microphone device: the first audio input of the
    /// catalog.
    ///
    /// When microphone access is not granted yet, one
    /// [`MediaManager::request_permissions`] round is attempted first.
    /// Returns [`None`] when access cannot be obtained or no audio input
    /// device is attached.
    pub async fn default_microphone_device(&self) -> Option<MediaDeviceInfo> {
        if !self.has_microphone_access() {
            self.request_permissions(false, true).await;
            if !self.has_microphone_access() {
                return None;
            }
        }
        self.audio_input_devices().into_iter().next()
    }

    /// Requests a live camera stream, optionally pinned to the provided
    /// device.
    ///
    /// Acquired tracks stay registered until
    /// [`MediaManager::stop_camera_streams`].
    ///
    /// # Errors
    ///
    /// With [`GetUserMediaError`] if the capture request fails.
    pub async fn request_camera_stream(
        &self,
        device: Option<&MediaDeviceInfo>,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetUserMediaError>>
    {
        let mut video = VideoTrackConstraints::new();
        if let Some(device) = device {
            video.device_id(device.device_id().to_owned());
        }
        let mut caps = MediaStreamConstraints::new();
        caps.video(video);

        self.request_camera_stream_with_constraints(caps).await
    }

    /// Requests a live camera stream with caller-supplied constraints.
    ///
    /// # Errors
    ///
    /// With [`GetUserMediaError`] if the capture request fails.
    pub async fn request_camera_stream_with_constraints(
        &self,
        caps: MediaStreamConstraints,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetUserMediaError>>
    {
        self.0
            .request_stream(
                caps,
                &self.0.camera_tracks,
                MediaPermissionKind::Camera,
            )
            .await
    }

    /// Requests a live microphone stream, optionally pinned to the
    /// provided device.
    ///
    /// Acquired tracks stay registered until
    /// [`MediaManager::stop_microphone_streams`].
    ///
    /// # Errors
    ///
    /// With [`GetUserMediaError`] if the capture request fails.
    pub async fn request_microphone_stream(
        &self,
        device: Option<&MediaDeviceInfo>,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetUserMediaError>>
    {
        let mut audio = AudioTrackConstraints::new();
        if let Some(device) = device {
            audio.device_id(device.device_id().to_owned());
        }
        let mut caps = MediaStreamConstraints::new();
        caps.audio(audio);

        self.request_microphone_stream_with_constraints(caps).await
    }

    /// Requests a live microphone stream with caller-supplied constraints.
    ///
    /// # Errors
    ///
    /// With [`GetUserMediaError`] if the capture request fails.
    pub async fn request_microphone_stream_with_constraints(
        &self,
        caps: MediaStreamConstraints,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetUserMediaError>>
    {
        self.0
            .request_stream(
                caps,
                &self.0.microphone_tracks,
                MediaPermissionKind::Microphone,
            )
            .await
    }

    /// Requests a display (screen/window) capture stream.
    ///
    /// Display capture is an independent permission domain: it never
    /// affects the tracked camera/microphone state.
    ///
    /// # Errors
    ///
    /// With [`GetDisplayMediaError`] if the capture request fails.
    pub async fn request_display_stream(
        &self,
        audio: bool,
    ) -> Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<GetDisplayMediaError>>
    {
        let mut caps = DisplayMediaStreamConstraints::new();
        caps.audio(audio);

        let tracks = self
            .0
            .media_devices
            .get_display_media(caps)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> GetDisplayMediaError))?;

        self.0
            .display_tracks
            .borrow_mut()
            .extend(tracks.iter().cloned());

        Ok(tracks)
    }

    /// Stops and drops every track acquired via camera capture requests.
    pub fn stop_camera_streams(&self) {
        self.0.stop_tracks(&self.0.camera_tracks);
    }

    /// Stops and drops every track acquired via microphone capture
    /// requests.
    pub fn stop_microphone_streams(&self) {
        self.0.stop_tracks(&self.0.microphone_tracks);
    }

    /// Stops and drops every track acquired via display capture requests.
    pub fn stop_display_streams(&self) {
        self.0.stop_tracks(&self.0.display_tracks);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    };

    use futures::executor::block_on;

    use crate::{
        browser::NavigatorInfo,
        media::MediaKind,
        platform::Error,
    };

    use super::*;

    const CHROME_UA: &str =
        "Mozilla/5.0 AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";
    const FIREFOX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/122.0";

    /// Resolves on its second poll, forcing one suspension point.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    struct FakeTrack {
        id: String,
        kind: MediaKind,
        stopped: Cell<bool>,
    }

    impl FakeTrack {
        fn new(id: String, kind: MediaKind) -> Rc<Self> {
            Rc::new(Self {
                id,
                kind,
                stopped: Cell::new(false),
            })
        }
    }

    impl MediaStreamTrack for FakeTrack {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn kind(&self) -> MediaKind {
            self.kind
        }

        fn stop(&self) {
            self.stopped.set(true);
        }
    }

    /// Scripted stand-in for the host platform facilities.
    struct FakeMediaDevices {
        supports_queries: Cell<bool>,
        camera_query: RefCell<Result<PermissionState, Error>>,
        microphone_query: RefCell<Result<PermissionState, Error>>,
        devices: RefCell<Result<Vec<MediaDeviceInfo>, Error>>,
        user_media_fails: Cell<bool>,
        /// Makes the next [`get_user_media()`] response suspend once
        /// before resolving, so overlapping callers can be observed.
        pend_user_media_once: Cell<bool>,
        enumerate_calls: Cell<usize>,
        user_media_calls: Cell<usize>,
        display_media_calls: Cell<usize>,
        issued_tracks: RefCell<Vec<Rc<FakeTrack>>>,
    }

    impl Default for FakeMediaDevices {
        fn default() -> Self {
            Self {
                supports_queries: Cell::new(false),
                camera_query: RefCell::new(Err(Error::new(
                    "TypeError",
                    "'camera' is not a valid value for PermissionName",
                ))),
                microphone_query: RefCell::new(Err(Error::new(
                    "TypeError",
                    "'microphone' is not a valid value for PermissionName",
                ))),
                devices: RefCell::new(Ok(Vec::new())),
                user_media_fails: Cell::new(false),
                pend_user_media_once: Cell::new(false),
                enumerate_calls: Cell::new(0),
                user_media_calls: Cell::new(0),
                display_media_calls: Cell::new(0),
                issued_tracks: RefCell::new(Vec::new()),
            }
        }
    }

    impl FakeMediaDevices {
        fn issue_track(&self, kind: MediaKind) -> Rc<dyn MediaStreamTrack> {
            let id =
                format!("track-{}", self.issued_tracks.borrow().len());
            let track = FakeTrack::new(id, kind);
            self.issued_tracks.borrow_mut().push(Rc::clone(&track));
            track
        }

        fn all_issued_stopped(&self) -> bool {
            self.issued_tracks
                .borrow()
                .iter()
                .all(|t| t.stopped.get())
        }
    }

    impl MediaDevices for FakeMediaDevices {
        fn supports_permission_queries(&self) -> bool {
            self.supports_queries.get()
        }

        fn query_permission(
            &self,
            kind: MediaPermissionKind,
        ) -> LocalBoxFuture<'static, Result<PermissionState, Traced<Error>>>
        {
            let result = match kind {
                MediaPermissionKind::Camera => {
                    self.camera_query.borrow().clone()
                }
                MediaPermissionKind::Microphone => {
                    self.microphone_query.borrow().clone()
                }
            };
            future::ready(result.map_err(|e| tracerr::new!(e)))
                .boxed_local()
        }

        fn enumerate_devices(
            &self,
        ) -> LocalBoxFuture<
            'static,
            Result<Vec<MediaDeviceInfo>, Traced<Error>>,
        > {
            self.enumerate_calls.set(self.enumerate_calls.get() + 1);
            let result = self.devices.borrow().clone();
            future::ready(result.map_err(|e| tracerr::new!(e)))
                .boxed_local()
        }

        fn get_user_media(
            &self,
            caps: MediaStreamConstraints,
        ) -> LocalBoxFuture<
            'static,
            Result<Vec<Rc<dyn MediaStreamTrack>>, Traced<Error>>,
        > {
            self.user_media_calls.set(self.user_media_calls.get() + 1);
            let result = if self.user_media_fails.get() {
                Err(tracerr::new!(Error::new(
                    "NotAllowedError",
                    "Permission denied",
                )))
            } else {
                let mut tracks = Vec::new();
                if caps.is_video_requested() {
                    tracks.push(self.issue_track(MediaKind::Video));
                }
                if caps.is_audio_requested() {
                    tracks.push(self.issue_track(MediaKind::Audio));
                }
                Ok(tracks)
            };
            let pend = self.pend_user_media_once.replace(false);
            async move {
                if pend {
                    YieldOnce(false).await;
                }
                result
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
            self.display_media_calls
                .set(self.display_media_calls.get() + 1);
            let mut tracks = vec![self.issue_track(MediaKind::Video)];
            if caps.is_audio_requested() {
                tracks.push(self.issue_track(MediaKind::Audio));
            }
            future::ready(Ok(tracks)).boxed_local()
        }
    }

    fn device(
        id: &str,
        kind: MediaDeviceKind,
        label: &str,
    ) -> MediaDeviceInfo {
        MediaDeviceInfo::new(id.to_owned(), kind, label.to_owned(), None)
    }

    fn manager(fake: &Rc<FakeMediaDevices>, user_agent: &str) -> MediaManager {
        let media_devices: Rc<dyn MediaDevices> = fake.clone();
        MediaManager::new(
            media_devices,
            BrowserIdentity::detect(&NavigatorInfo {
                user_agent: user_agent.to_owned(),
                ..NavigatorInfo::default()
            }),
        )
    }

    #[test]
    fn starts_conservatively_denied() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, CHROME_UA);

        assert_eq!(mgr.camera_permission(), PermissionState::Denied);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);
        assert!(mgr.devices().is_empty());
    }

    #[test]
    fn probe_without_facility_fails_and_leaves_state() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, CHROME_UA);

        let result = block_on(mgr.probe_permissions());

        assert!(result.is_err());
        assert_eq!(mgr.camera_permission(), PermissionState::Denied);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);
        assert_eq!(fake.enumerate_calls.get(), 0);
    }

    #[test]
    fn probe_adopts_reported_states_verbatim() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.supports_queries.set(true);
        *fake.camera_query.borrow_mut() = Ok(PermissionState::Granted);
        *fake.microphone_query.borrow_mut() = Ok(PermissionState::Denied);
        let mgr = manager(&fake, CHROME_UA);

        block_on(mgr.probe_permissions()).unwrap();

        assert_eq!(mgr.camera_permission(), PermissionState::Granted);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);
        // A granted belief triggers a corroborating refresh.
        assert_eq!(fake.enumerate_calls.get(), 1);
    }

    #[test]
    fn failing_requery_never_downgrades_granted() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.supports_queries.set(true);
        *fake.camera_query.borrow_mut() = Ok(PermissionState::Granted);
        *fake.microphone_query.borrow_mut() = Ok(PermissionState::Denied);
        let mgr = manager(&fake, CHROME_UA);
        block_on(mgr.probe_permissions()).unwrap();

        *fake.camera_query.borrow_mut() =
            Err(Error::new("TypeError", "unsupported name"));
        *fake.microphone_query.borrow_mut() =
            Err(Error::new("TypeError", "unsupported name"));
        block_on(mgr.probe_permissions()).unwrap();

        assert_eq!(mgr.camera_permission(), PermissionState::Granted);
        // Not previously granted, so the failure degrades it to prompt.
        assert_eq!(mgr.microphone_permission(), PermissionState::Prompt);
    }

    #[test]
    fn failed_refresh_keeps_previous_catalog() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![device(
            "cam-1",
            MediaDeviceKind::VideoInput,
            "Front Camera",
        )]);
        let mgr = manager(&fake, CHROME_UA);

        block_on(mgr.refresh_devices());
        assert_eq!(mgr.devices().len(), 1);

        *fake.devices.borrow_mut() =
            Err(Error::new("AbortError", "enumeration failed"));
        block_on(mgr.refresh_devices());

        assert_eq!(mgr.devices().len(), 1);
        assert_eq!(mgr.devices()[0].device_id(), "cam-1");
    }

    #[test]
    fn empty_result_never_overwrites_catalog() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![device(
            "mic-1",
            MediaDeviceKind::AudioInput,
            "Internal Microphone",
        )]);
        let mgr = manager(&fake, CHROME_UA);
        block_on(mgr.refresh_devices());

        *fake.devices.borrow_mut() = Ok(Vec::new());
        block_on(mgr.refresh_devices());

        assert_eq!(mgr.devices().len(), 1);
    }

    #[test]
    fn unusable_records_are_filtered_out() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![
            device("", MediaDeviceKind::VideoInput, "No Id"),
            device("cam-2", MediaDeviceKind::VideoInput, ""),
        ]);
        let mgr = manager(&fake, CHROME_UA);

        block_on(mgr.refresh_devices());

        assert!(mgr.devices().is_empty());
        // Unlabeled records prove nothing about grants either.
        assert_eq!(mgr.camera_permission(), PermissionState::Denied);
    }

    #[test]
    fn visible_labeled_devices_imply_grants() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.supports_queries.set(true);
        let mgr = manager(&fake, CHROME_UA);

        // Queries fail (default), so camera degrades to prompt.
        block_on(mgr.probe_permissions()).unwrap();
        assert_eq!(mgr.camera_permission(), PermissionState::Prompt);

        *fake.devices.borrow_mut() = Ok(vec![device(
            "cam-1",
            MediaDeviceKind::VideoInput,
            "Front Camera",
        )]);
        block_on(mgr.refresh_devices());

        assert!(mgr.has_camera_access());
        assert!(!mgr.has_microphone_access());
    }

    #[test]
    fn capture_without_query_facility_grants_requested_only() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, CHROME_UA);

        block_on(mgr.request_permissions(true, false));

        assert_eq!(mgr.camera_permission(), PermissionState::Granted);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);
        assert_eq!(fake.user_media_calls.get(), 1);
        // Exactly one catalog refresh as part of the call.
        assert_eq!(fake.enumerate_calls.get(), 1);
        // The acquired probe stream was released immediately.
        assert!(fake.all_issued_stopped());
    }

    #[test]
    fn failed_capture_does_not_grant() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.user_media_fails.set(true);
        let mgr = manager(&fake, CHROME_UA);

        block_on(mgr.request_permissions(true, true));

        assert_eq!(mgr.camera_permission(), PermissionState::Denied);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);
        // The final refresh still runs.
        assert_eq!(fake.enumerate_calls.get(), 1);
    }

    #[test]
    fn firefox_short_circuits_to_prompt() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, FIREFOX_UA);

        block_on(mgr.request_permissions(true, true));

        assert_eq!(mgr.camera_permission(), PermissionState::Prompt);
        assert_eq!(mgr.microphone_permission(), PermissionState::Prompt);
        // The capture collaborator was never invoked.
        assert_eq!(fake.user_media_calls.get(), 0);
        assert_eq!(fake.enumerate_calls.get(), 0);
    }

    #[test]
    fn overlapping_identical_requests_are_coalesced() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.pend_user_media_once.set(true);
        let mgr = manager(&fake, CHROME_UA);

        block_on(future::join(
            mgr.request_permissions(true, false),
            mgr.request_permissions(true, false),
        ));

        assert_eq!(fake.user_media_calls.get(), 1);
        assert_eq!(mgr.camera_permission(), PermissionState::Granted);
    }

    #[test]
    fn differing_overlapping_requests_run_sequentially() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.pend_user_media_once.set(true);
        let mgr = manager(&fake, CHROME_UA);

        block_on(future::join(
            mgr.request_permissions(true, false),
            mgr.request_permissions(false, true),
        ));

        assert_eq!(fake.user_media_calls.get(), 2);
        assert_eq!(mgr.camera_permission(), PermissionState::Granted);
        assert_eq!(mgr.microphone_permission(), PermissionState::Granted);
    }

    #[test]
    fn default_camera_pick_is_deterministic() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.supports_queries.set(true);
        *fake.camera_query.borrow_mut() = Ok(PermissionState::Granted);
        *fake.microphone_query.borrow_mut() = Ok(PermissionState::Prompt);
        *fake.devices.borrow_mut() = Ok(vec![
            device("a", MediaDeviceKind::VideoInput, "Camera A"),
            device("b", MediaDeviceKind::VideoInput, "Camera B"),
        ]);
        let mgr = manager(&fake, CHROME_UA);
        block_on(mgr.probe_permissions()).unwrap();

        let first = block_on(mgr.default_camera_device()).unwrap();
        let second = block_on(mgr.default_camera_device()).unwrap();

        assert_eq!(first.device_id(), "a");
        assert_eq!(second.device_id(), "a");
        // Already granted, so no capture request was needed.
        assert_eq!(fake.user_media_calls.get(), 0);
    }

    #[test]
    fn default_device_requests_access_once_when_missing() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![device(
            "mic-1",
            MediaDeviceKind::AudioInput,
            "Internal Microphone",
        )]);
        let mgr = manager(&fake, CHROME_UA);

        let picked = block_on(mgr.default_microphone_device()).unwrap();

        assert_eq!(picked.device_id(), "mic-1");
        assert_eq!(fake.user_media_calls.get(), 1);
    }

    #[test]
    fn default_device_absent_when_access_refused() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.user_media_fails.set(true);
        let mgr = manager(&fake, CHROME_UA);

        assert!(block_on(mgr.default_camera_device()).is_none());
    }

    #[test]
    fn camera_stream_registers_and_stops_tracks() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, CHROME_UA);

        let tracks =
            block_on(mgr.request_camera_stream(None)).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].kind(), MediaKind::Video);
        assert!(mgr.has_camera_access());
        // First grant triggers a catalog refresh.
        assert_eq!(fake.enumerate_calls.get(), 1);
        assert!(!fake.all_issued_stopped());

        mgr.stop_camera_streams();
        assert!(fake.all_issued_stopped());
    }

    #[test]
    fn display_stream_is_independent_of_tracker() {
        let fake = Rc::new(FakeMediaDevices::default());
        let mgr = manager(&fake, CHROME_UA);

        let tracks = block_on(mgr.request_display_stream(true)).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(fake.display_media_calls.get(), 1);
        assert_eq!(mgr.camera_permission(), PermissionState::Denied);
        assert_eq!(mgr.microphone_permission(), PermissionState::Denied);

        mgr.stop_display_streams();
        assert!(fake.all_issued_stopped());
    }

    #[test]
    fn failed_stream_request_reports_cause() {
        let fake = Rc::new(FakeMediaDevices::default());
        fake.user_media_fails.set(true);
        let mgr = manager(&fake, CHROME_UA);

        let err = block_on(mgr.request_camera_stream(None)).err().unwrap();

        assert_eq!(err.as_ref().cause().name(), "NotAllowedError");
        assert!(!mgr.has_camera_access());
    }

    #[test]
    fn bootstrap_falls_back_to_catalog_refresh() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![device(
            "mic-1",
            MediaDeviceKind::AudioInput,
            "Internal Microphone",
        )]);
        let mgr = manager(&fake, CHROME_UA);

        block_on(async {
            let early = mgr.on_ready();
            mgr.bootstrap().await;
            early.await;
            // Late subscribers resolve immediately.
            mgr.on_ready().await;
        });

        assert_eq!(fake.enumerate_calls.get(), 1);
        assert!(mgr.has_microphone_access());
        assert!(!mgr.has_camera_access());
    }

    #[test]
    fn derived_views_split_catalog_by_kind() {
        let fake = Rc::new(FakeMediaDevices::default());
        *fake.devices.borrow_mut() = Ok(vec![
            device("cam-1", MediaDeviceKind::VideoInput, "Camera"),
            device("mic-1", MediaDeviceKind::AudioInput, "Microphone"),
            device("spk-1", MediaDeviceKind::AudioOutput, "Speakers"),
        ]);
        let mgr = manager(&fake, CHROME_UA);
        block_on(mgr.refresh_devices());

        assert_eq!(mgr.devices().len(), 3);
        assert_eq!(mgr.input_devices().len(), 2);
        assert_eq!(mgr.output_devices().len(), 1);
        assert_eq!(mgr.camera_devices().len(), 1);
        assert_eq!(mgr.audio_input_devices().len(), 1);
        assert_eq!(mgr.audio_output_devices().len(), 1);
    }
}
