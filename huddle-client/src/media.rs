/// Controls for the shared local capture source.
///
/// Mute and video-off act on the shared tracks, never on an individual peer
/// connection; every peer sees the same local media.
pub trait LocalMedia: Send + Sync {
    fn set_audio_enabled(&self, enabled: bool);

    fn set_video_enabled(&self, enabled: bool);

    /// Releases the capture source on room exit.
    fn release(&self);
}
