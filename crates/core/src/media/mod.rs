use tracing::{debug, error};

use crate::{TimeConsumer, TimeOrigin, TimeValue};

/// Tolerance when matching an observed media position against the target of a
/// commanded seek. Media elements quantize positions to their time base, so an
/// exact float comparison would never clear the suppression window.
const SEEK_EPSILON: TimeValue = 1e-3;

/// Standard media-control primitives the underlying element must expose.
/// In a browser embedding this wraps the video element; tests and the CLI use
/// in-process fakes.
pub trait MediaControl {
    fn pause(&mut self);
    fn set_position(&mut self, seconds: TimeValue);
}

/// Load state of the underlying media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    /// Element is usable (or still loading without a reported failure).
    Playable,
    /// Load failed. There is no automatic retry: the state persists until the
    /// user reselects or reloads the session.
    Failed,
}

/// Bridges a media element's native events to and from the canonical time.
///
/// Event flow is one-directional per write: native time-advance and seeking
/// events are forwarded (by the embedding view) to the time authority with
/// [`TimeOrigin::Media`], and the adapter reacts only to writes tagged
/// [`TimeOrigin::Chart`] by pausing and seeking the element. A media-origin
/// write therefore never commands the media element again.
pub struct MediaAdapter {
    control: Box<dyn MediaControl>,
    state: MediaState,
    /// Target of a commanded seek that the element has not yet been observed
    /// at. While set, time-advance events are not accepted, so a still-playing
    /// position can never race a seek in flight.
    awaiting_seek: Option<TimeValue>,
}

impl MediaAdapter {
    pub fn new(control: Box<dyn MediaControl>) -> Self {
        Self {
            control,
            state: MediaState::Playable,
            awaiting_seek: None,
        }
    }

    pub fn state(&self) -> MediaState {
        self.state
    }

    pub fn is_failed(&self) -> bool {
        self.state == MediaState::Failed
    }

    /// Pauses the underlying media first, then sets its position. Pausing
    /// before seeking guarantees the time display and the media position never
    /// diverge mid-seek. Subsequent time-advance events are held back until
    /// the element is observed at the target.
    pub fn seek_to(&mut self, seconds: TimeValue) {
        if self.is_failed() {
            debug!(seconds, "ignoring seek on failed media");
            return;
        }
        self.control.pause();
        self.control.set_position(seconds);
        self.awaiting_seek = Some(seconds);
    }

    /// Whether a native time-advance event at `seconds` should be forwarded
    /// to the time authority. Events arriving while a commanded seek is still
    /// outstanding are dropped unless they land on the seek target.
    pub fn accept_time_advance(&mut self, seconds: TimeValue) -> bool {
        match self.awaiting_seek {
            None => true,
            Some(target) if (seconds - target).abs() <= SEEK_EPSILON => {
                self.awaiting_seek = None;
                true
            }
            Some(target) => {
                debug!(seconds, target, "dropping time advance while seek is outstanding");
                false
            }
        }
    }

    /// Records a native seeking event. A seeking event always ends the
    /// suppression window: either the element reached the commanded target,
    /// or the user started a newer seek through the native controls, which
    /// supersedes the outstanding one.
    pub fn observe_seeking(&mut self, _seconds: TimeValue) {
        self.awaiting_seek = None;
    }

    /// Reports a media load failure. Only the first report is surfaced; the
    /// canonical time holds its last value and nothing retries the load.
    pub fn report_load_error(&mut self, message: &str) {
        if self.is_failed() {
            return;
        }
        error!(error = message, "media failed to load");
        self.state = MediaState::Failed;
    }

    /// Restores the adapter for a freshly selected session.
    pub fn reset(&mut self) {
        self.state = MediaState::Playable;
        self.awaiting_seek = None;
    }
}

impl TimeConsumer for MediaAdapter {
    fn time_changed(&mut self, time: TimeValue, origin: TimeOrigin) {
        // Media-origin writes came from this element; commanding it again
        // would close the feedback loop the origin tag exists to break.
        if origin == TimeOrigin::Chart {
            self.seek_to(time);
        }
    }
}

impl std::fmt::Debug for MediaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAdapter")
            .field("state", &self.state)
            .field("awaiting_seek", &self.awaiting_seek)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakeMedia, MediaCall};
    use super::*;

    fn adapter_with_fake() -> (MediaAdapter, FakeMedia) {
        let fake = FakeMedia::default();
        (MediaAdapter::new(Box::new(fake.clone())), fake)
    }

    #[test]
    fn seek_pauses_before_setting_position() {
        let (mut adapter, fake) = adapter_with_fake();

        adapter.seek_to(12.5);

        assert_eq!(
            fake.calls(),
            vec![MediaCall::Pause, MediaCall::SetPosition(12.5)]
        );
    }

    #[test]
    fn suppresses_time_advances_until_seek_target_observed() {
        let (mut adapter, _fake) = adapter_with_fake();

        adapter.seek_to(12.5);

        // Stale events from the still-advancing playback position.
        assert!(!adapter.accept_time_advance(13.0));
        assert!(!adapter.accept_time_advance(13.1));
        // The element lands on the target; events flow again.
        assert!(adapter.accept_time_advance(12.5));
        assert!(adapter.accept_time_advance(12.6));
    }

    #[test]
    fn native_seeking_ends_the_suppression_window() {
        let (mut adapter, _fake) = adapter_with_fake();

        adapter.seek_to(4.0);
        adapter.observe_seeking(9.0);

        assert!(adapter.accept_time_advance(9.0));
    }

    #[test]
    fn chart_origin_writes_command_the_element_media_origin_writes_do_not() {
        let (mut adapter, fake) = adapter_with_fake();

        adapter.time_changed(3.0, TimeOrigin::Media);
        assert!(fake.calls().is_empty());

        adapter.time_changed(3.0, TimeOrigin::Chart);
        assert_eq!(
            fake.calls(),
            vec![MediaCall::Pause, MediaCall::SetPosition(3.0)]
        );
    }

    #[test]
    fn load_failure_is_sticky_and_stops_seeks() {
        let (mut adapter, fake) = adapter_with_fake();

        adapter.report_load_error("404 on video");
        adapter.report_load_error("repeat");
        assert!(adapter.is_failed());

        adapter.seek_to(2.0);
        assert!(fake.calls().is_empty());

        adapter.reset();
        assert_eq!(adapter.state(), MediaState::Playable);
    }
}
