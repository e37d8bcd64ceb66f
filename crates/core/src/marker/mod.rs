use indexmap::IndexSet;
use tracing::debug;

use crate::chart::{ChartKind, CURSOR_SERIES_NAME};
use crate::render::{CursorPatch, RenderSurface};
use crate::{TimeConsumer, TimeOrigin, TimeValue};

/// Monotonic counter identifying which session a pending cursor write was
/// queued for.
pub type SessionGeneration = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingCursor {
    time: TimeValue,
    generation: SessionGeneration,
}

/// Moves the time-cursor overlay on every chart through scoped patches.
///
/// Cadence is bounded by the producer's event rate, never polled: writes are
/// queued as they arrive and only the last one before a paint opportunity is
/// applied by [`MarkerUpdater::flush`]. The full-configuration path is never
/// taken from here — resubmitting a configuration on a time tick would reset
/// any user-adjusted zoom on every frame.
#[derive(Debug, Default)]
pub struct MarkerUpdater {
    generation: SessionGeneration,
    charts: IndexSet<ChartKind>,
    pending: Option<PendingCursor>,
}

impl MarkerUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Starts a new session scope: bumps the generation and records which
    /// charts the new session renders. Any write still pending for an older
    /// generation is thereby condemned; [`MarkerUpdater::flush`] drops it
    /// instead of letting it land on freshly rebuilt configuration.
    pub fn begin_session<I>(&mut self, charts: I) -> SessionGeneration
    where
        I: IntoIterator<Item = ChartKind>,
    {
        self.generation += 1;
        self.charts = charts.into_iter().collect();
        self.generation
    }

    /// Queues a cursor position. Multiple writes within one paint opportunity
    /// coalesce: the last value wins.
    pub fn queue(&mut self, time: TimeValue) {
        self.pending = Some(PendingCursor {
            time,
            generation: self.generation,
        });
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Paint-opportunity hook: applies the coalesced write, one scoped patch
    /// per chart. A write addressed to a discarded session generation is
    /// silently dropped; the user never sees it.
    pub fn flush(&mut self, surface: &mut dyn RenderSurface) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.generation != self.generation {
            debug!(
                stale = pending.generation,
                current = self.generation,
                "dropping cursor write for a discarded session"
            );
            return;
        }
        for chart in &self.charts {
            surface.apply_series_patch(CursorPatch {
                chart: *chart,
                series: CURSOR_SERIES_NAME.to_string(),
                time: pending.time,
            });
        }
    }
}

impl TimeConsumer for MarkerUpdater {
    fn time_changed(&mut self, time: TimeValue, _origin: TimeOrigin) {
        // Both media- and chart-originated writes move the cursor; the origin
        // only matters to the media adapter.
        self.queue(time);
    }
}
