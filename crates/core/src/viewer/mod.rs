use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::{IndexMap, IndexSet};

use crate::chart::{build_config, ChartKind};
use crate::legend::{ViewState, ViewStateCache};
use crate::marker::{MarkerUpdater, SessionGeneration};
use crate::media::{MediaAdapter, MediaControl, MediaState};
use crate::render::RenderSurface;
use crate::series::SeriesProjector;
use crate::session::OrderSession;
use crate::timeline::{TimeAuthority, TimeConsumer, TimeOrigin, TimeValue};
use crate::{ReplayError, Result, ViewerConfig};

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| ReplayError::msg(format!("{what} lock poisoned")))
}

/// Composes the engine: one time authority, the media adapter and the marker
/// updater registered as its consumers, the series projector, the view state
/// cache, and the rendering surface.
///
/// Structural updates (a new session's series sets) rebuild full chart
/// configurations; positional updates (time changes) only ever queue scoped
/// cursor patches. Each chart steps through `Uninitialized -> Configured` on
/// its first session, loops on `Configured` for time-cursor and legend-toggle
/// updates, and re-enters `Configured` through a reset when a new session
/// changes its series-name set. There is no terminal state while the view is
/// alive.
pub struct ReplayView {
    projector: SeriesProjector,
    authority: TimeAuthority,
    media: Arc<Mutex<MediaAdapter>>,
    marker: Arc<Mutex<MarkerUpdater>>,
    view_state: ViewStateCache,
    charts: IndexMap<ChartKind, IndexSet<String>>,
    surface: Box<dyn RenderSurface>,
    session: Option<OrderSession>,
}

impl ReplayView {
    pub fn new(
        config: &ViewerConfig,
        media: Box<dyn MediaControl>,
        surface: Box<dyn RenderSurface>,
    ) -> Self {
        let mut authority = TimeAuthority::new();
        let marker = Arc::new(Mutex::new(MarkerUpdater::new()));
        let media = Arc::new(Mutex::new(MediaAdapter::new(media)));

        // Registration order matters for a single write: the cursor position
        // is queued before the media element is commanded.
        let as_consumer: Arc<Mutex<dyn TimeConsumer>> = marker.clone();
        authority.subscribe(as_consumer);
        let as_consumer: Arc<Mutex<dyn TimeConsumer>> = media.clone();
        authority.subscribe(as_consumer);

        Self {
            projector: SeriesProjector::new(config),
            authority,
            media,
            marker,
            view_state: ViewStateCache::new(),
            charts: IndexMap::new(),
            surface,
            session: None,
        }
    }

    /// Installs a new session, replacing the previous one whole.
    ///
    /// The marker generation is bumped *before* the new configurations are
    /// built, so a cursor write still pending for the old session can never
    /// land on freshly rebuilt charts. View state resets only for charts
    /// whose series-name set actually changed; every chart with at least one
    /// series gets a full configuration pushed to the surface, and charts
    /// with zero series are omitted entirely.
    pub fn load_session(&mut self, session: OrderSession) -> Result<()> {
        let projected = self.projector.project(&session);

        lock(&self.marker, "marker updater")?
            .begin_session(projected.iter().map(|chart| chart.kind));
        lock(&self.media, "media adapter")?.reset();
        self.authority.reset();

        let mut charts = IndexMap::new();
        for chart in &projected {
            let names = chart.series_names();
            let view = self.view_state.sync(chart.kind, &names);
            let config = build_config(
                chart,
                view,
                chart.kind.axis_kind(),
                self.authority.current(),
            );
            self.surface.apply_full_config(config);
            charts.insert(chart.kind, names);
        }

        self.charts = charts;
        self.session = Some(session);
        Ok(())
    }

    /// Native time-advance event from the media element. Events arriving
    /// while a commanded seek is outstanding are dropped by the adapter and
    /// never reach the canonical time.
    pub fn on_media_time(&mut self, time: TimeValue) -> Result<()> {
        let accepted = lock(&self.media, "media adapter")?.accept_time_advance(time);
        if accepted {
            self.authority.set_time(time, TimeOrigin::Media);
        }
        Ok(())
    }

    /// Native seeking event from the media element.
    pub fn on_media_seeking(&mut self, time: TimeValue) -> Result<()> {
        lock(&self.media, "media adapter")?.observe_seeking(time);
        self.authority.set_time(time, TimeOrigin::Media);
        Ok(())
    }

    /// Media load failure. Reported once; the canonical time holds its last
    /// value and nothing retries the load.
    pub fn on_media_load_error(&mut self, message: &str) -> Result<()> {
        lock(&self.media, "media adapter")?.report_load_error(message);
        Ok(())
    }

    /// Pointer interaction on a chart proposing a new canonical time. The
    /// authority notifies the media adapter, which pauses first and then
    /// seeks, in that order.
    pub fn on_chart_pointer(&mut self, time: TimeValue) {
        self.authority.set_time(time, TimeOrigin::Chart);
    }

    /// Legend-change event from the rendering surface. The payload is
    /// normalized into the chart's cached view state immediately; a malformed
    /// payload selects everything and is never an error.
    pub fn on_legend_change(&mut self, chart: ChartKind, payload: &serde_json::Value) {
        self.view_state.apply_selection(chart, payload);
    }

    /// Paint-opportunity hook: applies the latest coalesced cursor write as
    /// scoped patches, one per chart. Never rebuilds configuration.
    pub fn flush_frame(&mut self) -> Result<()> {
        lock(&self.marker, "marker updater")?.flush(self.surface.as_mut());
        Ok(())
    }

    pub fn current_time(&self) -> TimeValue {
        self.authority.current()
    }

    pub fn session(&self) -> Option<&OrderSession> {
        self.session.as_ref()
    }

    /// Charts configured for the active session, in display order.
    pub fn charts(&self) -> Vec<ChartKind> {
        self.charts.keys().copied().collect()
    }

    pub fn view_state(&self, chart: ChartKind) -> Option<ViewState> {
        self.view_state.get(chart).cloned()
    }

    pub fn media_state(&self) -> Result<MediaState> {
        Ok(lock(&self.media, "media adapter")?.state())
    }

    pub fn marker_generation(&self) -> Result<SessionGeneration> {
        Ok(lock(&self.marker, "marker updater")?.generation())
    }
}

impl std::fmt::Debug for ReplayView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayView")
            .field("current_time", &self.authority.current())
            .field("charts", &self.charts.keys().collect::<Vec<_>>())
            .field("session", &self.session.as_ref().map(OrderSession::id))
            .finish()
    }
}
