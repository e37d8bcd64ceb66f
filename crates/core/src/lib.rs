//! Core library for the Robot Replay viewer.
//!
//! The crate implements a synchronized multi-view timeline engine: one
//! canonical time value shared by a video element and several telemetry
//! charts, per-session series projection, retained legend state, and a strict
//! split between structural chart rebuilds and scoped time-cursor updates.
//! Each module owns a distinct subsystem and the [`viewer::ReplayView`]
//! façade wires them together for an embedding application.

pub mod chart;
pub mod config;
pub mod error;
pub mod legend;
pub mod marker;
pub mod media;
pub mod render;
pub mod series;
pub mod session;
pub mod timeline;
pub mod viewer;

pub use chart::{
    build_config, Axis, AxisKind, ChartConfig, ChartKind, CursorOverlay, SeriesConfig,
    TooltipEntry, CURSOR_SERIES_NAME,
};
pub use config::ViewerConfig;
pub use error::{ReplayError, Result};
pub use legend::{ViewState, ViewStateCache};
pub use marker::{MarkerUpdater, SessionGeneration};
pub use media::{MediaAdapter, MediaControl, MediaState};
pub use render::{CursorPatch, RecordingSurface, RenderSurface, SurfaceCall};
pub use series::{ChartSeries, Palette, Series, SeriesProjector, SeriesSamples, FALLBACK_COLOR};
pub use session::{ChannelValues, ExtraPoint, MotorChannels, OrderSession, RawChannel};
pub use timeline::{TimeAuthority, TimeConsumer, TimeOrigin, TimeValue};
pub use viewer::ReplayView;
