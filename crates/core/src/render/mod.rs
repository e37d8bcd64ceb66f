use std::sync::{Arc, Mutex};

use crate::chart::{ChartConfig, ChartKind};
use crate::TimeValue;

/// Scoped update addressed to a single named series element of one chart.
/// Applying it must leave every sibling setting — zoom, pan, legend — exactly
/// as the user left it.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPatch {
    pub chart: ChartKind,
    /// Name of the series element to replace (the cursor overlay).
    pub series: String,
    pub time: TimeValue,
}

/// Capability contract the external rendering surface must provide. The core
/// never draws; it only hands the surface full configurations on structural
/// changes and scoped patches on time changes. The third capability — legend
/// change events carrying a `name -> visible` map — flows the other way, into
/// [`crate::viewer::ReplayView::on_legend_change`].
pub trait RenderSurface {
    /// Full configuration replacement for one chart.
    fn apply_full_config(&mut self, config: ChartConfig);

    /// Partial, non-destructive series-level replacement.
    fn apply_series_patch(&mut self, patch: CursorPatch);
}

/// Everything a surface was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    FullConfig(ChartConfig),
    Patch(CursorPatch),
}

/// In-process surface that records every call. One clone is wired into the
/// view, the other stays with the caller for inspection; both see the same
/// call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn full_configs(&self) -> Vec<ChartConfig> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::FullConfig(config) => Some(config),
                SurfaceCall::Patch(_) => None,
            })
            .collect()
    }

    pub fn patches(&self) -> Vec<CursorPatch> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Patch(patch) => Some(patch),
                SurfaceCall::FullConfig(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn apply_full_config(&mut self, config: ChartConfig) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(SurfaceCall::FullConfig(config));
        }
    }

    fn apply_series_patch(&mut self, patch: CursorPatch) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(SurfaceCall::Patch(patch));
        }
    }
}
