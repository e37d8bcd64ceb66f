use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;

/// Per-chart legend selection: which series names are currently visible.
/// Independent of the data and of the canonical time; it survives any number
/// of time-only updates untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    visible: IndexMap<String, bool>,
}

impl ViewState {
    /// Initial state for a fresh series set: every series visible.
    pub fn all_visible<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            visible: names.into_iter().map(|name| (name, true)).collect(),
        }
    }

    /// Unknown names are reported visible; only an explicit toggle hides a
    /// series.
    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.get(name).copied().unwrap_or(true)
    }

    /// Toggles a known series. Names outside the current series set are
    /// ignored so stray events cannot grow the state.
    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(slot) = self.visible.get_mut(name) {
            *slot = visible;
        }
    }

    pub fn select_all(&mut self) {
        for visible in self.visible.values_mut() {
            *visible = true;
        }
    }

    pub fn names(&self) -> IndexSet<String> {
        self.visible.keys().cloned().collect()
    }

    /// The current `name -> visible` selection.
    pub fn selection(&self) -> &IndexMap<String, bool> {
        &self.visible
    }

    /// Applies a legend-change payload from the rendering surface. The
    /// externally-owned payload is normalized into owned `name -> bool` pairs
    /// immediately; nothing of it is retained. A payload that does not parse
    /// as a boolean selection map is treated as "select all", never as an
    /// error.
    pub fn apply_selection(&mut self, payload: &serde_json::Value) {
        match parse_selection(payload) {
            Some(pairs) => {
                for (name, visible) in pairs {
                    self.set_visible(&name, visible);
                }
            }
            None => self.select_all(),
        }
    }
}

/// Extracts `name -> bool` pairs from a legend event payload. Surfaces either
/// ship the selection map directly or nest it under a `selected` key; any
/// other shape (or a non-boolean entry) is malformed.
fn parse_selection(payload: &serde_json::Value) -> Option<Vec<(String, bool)>> {
    let object = payload
        .get("selected")
        .and_then(serde_json::Value::as_object)
        .or_else(|| payload.as_object())?;

    let mut pairs = Vec::with_capacity(object.len());
    for (name, value) in object {
        pairs.push((name.clone(), value.as_bool()?));
    }
    Some(pairs)
}

/// Retains each chart's [`ViewState`] across re-renders. State is
/// (re)initialized only when the chart's series-name set changes by
/// membership; everything else mutates in place.
#[derive(Debug, Default)]
pub struct ViewStateCache {
    charts: IndexMap<ChartKind, ViewState>,
}

impl ViewStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view state for `chart`, resetting it to all-visible when
    /// `names` differs from the cached set by membership (order changes do
    /// not reset).
    pub fn sync(&mut self, chart: ChartKind, names: &IndexSet<String>) -> &ViewState {
        let needs_reset = match self.charts.get(&chart) {
            Some(state) => state.names() != *names,
            None => true,
        };
        if needs_reset {
            self.charts
                .insert(chart, ViewState::all_visible(names.iter().cloned()));
        }
        &self.charts[&chart]
    }

    pub fn get(&self, chart: ChartKind) -> Option<&ViewState> {
        self.charts.get(&chart)
    }

    /// Routes a legend payload to the chart's state. Events for charts that
    /// were never configured are dropped.
    pub fn apply_selection(&mut self, chart: ChartKind, payload: &serde_json::Value) {
        if let Some(state) = self.charts.get_mut(&chart) {
            state.apply_selection(payload);
        }
    }
}
