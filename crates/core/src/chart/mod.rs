use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::legend::ViewState;
use crate::series::{ChartSeries, Series, SeriesSamples};
use crate::session::{ExtraPoint, MotorChannels, RawChannel};
use crate::TimeValue;

/// Name of the synthetic series that draws the current-time indicator line.
/// It is the only element the marker updater ever touches, and it is excluded
/// from legend interaction and tooltip output.
pub const CURSOR_SERIES_NAME: &str = "time-cursor";

/// The logical charts a session can project into. Each chart shows one series
/// per motor, drawn from the motor's channel of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Velocity,
    Position,
    State,
    Weight,
}

impl ChartKind {
    pub const ALL: [Self; 4] = [Self::Velocity, Self::Position, Self::State, Self::Weight];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Velocity => "Velocity",
            Self::Position => "Position",
            Self::State => "State",
            Self::Weight => "Weight",
        }
    }

    /// Wire name of the channel this chart draws from each motor group.
    pub fn channel_key(&self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Position => "position",
            Self::State => "state",
            Self::Weight => "weight",
        }
    }

    /// Axis behavior is decided here, by chart identity, never by inspecting
    /// sample values at runtime.
    pub fn axis_kind(&self) -> AxisKind {
        match self {
            Self::State => AxisKind::Categorical,
            _ => AxisKind::Numeric,
        }
    }

    pub fn channel_in<'a>(&self, motor: &'a MotorChannels) -> Option<&'a RawChannel> {
        match self {
            Self::Velocity => motor.velocity.as_ref(),
            Self::Position => motor.position.as_ref(),
            Self::State => motor.state.as_ref(),
            Self::Weight => motor.weight.as_ref(),
        }
    }
}

/// Value-axis flavor of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Numeric,
    Categorical,
}

/// Computed value axis shipped to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Axis {
    /// Scaling is automatic from the data range.
    Numeric,
    /// Fixed category domain: the union of distinct values over the *entire*
    /// history of every series on the chart, in first-seen order. The domain
    /// is independent of the current zoom window.
    Categorical { domain: Vec<String> },
}

/// One displayable series inside a chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    pub color: String,
    pub visible: bool,
    pub samples: SeriesSamples,
}

/// The synthetic cursor overlay element. Addressed by `name` through the
/// surface's series-level replacement capability; carries no data samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorOverlay {
    pub name: String,
    pub time: TimeValue,
}

/// Full configuration for one chart, produced only on structural changes
/// (a new session's series-name set). Time-only updates never rebuild this;
/// they go through the marker updater's scoped patch instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub chart: ChartKind,
    pub title: String,
    pub axis: Axis,
    pub series: Vec<SeriesConfig>,
    /// Annotated overlay points, rendered outside the legend/visibility rules.
    pub extra_points: Vec<ExtraPoint>,
    pub cursor: CursorOverlay,
}

impl ChartConfig {
    /// Tooltip rows at the given time: the last sample at or before `time`
    /// for every visible data series. The synthetic cursor overlay never
    /// appears here.
    pub fn tooltip_entries(&self, time: TimeValue) -> Vec<TooltipEntry> {
        self.series
            .iter()
            .filter(|series| series.visible && series.name != self.cursor.name)
            .filter_map(|series| {
                series.samples.display_at(time).map(|value| TooltipEntry {
                    name: series.name.clone(),
                    value,
                })
            })
            .collect()
    }

    pub fn series_names(&self) -> IndexSet<String> {
        self.series.iter().map(|series| series.name.clone()).collect()
    }
}

/// A single formatted tooltip row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipEntry {
    pub name: String,
    pub value: String,
}

/// Builds a full chart configuration from projected series, the retained view
/// state, and the axis kind. Pure: same inputs, same output; no clocks, no
/// caches. Invoked only when the series-name set changes, never on time-only
/// updates.
pub fn build_config(
    projected: &ChartSeries,
    view: &ViewState,
    axis_kind: AxisKind,
    cursor_time: TimeValue,
) -> ChartConfig {
    let axis = match axis_kind {
        AxisKind::Numeric => Axis::Numeric,
        AxisKind::Categorical => Axis::Categorical {
            domain: categorical_domain(&projected.series),
        },
    };

    let series = projected
        .series
        .iter()
        .map(|series| SeriesConfig {
            name: series.name.clone(),
            color: series.color.clone(),
            visible: view.is_visible(&series.name),
            samples: series.samples.clone(),
        })
        .collect();

    ChartConfig {
        chart: projected.kind,
        title: projected.kind.label().to_string(),
        axis,
        series,
        extra_points: projected.extra_points.clone(),
        cursor: CursorOverlay {
            name: CURSOR_SERIES_NAME.to_string(),
            time: cursor_time,
        },
    }
}

/// Union of category values across every series, full history, first-seen
/// order. Series that are not categorical contribute nothing.
fn categorical_domain(series: &[Series]) -> Vec<String> {
    let mut domain = IndexSet::new();
    for series in series {
        for category in &series.categories {
            domain.insert(category.clone());
        }
    }
    domain.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::test_support::{categorical_series, numeric_series};

    fn state_chart(series: Vec<Series>) -> ChartSeries {
        ChartSeries {
            kind: ChartKind::State,
            series,
            extra_points: Vec::new(),
        }
    }

    #[test]
    fn categorical_domain_covers_full_history_not_the_zoom_window() {
        // The "error" category occurs only at t = 7; any zoom window the
        // surface applies later must still find it on the axis.
        let series = categorical_series(
            "truck",
            &[(0.0, "idle"), (3.0, "moving"), (7.0, "error"), (9.0, "idle")],
        );
        let view = ViewState::all_visible(["truck".to_string()]);

        let config = build_config(
            &state_chart(vec![series]),
            &view,
            AxisKind::Categorical,
            0.0,
        );

        assert_eq!(
            config.axis,
            Axis::Categorical {
                domain: vec![
                    "idle".to_string(),
                    "moving".to_string(),
                    "error".to_string()
                ]
            }
        );
    }

    #[test]
    fn domain_unions_across_series_in_first_seen_order() {
        let truck = categorical_series("truck", &[(0.0, "idle"), (1.0, "moving")]);
        let screen = categorical_series("screen", &[(0.0, "moving"), (2.0, "homing")]);
        let view = ViewState::all_visible(["truck".to_string(), "screen".to_string()]);

        let config = build_config(
            &state_chart(vec![truck, screen]),
            &view,
            AxisKind::Categorical,
            0.0,
        );

        assert_eq!(
            config.axis,
            Axis::Categorical {
                domain: vec![
                    "idle".to_string(),
                    "moving".to_string(),
                    "homing".to_string()
                ]
            }
        );
    }

    #[test]
    fn tooltip_excludes_the_cursor_overlay_and_hidden_series() {
        let truck = numeric_series("truck", &[(0.0, 10.0), (1.0, 20.0)]);
        let screen = numeric_series("screen", &[(0.0, 1.0)]);
        let mut view =
            ViewState::all_visible(["truck".to_string(), "screen".to_string()]);
        view.set_visible("screen", false);

        let projected = ChartSeries {
            kind: ChartKind::Velocity,
            series: vec![truck, screen],
            extra_points: Vec::new(),
        };
        let config = build_config(&projected, &view, AxisKind::Numeric, 0.0);

        let entries = config.tooltip_entries(1.5);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "truck");
        assert_eq!(entries[0].value, "20");
        assert!(entries.iter().all(|entry| entry.name != CURSOR_SERIES_NAME));
    }

    #[test]
    fn hidden_series_stay_in_the_config_with_visibility_off() {
        let truck = numeric_series("truck", &[(0.0, 10.0)]);
        let mut view = ViewState::all_visible(["truck".to_string()]);
        view.set_visible("truck", false);

        let projected = ChartSeries {
            kind: ChartKind::Velocity,
            series: vec![truck],
            extra_points: Vec::new(),
        };
        let config = build_config(&projected, &view, AxisKind::Numeric, 2.0);

        assert_eq!(config.series.len(), 1);
        assert!(!config.series[0].visible);
        assert_eq!(config.cursor.time, 2.0);
        assert_eq!(config.cursor.name, CURSOR_SERIES_NAME);
    }

    #[test]
    fn axis_kind_follows_chart_identity() {
        assert_eq!(ChartKind::State.axis_kind(), AxisKind::Categorical);
        assert_eq!(ChartKind::Velocity.axis_kind(), AxisKind::Numeric);
        assert_eq!(ChartKind::Weight.axis_kind(), AxisKind::Numeric);
    }
}
