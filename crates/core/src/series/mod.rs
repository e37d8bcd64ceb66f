use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chart::ChartKind;
use crate::config::ViewerConfig;
use crate::session::{ChannelValues, ExtraPoint, OrderSession, RawChannel};
use crate::TimeValue;

/// Fixed palette for well-known motor names. Colors stay stable across
/// reloads of the same machine as long as the names do.
const PALETTE: &[(&str, &str)] = &[
    ("truck", "#5470c6"),
    ("screen", "#91cc75"),
    ("arm", "#fac858"),
    ("sauce", "#ee6666"),
    ("belt", "#73c0de"),
    ("pump", "#3ba272"),
];

/// Color used for every series name the palette does not know.
pub const FALLBACK_COLOR: &str = "#9a9a9a";

/// Deterministic `name -> color` lookup: configured overrides first, then the
/// built-in palette, then the fallback.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    overrides: IndexMap<String, String>,
}

impl Palette {
    pub fn with_overrides(overrides: IndexMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn color_for(&self, name: &str) -> String {
        if let Some(color) = self.overrides.get(name) {
            return color.clone();
        }
        PALETTE
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, color)| (*color).to_string())
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }
}

/// Ordered samples of a series, preserved exactly as the channel delivered
/// them. No resampling, no interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSamples {
    Numeric(Vec<(TimeValue, f64)>),
    Categorical(Vec<(TimeValue, String)>),
}

impl SeriesSamples {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(samples) => samples.len(),
            Self::Categorical(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Formats the last sample at or before `time` for display, if any sample
    /// exists that early.
    pub fn display_at(&self, time: TimeValue) -> Option<String> {
        match self {
            Self::Numeric(samples) => {
                let index = samples.partition_point(|(t, _)| *t <= time);
                index.checked_sub(1).map(|i| format!("{}", samples[i].1))
            }
            Self::Categorical(samples) => {
                let index = samples.partition_point(|(t, _)| *t <= time);
                index.checked_sub(1).map(|i| samples[i].1.clone())
            }
        }
    }
}

/// A channel prepared for display: stable name (legend key and color lookup),
/// deterministic color, and the full ordered sample history. Categorical
/// series additionally carry every distinct category value seen across the
/// entire history, in first-seen order — independent of any zoom window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub samples: SeriesSamples,
    #[serde(default)]
    pub categories: IndexSet<String>,
}

/// Projection result for one logical chart. Charts that would end up with
/// zero series are never constructed in the first place.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub series: Vec<Series>,
    pub extra_points: Vec<ExtraPoint>,
}

impl ChartSeries {
    pub fn series_names(&self) -> IndexSet<String> {
        self.series.iter().map(|series| series.name.clone()).collect()
    }
}

/// Transforms an order session's raw channel groups into display-ready series
/// sets, one per logical chart.
#[derive(Debug, Clone)]
pub struct SeriesProjector {
    charts: Vec<ChartKind>,
    palette: Palette,
}

impl SeriesProjector {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            charts: config.charts.clone(),
            palette: Palette::with_overrides(config.palette_overrides.clone()),
        }
    }

    /// Projects every configured chart. Malformed channels are dropped with a
    /// warning; a chart whose channels all dropped out is omitted entirely,
    /// degrading that chart alone rather than the whole view.
    pub fn project(&self, session: &OrderSession) -> Vec<ChartSeries> {
        self.charts
            .iter()
            .filter_map(|kind| self.project_chart(*kind, session))
            .collect()
    }

    fn project_chart(&self, kind: ChartKind, session: &OrderSession) -> Option<ChartSeries> {
        let mut series = Vec::new();
        for (motor, channels) in &session.motors {
            let Some(raw) = kind.channel_in(channels) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            if let Err(err) = raw.check_shape(&format!("{motor}.{}", kind.channel_key())) {
                warn!(%err, "dropping malformed channel");
                continue;
            }
            if !raw.is_time_ordered() {
                warn!(%motor, chart = kind.label(), "channel timestamps are not non-decreasing");
            }
            series.push(self.build_series(motor, raw));
        }

        if series.is_empty() {
            return None;
        }

        let extra_points = match kind {
            ChartKind::Weight => session.extra_weight_points.clone(),
            _ => Vec::new(),
        };

        Some(ChartSeries {
            kind,
            series,
            extra_points,
        })
    }

    fn build_series(&self, name: &str, raw: &RawChannel) -> Series {
        let (samples, categories) = match &raw.value {
            ChannelValues::Numeric(values) => {
                let samples = raw
                    .time
                    .iter()
                    .copied()
                    .zip(values.iter().copied())
                    .collect();
                (SeriesSamples::Numeric(samples), IndexSet::new())
            }
            ChannelValues::Categorical(values) => {
                let categories = values.iter().cloned().collect();
                let samples = raw
                    .time
                    .iter()
                    .copied()
                    .zip(values.iter().cloned())
                    .collect();
                (SeriesSamples::Categorical(samples), categories)
            }
        };

        Series {
            name: name.to_string(),
            color: self.palette.color_for(name),
            samples,
            categories,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn numeric_series(name: &str, samples: &[(TimeValue, f64)]) -> Series {
        Series {
            name: name.to_string(),
            color: Palette::default().color_for(name),
            samples: SeriesSamples::Numeric(samples.to_vec()),
            categories: IndexSet::new(),
        }
    }

    pub(crate) fn categorical_series(name: &str, samples: &[(TimeValue, &str)]) -> Series {
        let categories = samples.iter().map(|(_, v)| (*v).to_string()).collect();
        Series {
            name: name.to_string(),
            color: Palette::default().color_for(name),
            samples: SeriesSamples::Categorical(
                samples
                    .iter()
                    .map(|(t, v)| (*t, (*v).to_string()))
                    .collect(),
            ),
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MotorChannels;

    fn projector() -> SeriesProjector {
        SeriesProjector::new(&ViewerConfig::default())
    }

    fn numeric_channel(samples: &[(TimeValue, f64)]) -> RawChannel {
        RawChannel {
            time: samples.iter().map(|(t, _)| *t).collect(),
            value: ChannelValues::Numeric(samples.iter().map(|(_, v)| *v).collect()),
        }
    }

    fn motor_with_velocity(samples: &[(TimeValue, f64)]) -> MotorChannels {
        MotorChannels {
            velocity: Some(numeric_channel(samples)),
            position: None,
            state: None,
            weight: None,
        }
    }

    fn session_with(motors: IndexMap<String, MotorChannels>) -> OrderSession {
        OrderSession {
            order_id: "order".to_string(),
            start_time: 0.0,
            end_time: 10.0,
            video_filename: "order.mp4".to_string(),
            motors,
            extra_weight_points: Vec::new(),
        }
    }

    #[test]
    fn projects_samples_exactly_without_resampling() {
        let mut motors = IndexMap::new();
        motors.insert(
            "truck".to_string(),
            motor_with_velocity(&[(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]),
        );

        let charts = projector().project(&session_with(motors));

        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind, ChartKind::Velocity);
        assert_eq!(
            charts[0].series[0].samples,
            SeriesSamples::Numeric(vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)])
        );
    }

    #[test]
    fn zero_weight_data_yields_zero_weight_charts() {
        let mut motors = IndexMap::new();
        motors.insert(
            "truck".to_string(),
            motor_with_velocity(&[(0.0, 1.0), (1.0, 2.0)]),
        );

        let charts = projector().project(&session_with(motors));

        assert!(charts.iter().all(|chart| chart.kind != ChartKind::Weight));
        // The velocity chart renders unaffected.
        assert!(charts.iter().any(|chart| chart.kind == ChartKind::Velocity));
    }

    #[test]
    fn weight_chart_carries_extra_points() {
        let mut motors = IndexMap::new();
        motors.insert(
            "screen".to_string(),
            MotorChannels {
                velocity: None,
                position: None,
                state: None,
                weight: Some(numeric_channel(&[(0.0, 100.0), (1.0, 130.0)])),
            },
        );
        let mut session = session_with(motors);
        session.extra_weight_points = vec![ExtraPoint {
            name: "Sauce 1".to_string(),
            time: 0.4,
            value: 12.5,
        }];

        let charts = projector().project(&session);
        let weight = charts
            .iter()
            .find(|chart| chart.kind == ChartKind::Weight)
            .unwrap();

        assert_eq!(weight.extra_points.len(), 1);
        assert_eq!(weight.extra_points[0].name, "Sauce 1");
        // Extra points never appear on other charts.
        assert!(charts
            .iter()
            .filter(|chart| chart.kind != ChartKind::Weight)
            .all(|chart| chart.extra_points.is_empty()));
    }

    #[test]
    fn drops_skewed_channels_but_keeps_the_rest() {
        let mut motors = IndexMap::new();
        motors.insert(
            "truck".to_string(),
            MotorChannels {
                velocity: Some(RawChannel {
                    time: vec![0.0, 1.0],
                    value: ChannelValues::Numeric(vec![1.0]),
                }),
                position: None,
                state: None,
                weight: None,
            },
        );
        motors.insert(
            "screen".to_string(),
            motor_with_velocity(&[(0.0, 5.0), (1.0, 6.0)]),
        );

        let charts = projector().project(&session_with(motors));

        assert_eq!(charts.len(), 1);
        let names = charts[0].series_names();
        assert!(names.contains("screen"));
        assert!(!names.contains("truck"));
    }

    #[test]
    fn categorical_series_capture_full_category_history() {
        let mut motors = IndexMap::new();
        motors.insert(
            "truck".to_string(),
            MotorChannels {
                velocity: None,
                position: None,
                state: Some(RawChannel {
                    time: vec![0.0, 3.0, 7.0, 9.0],
                    value: ChannelValues::Categorical(vec![
                        "idle".to_string(),
                        "moving".to_string(),
                        "error".to_string(),
                        "idle".to_string(),
                    ]),
                }),
                weight: None,
            },
        );

        let charts = projector().project(&session_with(motors));
        let state = &charts[0].series[0];

        let expected: Vec<&str> = vec!["idle", "moving", "error"];
        let got: Vec<&str> = state.categories.iter().map(String::as_str).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn palette_is_deterministic_with_fallback() {
        let palette = Palette::default();
        assert_eq!(palette.color_for("truck"), palette.color_for("truck"));
        assert_eq!(palette.color_for("mystery"), FALLBACK_COLOR);

        let mut overrides = IndexMap::new();
        overrides.insert("mystery".to_string(), "#123456".to_string());
        let palette = Palette::with_overrides(overrides);
        assert_eq!(palette.color_for("mystery"), "#123456");
    }

    #[test]
    fn empty_session_projects_no_charts() {
        let charts = projector().project(&session_with(IndexMap::new()));
        assert!(charts.is_empty());
    }
}
