use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ReplayError, Result, TimeValue};

/// Raw values carried by a single channel. The wire format ships either a
/// numeric or a categorical array; which one a channel uses is fixed for the
/// whole channel, never per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelValues {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ChannelValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single `{time, value}` channel as delivered by the order data provider.
/// Times are offsets in seconds from the session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChannel {
    pub time: Vec<TimeValue>,
    pub value: ChannelValues,
}

impl RawChannel {
    /// Verifies that the time and value arrays line up. A skewed channel is
    /// unusable as a whole; callers drop it and keep the rest of the group.
    pub fn check_shape(&self, name: &str) -> Result<()> {
        if self.time.len() == self.value.len() {
            Ok(())
        } else {
            Err(ReplayError::ChannelShape {
                name: name.to_string(),
                times: self.time.len(),
                values: self.value.len(),
            })
        }
    }

    /// Sample times are a producer-side guarantee. The check exists so a
    /// misbehaving producer is visible in the logs; samples are never
    /// reordered on this side.
    pub fn is_time_ordered(&self) -> bool {
        self.time.windows(2).all(|pair| pair[0] <= pair[1])
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Channels recorded for one motor group (e.g. `truck`, `screen`). Every
/// field is optional: a missing channel means the corresponding chart simply
/// does not receive a series for this motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorChannels {
    #[serde(default)]
    pub velocity: Option<RawChannel>,
    #[serde(default)]
    pub position: Option<RawChannel>,
    #[serde(default)]
    pub state: Option<RawChannel>,
    #[serde(default)]
    pub weight: Option<RawChannel>,
}

/// Out-of-band annotated overlay sample, rendered separately from the
/// continuous series (e.g. per-portion sauce weights on the Weight chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPoint {
    pub name: String,
    pub time: TimeValue,
    pub value: f64,
}

/// Aggregated telemetry for one order: a video reference plus the per-motor
/// channel groups. A session is replaced whole on the next successful fetch
/// and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSession {
    pub order_id: String,
    /// Absolute UTC start of the order, in seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Absolute UTC end of the order, in seconds.
    #[serde(default)]
    pub end_time: f64,
    pub video_filename: String,
    #[serde(default)]
    pub motors: IndexMap<String, MotorChannels>,
    #[serde(default)]
    pub extra_weight_points: Vec<ExtraPoint>,
}

impl OrderSession {
    /// Deserializes a session from a JSON string.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Deserializes a session from any reader, e.g. an open file.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a session from a pre-processed JSON file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn id(&self) -> &str {
        &self.order_id
    }

    /// Order duration in seconds, zero when the markers are missing or skewed.
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}
