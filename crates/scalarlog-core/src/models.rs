//! Data models for scalarlog: the scalar observation and its event record.

/// Version marker written as the first record of every event file.
pub const FILE_VERSION: &str = "brain.Event:2";

/// Event record protobuf types.
///
/// Hand-written types matching the subset of `tensorflow/core/util/event.proto`
/// and `summary.proto` that scalar logging needs. The `oneof` fields of the
/// upstream schema are expressed as optional fields, which encode identically
/// as long as at most one member is set.
pub mod proto {
    /// One record in an event file.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Event {
        /// Seconds since the Unix epoch.
        #[prost(double, tag = "1")]
        pub wall_time: f64,
        #[prost(int64, tag = "2")]
        pub step: i64,
        /// Only set on the leading metadata record.
        #[prost(string, optional, tag = "3")]
        pub file_version: Option<String>,
        #[prost(message, optional, tag = "5")]
        pub summary: Option<Summary>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Summary {
        #[prost(message, repeated, tag = "1")]
        pub value: Vec<Value>,
    }

    /// A tagged summary value. Only the scalar member is modelled.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Value {
        #[prost(string, tag = "1")]
        pub tag: String,
        #[prost(float, optional, tag = "2")]
        pub simple_value: Option<f32>,
    }
}

pub use proto::Event;

impl Event {
    /// The metadata record that opens an event file.
    pub fn version_record(wall_time: f64) -> Self {
        Self {
            wall_time,
            step: 0,
            file_version: Some(FILE_VERSION.to_string()),
            summary: None,
        }
    }

    /// Build an event carrying a single scalar.
    pub fn scalar(tag: impl Into<String>, value: f32, wall_time: f64, step: i64) -> Self {
        Self {
            wall_time,
            step,
            file_version: None,
            summary: Some(proto::Summary {
                value: vec![proto::Value {
                    tag: tag.into(),
                    simple_value: Some(value),
                }],
            }),
        }
    }

    /// Iterate over the `(tag, value)` scalars this event carries.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, f32)> {
        self.summary
            .iter()
            .flat_map(|s| s.value.iter())
            .filter_map(|v| v.simple_value.map(|x| (v.tag.as_str(), x)))
    }
}

/// A single scalar observation, alive only for the duration of a log call.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryValue {
    pub key: String,
    pub value: f64,
    /// Seconds since the Unix epoch.
    pub wall_time: f64,
    pub step: i64,
}

impl SummaryValue {
    pub fn new(key: impl Into<String>, value: f64, wall_time: f64, step: i64) -> Self {
        Self {
            key: key.into(),
            value,
            wall_time,
            step,
        }
    }

    /// Convert into the logical record format. The value is narrowed to
    /// `f32`, which is what `simple_value` holds on the wire.
    pub fn to_event(&self) -> Event {
        Event::scalar(self.key.clone(), self.value as f32, self.wall_time, self.step)
    }
}

impl From<&SummaryValue> for Event {
    fn from(v: &SummaryValue) -> Self {
        v.to_event()
    }
}
