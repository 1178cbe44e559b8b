//! Plotly figure data for the room plot.
//!
//! Only the handful of trace and layout attributes the page uses are modelled.

use geo::{BoundingRect, MultiPoint, Point};
use serde::{Deserialize, Serialize};

use crate::{locate::Placement, model::Measurement};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Black,
    Blue,
    Gray,
    Green,
    Orange,
    Purple,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "markers+text")]
    MarkersText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: Mode,
    pub marker: Marker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<&'static str>,
}

impl Trace {
    /// All measurement spots as one green marker series.
    pub fn measurements(measurements: &[Measurement]) -> Self {
        Self {
            name: "Measurements".to_string(),
            x: measurements.iter().map(|m| m.x).collect(),
            y: measurements.iter().map(|m| m.y).collect(),
            text: Vec::new(),
            kind: "scatter",
            mode: Mode::Markers,
            marker: Marker {
                color: Color::Green,
            },
            textposition: None,
        }
    }

    /// A single labelled marker at the spot a client was matched to.
    pub fn client(placement: &Placement, color: Color) -> Self {
        let name = format!("Client {}", placement.label);
        Self {
            x: vec![placement.measurement.x],
            y: vec![placement.measurement.y],
            text: vec![name.clone()],
            name,
            kind: "scatter",
            mode: Mode::MarkersText,
            marker: Marker { color },
            textposition: Some("bottom"),
        }
    }
}

/// Marker colours for clients.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub devices: Vec<Color>,
    pub submission: Color,
}

impl Palette {
    /// Colour of the `i`th known device, wrapping around the palette.
    pub fn device(&self, i: usize) -> Color {
        match self.devices.as_slice() {
            [] => self.submission,
            colors => colors[i % colors.len()],
        }
    }
}

/// Measurement trace followed by one trace per known device placement.
///
/// Placements carry the device's index in the full device list, so a device
/// keeps its colour when an earlier one could not be placed.
pub fn traces(
    measurements: &[Measurement],
    placements: &[(usize, Placement)],
    palette: &Palette,
) -> Vec<Trace> {
    let mut traces = vec![Trace::measurements(measurements)];
    for (i, placement) in placements {
        traces.push(Trace::client(placement, palette.device(*i)));
    }
    traces
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Layout {
    /// Fixes both axes to the measurements' bounding box plus a margin, so
    /// labels under edge markers stay on screen. Plotly autoranges when there
    /// are no measurements.
    pub fn fit(measurements: &[Measurement]) -> Self {
        let points: MultiPoint = measurements.iter().map(|m| Point::new(m.x, m.y)).collect();
        let Some(rect) = points.bounding_rect() else {
            return Self {
                xaxis: Axis::default(),
                yaxis: Axis::default(),
            };
        };

        let pad_x = (rect.width() / 10.0).max(1.0);
        let pad_y = (rect.height() / 10.0).max(1.0);
        Self {
            xaxis: Axis {
                range: Some([rect.min().x - pad_x, rect.max().x + pad_x]),
            },
            yaxis: Axis {
                range: Some([rect.min().y - pad_y, rect.max().y + pad_y]),
            },
        }
    }
}
