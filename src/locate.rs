//! Placing devices on the measurement grid.

use std::str::FromStr;

use mac_address::MacAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    matcher::{self, MatchError},
    model::{Measurement, Snapshot},
};

/// A device matched to the measurement spot with the most similar readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub label: String,
    pub measurement: Measurement,
    pub distance: f64,
}

pub fn place(snapshot: &Snapshot, label: &str, readings: &[f64]) -> Result<Placement, MatchError> {
    let nearest = matcher::nearest(readings, &snapshot.signals)?;
    // signals are aligned with measurements when the snapshot is loaded
    let measurement = snapshot.measurements[nearest.index];

    Ok(Placement {
        label: display_label(label),
        measurement,
        distance: nearest.distance,
    })
}

/// Places every known device, paired with its index in `snapshot.devices`.
/// Devices whose readings can't be matched are logged and left out.
pub fn place_devices(snapshot: &Snapshot) -> Vec<(usize, Placement)> {
    snapshot
        .devices
        .iter()
        .enumerate()
        .filter_map(|(i, device)| match place(snapshot, &device.mac, &device.signals) {
            Ok(placement) => Some((i, placement)),
            Err(err) => {
                warn!(mac = %device.mac, "skipping device: {err}");
                None
            }
        })
        .collect()
}

/// Shows hardware addresses in one canonical form; anything else is kept as typed.
pub fn display_label(label: &str) -> String {
    let label = label.trim();
    match MacAddress::from_str(label) {
        Ok(mac) => mac.to_string(),
        Err(_) => label.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Please make sure all the data fields are filled")]
    MissingField,
    #[error("{field} must be a number, got {value:?}")]
    InvalidReading { field: &'static str, value: String },
}

/// Fields of the "add client" form. Every field is required.
#[derive(Debug, Default, Deserialize)]
pub struct ClientForm {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub measure1: String,
    #[serde(default)]
    pub measure2: String,
    #[serde(default)]
    pub measure3: String,
}

impl ClientForm {
    pub fn parse(&self) -> Result<(String, [f64; 3]), FormError> {
        let fields = [
            ("mac", &self.mac),
            ("measure1", &self.measure1),
            ("measure2", &self.measure2),
            ("measure3", &self.measure3),
        ];
        if fields.iter().any(|(_, value)| value.trim().is_empty()) {
            return Err(FormError::MissingField);
        }

        let mut readings = [0.0; 3];
        for (reading, &(field, value)) in readings.iter_mut().zip(&fields[1..]) {
            *reading = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| FormError::InvalidReading {
                    field,
                    value: value.to_string(),
                })?;
        }

        Ok((self.mac.trim().to_string(), readings))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::Device;

    fn snapshot() -> Snapshot {
        Snapshot {
            measurements: vec![
                Measurement { id: 1, x: 0.0, y: 0.0 },
                Measurement { id: 2, x: 5.0, y: 0.0 },
                Measurement { id: 3, x: 5.0, y: 5.0 },
            ],
            signals: vec![
                vec![-40.0, -70.0, -80.0],
                vec![-70.0, -40.0, -80.0],
                vec![-80.0, -70.0, -40.0],
            ],
            devices: vec![
                Device {
                    mac: "aa-bb-cc-dd-ee-01".to_string(),
                    signals: vec![-72.0, -42.0, -79.0],
                },
                Device {
                    mac: "broken".to_string(),
                    signals: vec![-50.0],
                },
                Device {
                    mac: "aa:bb:cc:dd:ee:02".to_string(),
                    signals: vec![-81.0, -69.0, -45.0],
                },
            ],
            fetched_at: Utc::now(),
        }
    }

    fn form(mac: &str, m1: &str, m2: &str, m3: &str) -> ClientForm {
        ClientForm {
            mac: mac.to_string(),
            measure1: m1.to_string(),
            measure2: m2.to_string(),
            measure3: m3.to_string(),
        }
    }

    #[test]
    fn places_at_nearest_measurement() {
        let placement = place(&snapshot(), "phone", &[-41.0, -69.0, -81.0]).unwrap();
        assert_eq!(placement.label, "phone");
        assert_eq!(placement.measurement.id, 1);
        assert!((placement.distance - 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn known_devices_skip_failures() {
        let placements = place_devices(&snapshot());
        let placed: Vec<_> = placements
            .iter()
            .map(|(i, p)| (*i, p.label.as_str(), p.measurement.id))
            .collect();
        assert_eq!(
            placed,
            [(0, "AA:BB:CC:DD:EE:01", 2), (2, "AA:BB:CC:DD:EE:02", 3)]
        );
    }

    #[test]
    fn empty_store() {
        let snapshot = Snapshot {
            measurements: Vec::new(),
            signals: Vec::new(),
            devices: Vec::new(),
            fetched_at: Utc::now(),
        };
        assert_eq!(
            place(&snapshot, "x", &[1.0, 2.0, 3.0]),
            Err(MatchError::NoCandidates)
        );
        assert!(place_devices(&snapshot).is_empty());
    }

    #[test]
    fn labels() {
        assert_eq!(display_label("aa:bb:cc:dd:ee:ff"), "AA:BB:CC:DD:EE:FF");
        assert_eq!(display_label(" laptop "), "laptop");
    }

    #[test]
    fn form_requires_every_field() {
        assert_eq!(form("", "1", "2", "3").parse(), Err(FormError::MissingField));
        assert_eq!(form("a", "1", "  ", "3").parse(), Err(FormError::MissingField));
        assert_eq!(
            ClientForm::default().parse(),
            Err(FormError::MissingField)
        );
    }

    #[test]
    fn form_readings_must_be_numbers() {
        assert_eq!(
            form("a", "-40", "x", "3").parse(),
            Err(FormError::InvalidReading {
                field: "measure2",
                value: "x".to_string()
            })
        );
        assert!(matches!(
            form("a", "NaN", "1", "3").parse(),
            Err(FormError::InvalidReading {
                field: "measure1",
                ..
            })
        ));
    }

    #[test]
    fn form_parses() {
        assert_eq!(
            form(" phone ", "-40", " -61.5 ", "-70").parse(),
            Ok(("phone".to_string(), [-40.0, -61.5, -70.0]))
        );
    }
}
