//! Read access to the measurement store.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{query_as, MySqlPool};
use tracing::{debug, warn};

use crate::model::{Device, Measurement, Snapshot};

// numeric columns are widened with `+ 0e0` so integer or decimal columns
// still decode as DOUBLE
const MEASUREMENTS: &str =
    "select matavimas as id, x + 0e0 as x, y + 0e0 as y from matavimai order by matavimas";

const MEASUREMENT_READINGS: &str = "select matavimas, sensorius, stiprumas + 0e0 as stiprumas from stiprumai order by matavimas, sensorius";

const DEVICE_READINGS: &str = "select mac, sensorius, stiprumas + 0e0 as stiprumas from vartotojai order by mac, sensorius";

/// Runs the three store queries and assembles them into a [`Snapshot`].
pub async fn snapshot(pool: &MySqlPool) -> sqlx::Result<Snapshot> {
    let (measurements, readings, device_readings) = futures::try_join!(
        query_as::<_, Measurement>(MEASUREMENTS).fetch_all(pool),
        query_as::<_, (i32, i32, f64)>(MEASUREMENT_READINGS).fetch_all(pool),
        query_as::<_, (String, i32, f64)>(DEVICE_READINGS).fetch_all(pool),
    )?;

    let signals = align(&measurements, group(readings));
    let devices: Vec<Device> = group(device_readings)
        .into_iter()
        .map(|(mac, signals)| Device { mac, signals })
        .collect();

    debug!(
        measurements = measurements.len(),
        devices = devices.len(),
        "loaded snapshot"
    );

    Ok(Snapshot {
        measurements,
        signals,
        devices,
        fetched_at: Utc::now(),
    })
}

/// Collects `(key, sensor, strength)` rows into one vector per key, ordered by sensor.
fn group<K: Ord>(rows: impl IntoIterator<Item = (K, i32, f64)>) -> BTreeMap<K, Vec<f64>> {
    let mut by_key: BTreeMap<K, Vec<(i32, f64)>> = BTreeMap::new();
    for (key, sensor, strength) in rows {
        by_key.entry(key).or_default().push((sensor, strength));
    }

    by_key
        .into_iter()
        .map(|(key, mut readings)| {
            readings.sort_by_key(|(sensor, _)| *sensor);
            (key, readings.into_iter().map(|(_, s)| s).collect())
        })
        .collect()
}

/// Lines grouped readings up with `measurements`, so index `i` of the result
/// belongs to `measurements[i]`.
fn align(measurements: &[Measurement], mut grouped: BTreeMap<i32, Vec<f64>>) -> Vec<Vec<f64>> {
    let signals = measurements
        .iter()
        .map(|m| {
            grouped.remove(&m.id).unwrap_or_else(|| {
                warn!(measurement = m.id, "measurement has no readings");
                Vec::new()
            })
        })
        .collect();

    for id in grouped.keys() {
        warn!(measurement = id, "dropping readings for unknown measurement");
    }

    signals
}
