//! CSV dump of where every known device was placed.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;

use crate::{
    db,
    locate::{self, Placement},
};

#[derive(Serialize)]
struct Record<'a> {
    mac: &'a str,
    measurement: i32,
    x: f64,
    y: f64,
    distance: f64,
}

pub async fn run(pool: &MySqlPool) -> Result<()> {
    let snapshot = db::snapshot(pool).await?;
    let placements = locate::place_devices(&snapshot);
    write(io::stdout().lock(), &placements)?;
    info!(
        placed = placements.len(),
        devices = snapshot.devices.len(),
        "exported placements"
    );
    Ok(())
}

fn write<W: Write>(writer: W, placements: &[(usize, Placement)]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (_, placement) in placements {
        csv.serialize(Record {
            mac: &placement.label,
            measurement: placement.measurement.id,
            x: placement.measurement.x,
            y: placement.measurement.y,
            distance: placement.distance,
        })?;
    }
    csv.flush()?;
    Ok(())
}
