//! The room map page.
//!
//! The plot is drawn by Plotly in the browser from figure data rendered into
//! the page. Clients added through the form are placed by `/v1/locate` and
//! only live in the open page.

use actix_web::{get, web};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;
use sqlx::MySqlPool;

use crate::{
    db,
    error::ApiError,
    locate::{self, Placement},
    model::Snapshot,
    plot::{self, Layout, Palette, Trace},
};

const PLOTLY_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const SCRIPT: &str = r#"
const figure = JSON.parse(document.getElementById("figure").textContent);
Plotly.newPlot("plot", figure.data, figure.layout);

document.getElementById("client").addEventListener("submit", async (event) => {
  event.preventDefault();
  let response;
  try {
    response = await fetch("/v1/locate", {
      method: "POST",
      body: new URLSearchParams(new FormData(event.target)),
    });
  } catch (err) {
    alert("Could not reach the server");
    return;
  }
  let body;
  try {
    body = await response.json();
  } catch (err) {
    alert(response.statusText || "Unexpected response from the server");
    return;
  }
  if (!response.ok) {
    alert(body.error ? body.error.message : response.statusText);
    return;
  }
  Plotly.addTraces("plot", body.trace);
});
"#;

#[derive(Serialize)]
struct Figure {
    data: Vec<Trace>,
    layout: Layout,
}

#[get("/")]
pub async fn service(
    pool: web::Data<MySqlPool>,
    palette: web::Data<Palette>,
) -> Result<Markup, ApiError> {
    let pool = pool.into_inner();
    let snapshot = db::snapshot(&pool).await?;
    let placements = locate::place_devices(&snapshot);
    render(&snapshot, &placements, &palette)
}

pub fn render(
    snapshot: &Snapshot,
    placements: &[(usize, Placement)],
    palette: &Palette,
) -> Result<Markup, ApiError> {
    let figure = Figure {
        data: plot::traces(&snapshot.measurements, placements, palette),
        layout: Layout::fit(&snapshot.measurements),
    };
    let figure = script_json(&figure)?;

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Room map" }
                script src=(PLOTLY_URL) {}
            }
            body {
                div #plot {}
                form #client {
                    label for="mac" { "Mac" }
                    input #mac name="mac";
                    label for="measure1" { "M1" }
                    input #measure1 name="measure1";
                    label for="measure2" { "M2" }
                    input #measure2 name="measure2";
                    label for="measure3" { "M3" }
                    input #measure3 name="measure3";
                    button type="submit" { "Submit" }
                }
                table #clients {
                    thead {
                        tr {
                            th { "Client" }
                            th { "Measurement" }
                            th { "x" }
                            th { "y" }
                            th { "Distance" }
                        }
                    }
                    tbody {
                        @for (i, placement) in placements {
                            tr {
                                td style=(format!("color: {}", palette.device(*i).as_ref())) {
                                    (placement.label)
                                }
                                td { (placement.measurement.id) }
                                td { (placement.measurement.x) }
                                td { (placement.measurement.y) }
                                td { (format!("{:.2}", placement.distance)) }
                            }
                        }
                    }
                }
                p { "Data as of " (snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()) }
                script #figure type="application/json" { (PreEscaped(figure)) }
                script { (PreEscaped(SCRIPT)) }
            }
        }
    })
}

/// JSON that is safe to place inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace("</", "<\\/")
        .replace("<!--", "<\\u0021--"))
}
