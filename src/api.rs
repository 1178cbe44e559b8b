use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;

use crate::{
    db,
    error::ApiError,
    locate::{self, ClientForm, Placement},
    plot::{Palette, Trace},
};

/// Everything the store knows, in one payload.
#[get("/get-db")]
pub async fn snapshot_service(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let pool = pool.into_inner();
    let snapshot = db::snapshot(&pool).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Debug, Serialize)]
struct LocateResponse {
    placement: Placement,
    trace: Trace,
}

/// Places a client submitted through the page form. Nothing is stored; the
/// page keeps the returned trace until it is reloaded.
#[post("/v1/locate")]
pub async fn locate_service(
    form: web::Form<ClientForm>,
    pool: web::Data<MySqlPool>,
    palette: web::Data<Palette>,
) -> Result<HttpResponse, ApiError> {
    let (label, readings) = form.parse()?;
    let pool = pool.into_inner();

    let snapshot = db::snapshot(&pool).await?;
    let placement = locate::place(&snapshot, &label, &readings)?;
    info!(
        label = %placement.label,
        measurement = placement.measurement.id,
        distance = placement.distance,
        "placed client"
    );

    let trace = Trace::client(&placement, palette.submission);
    Ok(HttpResponse::Ok().json(LocateResponse { placement, trace }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use sqlx::mysql::MySqlPoolOptions;

    use super::*;
    use crate::plot::Color;

    // never connects: every request below is rejected before the store is read
    fn lazy_pool() -> MySqlPool {
        MySqlPoolOptions::new()
            .connect_lazy("mysql://roomfix@localhost/roomfix")
            .unwrap()
    }

    async fn post_form(fields: &[(&str, &str)]) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(Palette {
                    devices: vec![Color::Red],
                    submission: Color::Black,
                }))
                .service(locate_service),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/locate")
            .set_form(fields)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn blank_field() {
        let (status, body) = post_form(&[
            ("mac", "aa:bb:cc:dd:ee:ff"),
            ("measure1", "-40"),
            ("measure2", ""),
            ("measure3", "-70"),
        ])
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please make sure all the data fields are filled"
        );
    }

    #[actix_web::test]
    async fn absent_fields() {
        let (status, body) = post_form(&[("mac", "phone")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 400);
    }

    #[actix_web::test]
    async fn reading_not_a_number() {
        let (status, body) = post_form(&[
            ("mac", "phone"),
            ("measure1", "-40"),
            ("measure2", "-61"),
            ("measure3", "loud"),
        ])
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "measure3 must be a number, got \"loud\""
        );
    }
}
