//! HTTP handler functions for the heritage map API.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use heritage_map_europeana::ErrorKind;
use heritage_map_explorer::{ExploreError, Exploration};
use heritage_map_export::{file_stem, layers, table};
use heritage_map_server_models::{ApiError, ApiHealth, ExploreQueryParams};

use crate::AppState;

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        country_count: state.explorer.index().len(),
    })
}

/// `GET /api/explore`
///
/// Records, per-country counts without geometry, per-location counts, and
/// the map centre.
pub async fn explore(
    state: web::Data<AppState>,
    params: web::Query<ExploreQueryParams>,
) -> HttpResponse {
    match run_explore(&state, &params).await {
        Ok(exploration) => HttpResponse::Ok().json(exploration.summary()),
        Err(response) => response,
    }
}

/// `GET /api/explore/points.geojson`
///
/// One point feature per record with coordinates.
pub async fn points_layer(
    state: web::Data<AppState>,
    params: web::Query<ExploreQueryParams>,
) -> HttpResponse {
    match run_explore(&state, &params).await {
        Ok(exploration) => geojson_response(&layers::points_layer(&exploration.records)),
        Err(response) => response,
    }
}

/// `GET /api/explore/countries.geojson`
///
/// Every reference country with its `objectCount`.
pub async fn countries_layer(
    state: web::Data<AppState>,
    params: web::Query<ExploreQueryParams>,
) -> HttpResponse {
    match run_explore(&state, &params).await {
        Ok(exploration) => geojson_response(&layers::countries_layer(&exploration.countries)),
        Err(response) => response,
    }
}

/// `GET /api/explore.csv`
///
/// The full record table as a `<provider>_data.csv` attachment.
pub async fn records_csv(
    state: web::Data<AppState>,
    params: web::Query<ExploreQueryParams>,
) -> HttpResponse {
    let exploration = match run_explore(&state, &params).await {
        Ok(exploration) => exploration,
        Err(response) => return response,
    };

    match table::records_to_csv(&exploration.records) {
        Ok(body) => HttpResponse::Ok()
            .content_type(CSV_CONTENT_TYPE)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(format!(
                    "{}{}",
                    file_stem(&exploration.provider_name),
                    table::CSV_SUFFIX
                ))],
            })
            .body(body),
        Err(e) => {
            log::error!("Failed to render CSV: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to render CSV"))
        }
    }
}

/// Fetches and attributes the requested provider, or builds the error
/// response for the failure.
async fn run_explore(
    state: &AppState,
    params: &ExploreQueryParams,
) -> Result<Exploration, HttpResponse> {
    let provider = params.provider.as_deref().unwrap_or_default();
    let rows = params.rows.unwrap_or(state.default_rows);

    state
        .explorer
        .explore(provider, rows)
        .await
        .map_err(|e| error_response(&e))
}

fn geojson_response(layer: &geojson::FeatureCollection) -> HttpResponse {
    match serde_json::to_string(layer) {
        Ok(body) => HttpResponse::Ok()
            .content_type(GEOJSON_CONTENT_TYPE)
            .body(body),
        Err(e) => {
            log::error!("Failed to serialize layer: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to serialize layer"))
        }
    }
}

/// Bad input is the caller's fault (400); an upstream failure is a bad
/// gateway (502); anything else is ours (500).
fn error_response(err: &ExploreError) -> HttpResponse {
    let body = ApiError::new(err.to_string());

    match err {
        ExploreError::Europeana(e) => match e.kind() {
            ErrorKind::Validation => {
                log::debug!("Rejected explore request: {e}");
                HttpResponse::BadRequest().json(body)
            }
            ErrorKind::Fetch => {
                log::warn!("Europeana fetch failed: {e}");
                HttpResponse::BadGateway().json(body)
            }
            ErrorKind::Configuration => {
                log::error!("Europeana client misconfigured: {e}");
                HttpResponse::InternalServerError().json(body)
            }
        },
        ExploreError::Spatial(_) | ExploreError::Export(_) | ExploreError::Settings { .. } => {
            log::error!("Explore failed: {err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use geo::{MultiPolygon, Rect};
    use heritage_map_europeana::{ApiConfig, EuropeanaClient};
    use heritage_map_explorer::Explorer;
    use heritage_map_spatial::{CountryIndex, CountryPolygon};

    use super::*;
    use crate::configure;

    fn state() -> web::Data<AppState> {
        let client = EuropeanaClient::new(
            ApiConfig::new("key")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout_secs(5),
        )
        .unwrap();
        let france = CountryPolygon::new(
            "France",
            MultiPolygon(vec![Rect::new((-5.0, 42.0), (8.0, 51.0)).to_polygon()]),
        );

        web::Data::new(AppState {
            explorer: Explorer::new(client, CountryIndex::new(vec![france])),
            default_rows: 10,
        })
    }

    #[actix_web::test]
    async fn health_reports_country_count() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["countryCount"], 1);
    }

    #[actix_web::test]
    async fn empty_provider_is_bad_request() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        for uri in [
            "/api/explore",
            "/api/explore?provider=%20%20",
            "/api/explore.csv?provider=",
            "/api/explore/points.geojson",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn zero_rows_is_bad_request() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/explore?provider=Louvre&rows=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unreachable_api_is_bad_gateway() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/explore?provider=Louvre")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("HTTP error"));
    }

    #[::core::prelude::v1::test]
    fn missing_key_maps_to_server_error() {
        let err = ExploreError::Europeana(heritage_map_europeana::EuropeanaError::MissingApiKey);
        assert_eq!(
            error_response(&err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
