use crate::config::AppConfig;
use crate::lookup::{self, LookupError};
use crate::types::{Assessment, SamplePoint};
use anyhow::{ensure, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub samples: Vec<SamplePoint>,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct AssessParams {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub advisory: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub async fn start_server(config: AppConfig, samples: Vec<SamplePoint>) -> Result<()> {
    // The loader already rejects empty files; this guards direct callers.
    ensure!(
        !samples.is_empty(),
        "refusing to serve an empty contamination dataset - check [input] data_csv"
    );

    let port = config.server.port;
    let tile_service = ServeDir::new(&config.output.tile_dir);

    let state = Arc::new(AppState { samples, config });

    let app = Router::new()
        .route("/api/assess", get(assess_handler))
        .route("/api/heatmap", get(heatmap_handler))
        .route("/api/map", get(map_handler))
        .nest_service("/tiles", tile_service)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assess the query location against the dataset.
///
/// Both `lat` and `lon` must be present; until the user supplies a
/// location the front-end polls with neither, and the answer is a
/// JSON `null` so it renders nothing. Out-of-range coordinates are a
/// 400 rather than a silently nonsensical match.
async fn assess_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AssessParams>,
) -> Result<Json<Option<AssessResponse>>, ApiError> {
    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Ok(Json(None)),
    };

    match lookup::assess(lat, lon, &state.samples) {
        Ok(assessment) => {
            let advisory = assessment.category.advisory();
            Ok(Json(Some(AssessResponse {
                assessment,
                advisory,
            })))
        }
        Err(err @ LookupError::InvalidCoordinate { .. }) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )),
    }
}

/// The (lat, lon, level) triples the client-side heat layer renders.
async fn heatmap_handler(State(state): State<Arc<AppState>>) -> Json<Vec<[f64; 3]>> {
    Json(
        state
            .samples
            .iter()
            .map(|s| [s.latitude, s.longitude, s.contamination_level])
            .collect(),
    )
}

#[derive(Serialize)]
struct MapInfo {
    center_lat: f64,
    center_lon: f64,
    default_zoom: u8,
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Json<MapInfo> {
    Json(MapInfo {
        center_lat: state.config.map.center_lat,
        center_lon: state.config.map.center_lon,
        default_zoom: state.config.map.default_zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        HeatmapConfig, InputConfig, MapConfig, OutputConfig, ServerConfig,
    };

    fn test_state() -> Arc<AppState> {
        let config = AppConfig {
            input: InputConfig {
                data_csv: "data/readings.csv".into(),
            },
            map: MapConfig {
                center_lat: 12.9716,
                center_lon: 77.5946,
                default_zoom: 12,
            },
            heatmap: HeatmapConfig::default(),
            output: OutputConfig {
                tile_dir: "tiles".into(),
                min_zoom: 11,
                max_zoom: 14,
            },
            server: ServerConfig { port: 0 },
        };
        let samples = vec![
            SamplePoint {
                latitude: 12.9716,
                longitude: 77.5946,
                contamination_level: 8.0,
            },
            SamplePoint {
                latitude: 12.9800,
                longitude: 77.6000,
                contamination_level: 3.0,
            },
        ];
        Arc::new(AppState { samples, config })
    }

    #[tokio::test]
    async fn missing_location_is_a_no_op() {
        let response = assess_handler(
            State(test_state()),
            Query(AssessParams {
                lat: None,
                lon: Some(77.59),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.is_none());
    }

    #[tokio::test]
    async fn assess_returns_nearest_reading() {
        let response = assess_handler(
            State(test_state()),
            Query(AssessParams {
                lat: Some(12.9716),
                lon: Some(77.5946),
            }),
        )
        .await
        .unwrap();
        let body = response.0.expect("assessment present");
        assert_eq!(body.assessment.contamination_level, 8.0);
        assert_eq!(body.assessment.percentage, 80.0);
        assert!(body.advisory.starts_with("High Risk"));
    }

    #[tokio::test]
    async fn out_of_range_coordinate_is_bad_request() {
        let err = assess_handler(
            State(test_state()),
            Query(AssessParams {
                lat: Some(95.0),
                lon: Some(77.59),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn heatmap_exposes_all_readings() {
        let triples = heatmap_handler(State(test_state())).await;
        assert_eq!(triples.0.len(), 2);
        assert_eq!(triples.0[0], [12.9716, 77.5946, 8.0]);
    }
}
