use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ForecastError;
use crate::models::{DailyConsumption, ParticipationShare, Prediction, TemperatureConsumption};
use crate::reports;
use crate::startup::AppContext;

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub date: Option<String>,
}

pub fn create_router(context: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/predict", get(predict))
        .route("/consumo_diario", get(daily_consumption))
        .route("/temp_vs_consumo", get(temperature_vs_consumption))
        .route("/participacion_vecindario", get(participation_share))
        .with_state(context)
        .layer(cors)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn predict(
    State(context): State<AppContext>,
    params: Result<Query<PredictParams>, QueryRejection>,
) -> Result<Json<Prediction>, ForecastError> {
    let Query(params) = params.map_err(|e| ForecastError::Validation(e.body_text()))?;
    let date = params
        .date
        .ok_or_else(|| ForecastError::Validation("missing `date` query parameter".into()))?;
    let prediction = context.engine.predict(&date).await?;
    Ok(Json(prediction))
}

async fn daily_consumption(
    State(context): State<AppContext>,
) -> Result<Json<Vec<DailyConsumption>>, ForecastError> {
    let history = context.history.read_all_daily_records().await?;
    Ok(Json(reports::daily_consumption(&history)))
}

async fn temperature_vs_consumption(
    State(context): State<AppContext>,
) -> Result<Json<Vec<TemperatureConsumption>>, ForecastError> {
    let history = context.history.read_all_daily_records().await?;
    Ok(Json(reports::temperature_vs_consumption(&history)))
}

async fn participation_share(
    State(context): State<AppContext>,
) -> Result<Json<ParticipationShare>, ForecastError> {
    let history = context.history.read_all_daily_records().await?;
    Ok(Json(reports::participation_share(&history)))
}
