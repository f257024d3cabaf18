use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::configuration::Settings;
use crate::error::ForecastError;
use crate::forecast::ForecastEngine;
use crate::history::{HistoryStore, PostgrestHistoryStore};
use crate::routes::create_router;
use crate::weather::{TemperatureSource, WeatherClient};

/// Process-wide handles, built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppContext {
    pub engine: ForecastEngine,
    pub history: Arc<dyn HistoryStore>,
}

impl AppContext {
    pub fn new(weather: Arc<dyn TemperatureSource>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            engine: ForecastEngine::new(weather, history.clone()),
            history,
        }
    }

    pub fn build(settings: &Settings) -> Result<Self, ForecastError> {
        let weather = WeatherClient::new(&settings.weather)?;
        let history = PostgrestHistoryStore::new(&settings.store);
        info!(
            "Forecasting at ({}, {}) from collection {}",
            settings.weather.latitude, settings.weather.longitude, settings.store.collection
        );
        Ok(Self::new(Arc::new(weather), Arc::new(history)))
    }
}

pub async fn run(listener: TcpListener, context: AppContext) -> std::io::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(context)).await
}
