//! Temperature-adjusted projection of historical average consumption.

use log::debug;
use std::sync::Arc;

use crate::error::ForecastError;
use crate::history::HistoryStore;
use crate::models::{
    round2, Alert, DailyRecord, Neighborhood, NeighborhoodPrediction, Prediction,
};
use crate::weather::{parse_target_date, TemperatureSource};

/// Temperature at which the projection equals the historical average.
pub const REFERENCE_TEMPERATURE: f64 = 25.0;
/// Relative consumption change per degree away from the reference.
pub const SENSITIVITY_PER_DEGREE: f64 = 0.02;

pub fn temperature_factor(temperature: f64) -> f64 {
    1.0 + (temperature - REFERENCE_TEMPERATURE) * SENSITIVITY_PER_DEGREE
}

fn project_neighborhood(
    history: &[DailyRecord],
    neighborhood: Neighborhood,
    factor: f64,
) -> NeighborhoodPrediction {
    let count = history.len() as f64;
    let (liters, population) = history
        .iter()
        .map(|r| r.sample(neighborhood))
        .fold((0.0, 0.0), |(l, p), s| (l + s.total_liters, p + s.population));
    let avg_total = liters / count;
    let avg_population = population / count;
    debug!(
        "{}: {:.2} L/day over {} days, factor {:.3}",
        neighborhood.as_str(),
        avg_total,
        history.len(),
        factor
    );

    // The forecast population is the historical baseline itself, so there is
    // no population scaling on top of the temperature factor.
    let (predicted, alert) = if avg_total == 0.0 {
        (0.0, Alert::Normal)
    } else {
        let predicted = avg_total * factor;
        (predicted, Alert::from_ratio(predicted / avg_total))
    };

    NeighborhoodPrediction {
        predicted_liters: round2(predicted),
        alert,
        population: avg_population.trunc() as i64,
    }
}

/// Pure part of the forecast: projects `history` for a day at `temperature`.
pub fn project(
    date: &str,
    temperature: f64,
    history: &[DailyRecord],
) -> Result<Prediction, ForecastError> {
    if history.is_empty() {
        return Err(ForecastError::InsufficientData(
            "no historical consumption records".into(),
        ));
    }
    let factor = temperature_factor(temperature);

    Ok(Prediction {
        date: date.to_string(),
        temperature,
        el_dorado: project_neighborhood(history, Neighborhood::ElDorado, factor),
        manzanares: project_neighborhood(history, Neighborhood::Manzanares, factor),
    })
}

#[derive(Clone)]
pub struct ForecastEngine {
    weather: Arc<dyn TemperatureSource>,
    history: Arc<dyn HistoryStore>,
}

impl ForecastEngine {
    pub fn new(weather: Arc<dyn TemperatureSource>, history: Arc<dyn HistoryStore>) -> Self {
        Self { weather, history }
    }

    /// Fetches the weather and the history concurrently, then projects.
    /// Either both succeed or the whole request fails.
    pub async fn predict(&self, raw_date: &str) -> Result<Prediction, ForecastError> {
        let target = parse_target_date(raw_date)?;
        let (temperature, history) = futures::try_join!(
            self.weather.forecast_temperature(target),
            self.history.read_all_daily_records(),
        )?;
        project(&target.format("%Y-%m-%d").to_string(), temperature, &history)
    }
}
