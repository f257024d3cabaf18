//! Forecast temperature lookup against an OpenWeather-compatible provider.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, TimeZone};
use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::configuration::WeatherSettings;
use crate::error::ForecastError;
use crate::models::ForecastPoint;

/// Anything able to tell the forecast temperature for a day.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn forecast_temperature(&self, target: NaiveDate) -> Result<f64, ForecastError>;
}

/// Parses a `YYYY-MM-DD` request date.
pub fn parse_target_date(raw: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ForecastError::Validation(format!("`{}` is not a YYYY-MM-DD date: {}", raw, e))
    })
}

#[derive(Deserialize)]
struct ForecastResponse {
    list: Vec<RawPoint>,
    #[serde(default)]
    city: Option<City>,
}

#[derive(Deserialize)]
struct RawPoint {
    dt: i64,
    main: RawMain,
}

#[derive(Deserialize)]
struct RawMain {
    temp: f64,
}

#[derive(Deserialize)]
struct City {
    /// Seconds east of UTC.
    #[serde(default)]
    timezone: i32,
}

/// Points as returned by the provider, in provider order.
#[derive(Debug, Clone)]
pub struct ProviderForecast {
    pub points: Vec<ForecastPoint>,
    pub utc_offset: FixedOffset,
}

impl ProviderForecast {
    /// Picks the point whose local calendar date is nearest to `target`.
    /// The first of several equally near points wins.
    pub fn closest_to(&self, target: NaiveDate) -> Option<&ForecastPoint> {
        let mut best: Option<(i64, &ForecastPoint)> = None;
        for point in &self.points {
            let date = match self.utc_offset.timestamp_opt(point.timestamp, 0).single() {
                Some(dt) => dt.date_naive(),
                None => continue,
            };
            let distance = (date - target).num_days().abs();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, point));
            }
        }
        best.map(|(_, point)| point)
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Secret<String>,
    latitude: f64,
    longitude: f64,
    units: String,
}

impl WeatherClient {
    pub fn new(settings: &WeatherSettings) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            latitude: settings.latitude,
            longitude: settings.longitude,
            units: settings.units.clone(),
        })
    }

    /// One request, no retry.
    pub async fn fetch_forecast(&self) -> Result<ProviderForecast, ForecastError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("appid", self.api_key.expose_secret().clone()),
                ("units", self.units.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ForecastError::Upstream {
                message: format!("provider answered {}", status),
                raw: Some(body),
            });
        }

        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| ForecastError::Upstream {
                message: format!("missing forecast list: {}", e),
                raw: Some(body.clone()),
            })?;

        let offset_secs = parsed.city.map(|c| c.timezone).unwrap_or(0);
        let utc_offset = FixedOffset::east_opt(offset_secs)
            .ok_or_else(|| ForecastError::upstream(format!("invalid timezone offset {}", offset_secs)))?;
        debug!("Provider returned {} forecast points", parsed.list.len());

        Ok(ProviderForecast {
            points: parsed
                .list
                .into_iter()
                .map(|p| ForecastPoint {
                    timestamp: p.dt,
                    temperature: p.main.temp,
                })
                .collect(),
            utc_offset,
        })
    }
}

#[async_trait]
impl TemperatureSource for WeatherClient {
    async fn forecast_temperature(&self, target: NaiveDate) -> Result<f64, ForecastError> {
        let forecast = self.fetch_forecast().await?;
        let point = forecast
            .closest_to(target)
            .ok_or_else(|| ForecastError::upstream("provider returned no forecast points"))?;
        info!("Closest temperature to {}: {}", target, point.temperature);
        Ok(point.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};

    fn at_noon(date: NaiveDate) -> i64 {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
            .timestamp()
    }

    fn forecast(points: Vec<(i64, f64)>) -> ProviderForecast {
        ProviderForecast {
            points: points
                .into_iter()
                .map(|(timestamp, temperature)| ForecastPoint {
                    timestamp,
                    temperature,
                })
                .collect(),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 10).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn picks_nearest_day() {
        let f = forecast(vec![
            (at_noon(day(1)), 31.0),
            (at_noon(day(3)), 33.0),
            (at_noon(day(7)), 37.0),
        ]);
        assert_eq!(f.closest_to(day(0)).unwrap().temperature, 31.0);
    }

    #[test]
    fn does_not_assume_sorted_input() {
        let f = forecast(vec![
            (at_noon(day(7)), 37.0),
            (at_noon(day(3)), 33.0),
            (at_noon(day(-1)), 29.0),
        ]);
        assert_eq!(f.closest_to(day(2)).unwrap().temperature, 33.0);
    }

    #[test]
    fn ties_keep_first_point() {
        let f = forecast(vec![
            (at_noon(day(-1)), 20.0),
            (at_noon(day(1)), 30.0),
            (at_noon(day(0)) - 3600, 24.0),
            (at_noon(day(0)), 26.0),
        ]);
        assert_eq!(f.closest_to(day(0)).unwrap().temperature, 24.0);

        let f = forecast(vec![(at_noon(day(-2)), 18.0), (at_noon(day(2)), 32.0)]);
        assert_eq!(f.closest_to(day(0)).unwrap().temperature, 18.0);
    }

    #[test]
    fn dates_follow_provider_timezone() {
        // 02:00 UTC on day 1 is still day 0 at UTC-7.
        let ts = at_noon(day(1)) - 10 * 3600;
        let mut f = forecast(vec![(ts, 40.0), (at_noon(day(3)), 10.0)]);
        f.utc_offset = FixedOffset::east_opt(-7 * 3600).unwrap();
        let p = f.closest_to(day(0)).unwrap();
        assert_eq!(p.temperature, 40.0);
        assert_eq!(
            f.utc_offset.timestamp_opt(p.timestamp, 0).unwrap().date_naive(),
            day(0)
        );
    }

    #[test]
    fn empty_forecast_selects_nothing() {
        assert!(forecast(vec![]).closest_to(day(0)).is_none());
    }

    #[test]
    fn target_date_validation() {
        assert_eq!(parse_target_date("2024-07-10").unwrap(), day(0));
        assert!(matches!(
            parse_target_date("10/07/2024"),
            Err(ForecastError::Validation(_))
        ));
        assert!(matches!(
            parse_target_date("2024-02-30"),
            Err(ForecastError::Validation(_))
        ));
        assert!(parse_target_date("").is_err());
    }
}
