use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

/// Service areas tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Neighborhood {
    ElDorado,
    Manzanares,
}

impl Neighborhood {
    pub const ALL: [Neighborhood; 2] = [Neighborhood::ElDorado, Neighborhood::Manzanares];

    pub fn as_str(&self) -> &'static str {
        match self {
            Neighborhood::ElDorado => "El_dorado",
            Neighborhood::Manzanares => "Manzanares",
        }
    }
}

/// One neighborhood's consumption for one day. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NeighborhoodSample {
    #[serde(rename = "total_litros", default, deserialize_with = "lenient_number")]
    pub total_liters: f64,
    #[serde(rename = "poblacion", default, deserialize_with = "lenient_number")]
    pub population: f64,
}

/// A stored daily document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailyRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "El_dorado", default, deserialize_with = "lenient_sample")]
    pub el_dorado: NeighborhoodSample,
    #[serde(rename = "Manzanares", default, deserialize_with = "lenient_sample")]
    pub manzanares: NeighborhoodSample,
    #[serde(rename = "temperatura", default, deserialize_with = "lenient_number")]
    pub temperature: f64,
}

impl DailyRecord {
    pub fn sample(&self, neighborhood: Neighborhood) -> &NeighborhoodSample {
        match neighborhood {
            Neighborhood::ElDorado => &self.el_dorado,
            Neighborhood::Manzanares => &self.manzanares,
        }
    }

    pub fn total_liters(&self) -> f64 {
        Neighborhood::ALL
            .iter()
            .map(|n| self.sample(*n).total_liters)
            .sum()
    }
}

// Null and absent both mean "use the default"; numbers may arrive as strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_number_from_string")] f64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?
        .map(|w| w.0)
        .unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_sample<'de, D>(deserializer: D) -> Result<NeighborhoodSample, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NeighborhoodSample>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single provider-supplied sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature: f64,
}

/// Predicted against historical-average consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Alert {
    #[serde(rename = "ALTO CONSUMO")]
    HighConsumption,
    #[serde(rename = "BAJO CONSUMO")]
    LowConsumption,
    #[serde(rename = "NORMAL")]
    Normal,
}

impl Alert {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.1 {
            Alert::HighConsumption
        } else if ratio < 0.9 {
            Alert::LowConsumption
        } else {
            Alert::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodPrediction {
    #[serde(rename = "consumo_predecido")]
    pub predicted_liters: f64,
    #[serde(rename = "alerta")]
    pub alert: Alert,
    #[serde(rename = "poblacion")]
    pub population: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "temp_predecida")]
    pub temperature: f64,
    #[serde(rename = "El_dorado")]
    pub el_dorado: NeighborhoodPrediction,
    #[serde(rename = "Manzanares")]
    pub manzanares: NeighborhoodPrediction,
}

impl Prediction {
    pub fn neighborhood(&self, neighborhood: Neighborhood) -> &NeighborhoodPrediction {
        match neighborhood {
            Neighborhood::ElDorado => &self.el_dorado,
            Neighborhood::Manzanares => &self.manzanares,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyConsumption {
    pub date: String,
    #[serde(rename = "El_dorado")]
    pub el_dorado: f64,
    #[serde(rename = "Manzanares")]
    pub manzanares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureConsumption {
    pub date: String,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "consumo_total")]
    pub total_liters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParticipationShare {
    Shares {
        #[serde(rename = "El_dorado")]
        el_dorado: f64,
        #[serde(rename = "Manzanares")]
        manzanares: f64,
        #[serde(rename = "total_litros")]
        total_liters: f64,
    },
    InsufficientData { error: String },
}
