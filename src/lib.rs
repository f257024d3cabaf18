pub mod configuration;
pub mod error;
pub mod forecast;
pub mod history;
pub mod models;
pub mod reports;
pub mod routes;
pub mod startup;
pub mod weather;

pub use error::ForecastError;
pub use startup::{run, AppContext};
