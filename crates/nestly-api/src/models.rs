// Wire models for the weather endpoint.
//
// The response is keyed by postal code; each entry carries current
// conditions and a daily forecast. Temperatures are Celsius.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub now: CurrentConditions,
    pub forecast: ForecastDays,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub conditions: String,
    pub current_temperature: f64,
    pub current_humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastDays {
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub conditions: String,
    pub high_temperature: f64,
    pub low_temperature: f64,
}
