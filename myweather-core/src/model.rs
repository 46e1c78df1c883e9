//! Wire models for WeatherAPI.com responses.
//!
//! Only the fields the client uses are declared; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: Option<String>,
    pub country: String,
    /// IANA zone name, e.g. "Europe/London".
    pub tz_id: Option<String>,
    pub localtime_epoch: Option<i64>,
    /// Wall-clock time at the location, "YYYY-MM-DD HH:MM".
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub last_updated_epoch: Option<i64>,
    pub temp_c: Option<f64>,
    pub temp_f: Option<f64>,
    pub feelslike_c: Option<f64>,
    /// 1 during daytime, 0 at night.
    pub is_day: Option<u8>,
    pub condition: Option<Condition>,
    pub wind_kph: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_degree: Option<u16>,
    pub wind_dir: Option<String>,
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub location: Location,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: Option<f64>,
    pub maxwind_kph: Option<f64>,
    pub daily_chance_of_rain: Option<u8>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastHour {
    pub time_epoch: i64,
    pub temp_c: f64,
    pub feelslike_c: Option<f64>,
    pub is_day: Option<u8>,
    pub condition: Option<Condition>,
    pub wind_kph: Option<f64>,
    pub chance_of_rain: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date_epoch: i64,
    pub day: DayStats,
    #[serde(default)]
    pub hour: Vec<ForecastHour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: Location,
    pub current: CurrentWeather,
    pub forecast: Forecast,
}
