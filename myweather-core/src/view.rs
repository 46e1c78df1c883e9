//! Presentation data derived from the wire models.
//!
//! Times are shown in the location's own UTC offset, which is worked out from
//! the `localtime` / `localtime_epoch` pair WeatherAPI sends.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::Serialize;

use crate::model::{Condition, CurrentResponse, ForecastDay, ForecastHour, ForecastResponse, Location};

const HOURLY_WINDOW_HOURS: i64 = 24;
const LOCALTIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Real-world offsets are whole quarter hours.
const OFFSET_STEP_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSummary {
    pub location_name: String,
    pub timezone: Option<String>,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub condition: String,
    pub is_day: bool,
    pub wind_speed_mps: Option<f64>,
    pub wind_degree: Option<u16>,
    pub humidity_pct: Option<u8>,
    pub observation_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyItem {
    pub time: DateTime<FixedOffset>,
    pub temperature_c: f64,
    pub condition: String,
    pub chance_of_rain_pct: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyItem {
    /// Calendar date at the location.
    pub date: NaiveDate,
    /// "Today", "Tomorrow" or the short weekday name.
    pub label: String,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub condition: String,
    pub chance_of_rain_pct: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherOverview {
    pub current: CurrentSummary,
    pub hourly: Vec<HourlyItem>,
    pub daily: Vec<DailyItem>,
}

impl From<&CurrentResponse> for CurrentSummary {
    fn from(value: &CurrentResponse) -> Self {
        let current = &value.current;
        let offset = utc_offset(&value.location);

        Self {
            location_name: location_name(&value.location),
            timezone: value.location.tz_id.clone(),
            temperature_c: current.temp_c,
            feels_like_c: current.feelslike_c,
            condition: condition_text(current.condition.as_ref()),
            is_day: current.is_day == Some(1),
            wind_speed_mps: current.wind_kph.map(kph_to_mps),
            wind_degree: current.wind_degree,
            humidity_pct: current.humidity,
            observation_time: current
                .last_updated_epoch
                .or(value.location.localtime_epoch)
                .and_then(|ts| local_time(ts, offset)),
        }
    }
}

impl From<&ForecastResponse> for WeatherOverview {
    fn from(value: &ForecastResponse) -> Self {
        let offset = utc_offset(&value.location);
        let current = CurrentSummary::from(&CurrentResponse {
            location: value.location.clone(),
            current: value.current.clone(),
        });

        let now = current.observation_time.unwrap_or_else(|| Utc::now().with_timezone(&offset));
        let hourly = hourly_window(&value.forecast.forecastday, now.timestamp(), offset);
        let today = now.date_naive();
        let daily = value.forecast.forecastday.iter().filter_map(|d| daily_item(d, today)).collect();

        Self { current, hourly, daily }
    }
}

/// "Today", "Tomorrow", otherwise the short weekday name ("Fri").
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.checked_add_days(Days::new(1)) {
        "Tomorrow".to_string()
    } else {
        date.format("%a").to_string()
    }
}

/// Offset of the location's wall clock from UTC; UTC when it can't be told.
fn utc_offset(location: &Location) -> FixedOffset {
    let utc = Utc.fix();

    let (Some(epoch), Some(local)) = (location.localtime_epoch, location.localtime.as_deref()) else {
        return utc;
    };
    let Ok(wall) = NaiveDateTime::parse_from_str(local.trim(), LOCALTIME_FORMAT) else {
        return utc;
    };

    // `localtime` drops the seconds, so snap the difference to a quarter hour.
    let diff = wall.and_utc().timestamp() - epoch;
    let secs = (diff + OFFSET_STEP_SECS / 2).div_euclid(OFFSET_STEP_SECS) * OFFSET_STEP_SECS;

    i32::try_from(secs).ok().and_then(FixedOffset::east_opt).unwrap_or(utc)
}

/// Hours from the one containing `start` up to 24 hours ahead.
fn hourly_window(days: &[ForecastDay], start: i64, offset: FixedOffset) -> Vec<HourlyItem> {
    let from = start - start.rem_euclid(3600);
    let until = from + HOURLY_WINDOW_HOURS * 3600;

    days.iter()
        .flat_map(|d| d.hour.iter())
        .filter(|h| h.time_epoch >= from && h.time_epoch < until)
        .filter_map(|h| hourly_item(h, offset))
        .collect()
}

fn hourly_item(hour: &ForecastHour, offset: FixedOffset) -> Option<HourlyItem> {
    Some(HourlyItem {
        time: local_time(hour.time_epoch, offset)?,
        temperature_c: hour.temp_c,
        condition: condition_text(hour.condition.as_ref()),
        chance_of_rain_pct: hour.chance_of_rain,
    })
}

fn daily_item(day: &ForecastDay, today: NaiveDate) -> Option<DailyItem> {
    // `date_epoch` is midnight UTC of the location's calendar date.
    let date = DateTime::from_timestamp(day.date_epoch, 0)?.date_naive();

    Some(DailyItem {
        date,
        label: day_label(date, today),
        min_temperature_c: day.day.mintemp_c,
        max_temperature_c: day.day.maxtemp_c,
        condition: condition_text(day.day.condition.as_ref()),
        chance_of_rain_pct: day.day.daily_chance_of_rain,
    })
}

fn location_name(location: &Location) -> String {
    format!("{}, {}", location.name, location.country)
}

fn condition_text(condition: Option<&Condition>) -> String {
    condition
        .and_then(|c| c.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

fn kph_to_mps(kph: f64) -> f64 {
    kph / 3.6
}

fn local_time(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(ts, 0).map(|t| t.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentWeather, DayStats, Forecast};

    // 1_700_000_000 is 2023-11-14 22:13:20 UTC, 01:13 on the 15th in Moscow.
    fn location() -> Location {
        Location {
            name: "Moscow".into(),
            region: None,
            country: "Russia".into(),
            tz_id: Some("Europe/Moscow".into()),
            localtime_epoch: Some(1_700_000_000),
            localtime: Some("2023-11-15 1:13".into()),
        }
    }

    fn current() -> CurrentWeather {
        CurrentWeather {
            last_updated_epoch: Some(1_700_000_100),
            temp_c: Some(-3.0),
            temp_f: Some(26.6),
            feelslike_c: Some(-7.5),
            is_day: Some(0),
            condition: Some(Condition { text: Some("Light snow".into()), icon: None, code: Some(1213) }),
            wind_kph: Some(18.0),
            wind_mph: Some(11.2),
            wind_degree: Some(270),
            wind_dir: Some("W".into()),
            humidity: Some(86),
        }
    }

    fn hour(ts: i64, temp: f64) -> ForecastHour {
        ForecastHour {
            time_epoch: ts,
            temp_c: temp,
            feelslike_c: None,
            is_day: None,
            condition: None,
            wind_kph: None,
            chance_of_rain: Some(10),
        }
    }

    fn day(date_epoch: i64, hour: Vec<ForecastHour>) -> ForecastDay {
        ForecastDay {
            date_epoch,
            day: DayStats {
                maxtemp_c: 1.0,
                mintemp_c: -5.0,
                avgtemp_c: None,
                maxwind_kph: None,
                daily_chance_of_rain: Some(40),
                condition: None,
            },
            hour,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn current_summary_maps_fields() {
        let summary = CurrentSummary::from(&CurrentResponse { location: location(), current: current() });

        assert_eq!(summary.location_name, "Moscow, Russia");
        assert_eq!(summary.timezone.as_deref(), Some("Europe/Moscow"));
        assert_eq!(summary.condition, "Light snow");
        assert!(!summary.is_day);
        assert_eq!(summary.wind_speed_mps, Some(5.0));
        assert_eq!(summary.humidity_pct, Some(86));
        assert_eq!(summary.observation_time.map(|t| t.timestamp()), Some(1_700_000_100));
    }

    #[test]
    fn times_use_the_location_offset() {
        let summary = CurrentSummary::from(&CurrentResponse { location: location(), current: current() });

        let observed = summary.observation_time.unwrap();
        assert_eq!(observed.offset().local_minus_utc(), 3 * 3600);
        assert_eq!(observed.format("%Y-%m-%d %H:%M").to_string(), "2023-11-15 01:15");
    }

    #[test]
    fn missing_localtime_falls_back_to_utc() {
        let mut loc = location();
        loc.localtime = None;
        let summary = CurrentSummary::from(&CurrentResponse { location: loc, current: current() });

        assert_eq!(summary.observation_time.unwrap().offset().local_minus_utc(), 0);
    }

    #[test]
    fn negative_offsets_are_recovered() {
        // 2023-11-14 22:13:20 UTC is 17:13 in New York (UTC-5).
        let mut loc = location();
        loc.localtime = Some("2023-11-14 17:13".into());

        assert_eq!(utc_offset(&loc).local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn missing_condition_is_unknown() {
        let mut cur = current();
        cur.condition = None;
        cur.last_updated_epoch = None;
        let summary = CurrentSummary::from(&CurrentResponse { location: location(), current: cur });

        assert_eq!(summary.condition, "Unknown");
        assert_eq!(summary.observation_time.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn day_labels() {
        let today = ymd(2023, 11, 15);
        assert_eq!(day_label(ymd(2023, 11, 15), today), "Today");
        assert_eq!(day_label(ymd(2023, 11, 16), today), "Tomorrow");
        assert_eq!(day_label(ymd(2023, 11, 17), today), "Fri");
    }

    #[test]
    fn overview_keeps_next_24_hours_across_days() {
        // 1_699_999_200 is the start of the hour containing the observation time.
        let base = 1_699_999_200;
        let first: Vec<_> = (0..20).map(|i| hour(base - 3600 * 4 + i * 3600, i as f64)).collect();
        let second: Vec<_> = (0..24).map(|i| hour(base + 3600 * 16 + i * 3600, i as f64)).collect();

        let response = ForecastResponse {
            location: location(),
            current: current(),
            forecast: Forecast { forecastday: vec![day(base - 3600 * 4, first), day(base + 3600 * 20, second)] },
        };

        let overview = WeatherOverview::from(&response);

        assert_eq!(overview.hourly.len(), 24);
        assert_eq!(overview.hourly[0].time.timestamp(), base);
        assert_eq!(overview.hourly[23].time.timestamp(), base + 23 * 3600);
        assert_eq!(overview.hourly[0].time.offset().local_minus_utc(), 3 * 3600);
        assert_eq!(overview.daily.len(), 2);
        assert_eq!(overview.daily[0].chance_of_rain_pct, Some(40));
    }

    #[test]
    fn daily_items_are_labelled_from_the_local_date() {
        // Midnight UTC of 2023-11-15, -16 and -17; it is already the 15th in Moscow.
        let response = ForecastResponse {
            location: location(),
            current: current(),
            forecast: Forecast {
                forecastday: vec![
                    day(1_700_006_400, vec![]),
                    day(1_700_092_800, vec![]),
                    day(1_700_179_200, vec![]),
                ],
            },
        };

        let labels: Vec<_> = WeatherOverview::from(&response).daily.into_iter().map(|d| d.label).collect();
        assert_eq!(labels, vec!["Today", "Tomorrow", "Fri"]);
    }
}
