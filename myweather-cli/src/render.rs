//! Plain-text rendering of view models.

use std::fmt::Write;

use myweather_core::{CurrentSummary, StructuredError, WeatherOverview};

const DEFAULT_SERVER_ERROR: &str = "Server error";

pub fn summary(s: &CurrentSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", s.location_name);
    let _ = write!(out, "  {}", s.condition);
    if let Some(t) = s.temperature_c {
        let _ = write!(out, ", {t:.1}°C");
    }
    if let Some(f) = s.feels_like_c {
        let _ = write!(out, " (feels like {f:.1}°C)");
    }
    out.push('\n');

    let mut details = Vec::new();
    if let Some(w) = s.wind_speed_mps {
        match s.wind_degree {
            Some(deg) => details.push(format!("Wind {w:.1} m/s from {deg}°")),
            None => details.push(format!("Wind {w:.1} m/s")),
        }
    }
    if let Some(h) = s.humidity_pct {
        details.push(format!("Humidity {h}%"));
    }
    if !details.is_empty() {
        let _ = writeln!(out, "  {}", details.join("  "));
    }

    if let Some(at) = s.observation_time {
        let _ = write!(out, "  Updated {}", at.format("%Y-%m-%d %H:%M"));
        match s.timezone.as_deref() {
            Some(tz) => {
                let _ = write!(out, " ({tz})");
            }
            None => {
                let _ = write!(out, " UTC{}", at.format("%:z"));
            }
        }
    }

    out.trim_end().to_string()
}

pub fn overview(o: &WeatherOverview) -> String {
    let mut out = summary(&o.current);

    if !o.hourly.is_empty() {
        out.push_str("\n\nNext hours:");
        for h in &o.hourly {
            let _ = write!(out, "\n  {}  {:>6.1}°C  {}", h.time.format("%H:%M"), h.temperature_c, h.condition);
            if let Some(rain) = h.chance_of_rain_pct.filter(|r| *r > 0) {
                let _ = write!(out, " ({rain}% rain)");
            }
        }
    }

    if !o.daily.is_empty() {
        out.push_str("\n\nDays:");
        for d in &o.daily {
            let _ = write!(
                out,
                "\n  {:<8}  {}  {:>5.1}°C .. {:>5.1}°C  {}",
                d.label,
                d.date.format("%d %b"),
                d.min_temperature_c,
                d.max_temperature_c,
                d.condition
            );
        }
    }

    out
}

pub fn expected_error(err: &StructuredError) -> String {
    let message = err.message.as_deref().map(str::trim).filter(|m| !m.is_empty()).unwrap_or(DEFAULT_SERVER_ERROR);

    match err.code.as_deref() {
        Some(code) => format!("{message} (code {code})"),
        None => message.to_string(),
    }
}
