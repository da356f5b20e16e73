use chrono::Local;
use skycast_core::WeatherRecord;
use std::fmt::Write;

/// Multi-line human-readable report for a record.
pub fn report(record: &WeatherRecord) -> String {
    let theme = record.theme();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}, {}  ({} · {})",
        theme.glyph(),
        record.city,
        record.country,
        record.local_time,
        if record.is_day { "day" } else { "night" }
    );
    let _ = writeln!(
        out,
        "   {}°C  {}",
        record.temperature.round(),
        record.condition.to_uppercase()
    );
    if let Some(description) = record.description.as_deref() {
        let _ = writeln!(out, "   \"{description}\"");
    }
    out.push('\n');

    let _ = writeln!(out, "   Feels like  {}", degrees(record.feels_like));
    let _ = writeln!(
        out,
        "   High / Low  {} / {}",
        degrees(record.high),
        degrees(record.low)
    );
    let _ = writeln!(out, "   Humidity    {}", with_unit(record.humidity, "%"));
    let _ = writeln!(out, "   Wind        {}", with_unit(record.wind_speed, " km/h"));
    let _ = writeln!(
        out,
        "   AQI         {} ({}{})",
        record.aqi.round(),
        record.aqi_band().as_str(),
        record
            .aqi_status
            .as_deref()
            .map(|s| format!(", {s}"))
            .unwrap_or_default()
    );
    if let (Some(rise), Some(set)) = (record.sunrise.as_deref(), record.sunset.as_deref()) {
        let _ = writeln!(out, "   Sun         {rise} – {set}");
    }

    if !record.tips.is_empty() {
        out.push_str("\n   Smart tips\n");
        for tip in &record.tips {
            let _ = writeln!(out, "   • {tip}");
        }
    }
    let _ = writeln!(out, "\n   Playlist vibe: {}", record.music_mood);

    if !record.forecast.is_empty() {
        let _ = writeln!(out, "\n   {}-day forecast", record.forecast.len());
        for day in &record.forecast {
            let _ = writeln!(
                out,
                "   {:<10} {:>4}°  {}",
                day.day,
                day.temperature.round(),
                day.condition
            );
        }
    }

    let _ = writeln!(
        out,
        "\n   Updated {}  · theme: {}",
        record.last_updated.with_timezone(&Local).format("%H:%M:%S"),
        theme
    );
    out
}

pub fn history(entries: &[String]) -> String {
    if entries.is_empty() {
        return "No recent searches.\n".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, city)| format!("{}. {city}\n", i + 1))
        .collect()
}

fn degrees(value: Option<f64>) -> String {
    with_unit(value.map(f64::round), "°")
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{v}{unit}"))
        .unwrap_or_else(|| "—".to_string())
}
