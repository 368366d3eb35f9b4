use std::fmt::Write;

use weather_lookup_core::{StatusView, WeatherReport};

pub const LOADING_LINE: &str = "Loading...";

/// Text for whatever the view currently holds. Idle renders as nothing.
pub fn render_view(view: &StatusView) -> String {
    if view.loading {
        return LOADING_LINE.to_string();
    }
    if let Some(message) = &view.error {
        return format!("Error: {message}");
    }
    view.report.as_ref().map(render_report).unwrap_or_default()
}

fn render_report(report: &WeatherReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}, {}", report.city_label, report.country_code);
    let _ = writeln!(out, "  Icon:        {}", report.icon_reference);
    let _ = writeln!(out, "  Temperature: {}°C", report.temperature_celsius);
    let _ = writeln!(out, "  Condition:   {}", report.condition_main);
    let _ = writeln!(out, "  Description: {}", report.condition_description);
    let _ = writeln!(out, "  Wind:        {} m/s", report.wind_speed_mps);
    let _ = write!(out, "  Humidity:    {}%", report.humidity_percent);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_lookup_core::LookupStatus;

    fn london() -> WeatherReport {
        WeatherReport {
            city_label: "London".into(),
            country_code: "GB".into(),
            temperature_celsius: 15.2,
            condition_main: "Clouds".into(),
            condition_description: "overcast clouds".into(),
            humidity_percent: 70,
            wind_speed_mps: 3.5,
            icon_reference: "https://openweathermap.org/img/wn/04d@2x.png".into(),
        }
    }

    #[test]
    fn idle_renders_nothing() {
        assert_eq!(render_view(&StatusView::from(&LookupStatus::Idle)), "");
    }

    #[test]
    fn loading_renders_indicator_only() {
        assert_eq!(render_view(&StatusView::from(&LookupStatus::Loading)), LOADING_LINE);
    }

    #[test]
    fn failure_renders_message() {
        let status = LookupStatus::Failed { message: "Invalid API key".into() };
        assert_eq!(render_view(&StatusView::from(&status)), "Error: Invalid API key");
    }

    #[test]
    fn report_renders_every_field() {
        let text = render_view(&StatusView::from(&LookupStatus::Succeeded { report: london() }));

        assert!(text.starts_with("London, GB\n"));
        assert!(text.contains("04d@2x.png"));
        assert!(text.contains("15.2°C"));
        assert!(text.contains("Clouds"));
        assert!(text.contains("overcast clouds"));
        assert!(text.contains("3.5 m/s"));
        assert!(text.ends_with("70%"));
    }
}
