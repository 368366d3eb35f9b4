use serde::{Deserialize, Serialize};

/// Display-ready snapshot of a successful lookup. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city_label: String,
    pub country_code: String,
    pub temperature_celsius: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
    pub icon_reference: String,
}

/// State of the most recent (or in-flight) lookup attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookupStatus {
    #[default]
    Idle,
    Loading,
    Failed { message: String },
    Succeeded { report: WeatherReport },
}

impl LookupStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LookupStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            LookupStatus::Succeeded { report } => Some(report),
            _ => None,
        }
    }
}

/// What the rendering surface shows for a given status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusView {
    pub loading: bool,
    pub error: Option<String>,
    pub report: Option<WeatherReport>,
}

impl From<&LookupStatus> for StatusView {
    fn from(status: &LookupStatus) -> Self {
        Self {
            loading: status.is_loading(),
            error: status.error_message().map(str::to_owned),
            report: status.report().cloned(),
        }
    }
}

/// `{base}/{code}@2x.png`
pub fn icon_url(icon_base_url: &str, icon_code: &str) -> String {
    format!("{}/{}@2x.png", icon_base_url.trim_end_matches('/'), icon_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> WeatherReport {
        WeatherReport {
            city_label: "London".into(),
            country_code: "GB".into(),
            temperature_celsius: 15.0,
            condition_main: "Clouds".into(),
            condition_description: "overcast clouds".into(),
            humidity_percent: 70,
            wind_speed_mps: 3.5,
            icon_reference: icon_url("https://openweathermap.org/img/wn", "04d"),
        }
    }

    #[test]
    fn icon_url_matches_provider_pattern() {
        assert_eq!(
            icon_url("https://openweathermap.org/img/wn", "04d"),
            "https://openweathermap.org/img/wn/04d@2x.png"
        );
        assert_eq!(icon_url("http://icons.local/", "10n"), "http://icons.local/10n@2x.png");
    }

    #[test]
    fn default_status_is_idle() {
        assert_eq!(LookupStatus::default(), LookupStatus::Idle);
    }

    #[test]
    fn view_of_failed_has_no_report() {
        let status = LookupStatus::Failed { message: "boom".into() };
        let view = StatusView::from(&status);

        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some("boom"));
        assert!(view.report.is_none());
    }

    #[test]
    fn view_of_succeeded_has_no_error() {
        let status = LookupStatus::Succeeded { report: report() };
        let view = StatusView::from(&status);

        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.report, Some(report()));
    }

    #[test]
    fn view_of_loading_shows_only_indicator() {
        let view = StatusView::from(&LookupStatus::Loading);

        assert_eq!(view, StatusView { loading: true, error: None, report: None });
    }
}
