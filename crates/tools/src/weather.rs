//! Current weather tool.
//!
//! Geocodes the place with geocode.xyz, then asks api.weather.gov for the
//! grid point and its forecast. The temperature of the first forecast
//! period is reported.

use async_trait::async_trait;
use genui_core::error::ToolError;
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::Tool;
use genui_core::ui::UiFragment;
use serde_json::{Value, json};

use crate::client::{require_secret, send_json};

pub struct WeatherTool {
    client: reqwest::Client,
    api_key: Option<String>,
    geocode_url: String,
    weather_url: String,
}

impl WeatherTool {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        geocode_url: impl Into<String>,
        weather_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            geocode_url: geocode_url.into().trim_end_matches('/').to_string(),
            weather_url: weather_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a place to `(latitude, longitude)` as geocode.xyz spells them.
    async fn geocode(
        &self,
        key: &str,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<(String, String), ToolError> {
        let url = format!(
            "{}/{},{},{}",
            self.geocode_url,
            city.to_lowercase(),
            state.to_lowercase(),
            country.to_lowercase()
        );
        let body = send_json(
            "geocode",
            self.client
                .get(url)
                .query(&[("json", "1"), ("auth", key)]),
        )
        .await?;

        match (coordinate(&body["latt"]), coordinate(&body["longt"])) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(ToolError::Http {
                service: "geocode".into(),
                reason: "Failed to get geocode data.".into(),
            }),
        }
    }

    async fn forecast_temperature(&self, lat: &str, lon: &str) -> Result<Value, ToolError> {
        let points = send_json(
            "weather.gov",
            self.client.get(format!("{}/points/{lat},{lon}", self.weather_url)),
        )
        .await?;

        let forecast_url = points["properties"]["forecast"].as_str().ok_or_else(|| ToolError::Http {
            service: "weather.gov".into(),
            reason: "Failed to get weather data.".into(),
        })?;

        let forecast = send_json("weather.gov", self.client.get(forecast_url)).await?;
        let temperature = &forecast["properties"]["periods"][0]["temperature"];
        if temperature.is_null() {
            return Err(ToolError::Http {
                service: "weather.gov".into(),
                reason: "Failed to get forecast data.".into(),
            });
        }
        Ok(temperature.clone())
    }
}

/// geocode.xyz returns coordinates as strings; accept numbers too.
fn coordinate(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "A tool to fetch the current weather, given a city and state. If the city/state is not provided, ask the user for both the city and state."
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::object()
            .required("city", FieldType::String, "The city name to get weather for")
            .required(
                "state",
                FieldType::String,
                "The two letter state abbreviation to get weather for",
            )
            .optional(
                "country",
                FieldType::String,
                "The two letter country abbreviation to get weather for",
            )
            .with_default(json!("usa"))
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        let key = require_secret(&self.api_key, "GEOCODE_API_KEY")?;
        let city = parameters["city"].as_str().unwrap_or_default();
        let state = parameters["state"].as_str().unwrap_or_default();
        let country = parameters["country"].as_str().unwrap_or("usa");

        let (lat, lon) = self.geocode(key, city, state, country).await?;
        tracing::debug!(city, state, %lat, %lon, "Geocoded location");
        let temperature = self.forecast_temperature(&lat, &lon).await?;

        Ok(json!({
            "city": city,
            "state": state,
            "country": country,
            "temperature": temperature,
        }))
    }

    fn loading_fragment(&self, _parameters: &Value) -> UiFragment {
        UiFragment::new("CurrentWeatherLoading", json!({}))
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        UiFragment::new("CurrentWeather", value.clone())
    }
}
