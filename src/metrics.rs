// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Live numeric data for product callouts.
//!
//! Two upstream providers with different query grammars are normalized into a
//! flat key/value map. Failures never escape as errors: every outcome is a
//! [`MetricsResult`] and callers render a fallback when `ok` is false.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::MetricsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSource {
    /// Current weather for a city name
    OpenWeather,
    /// Latest value of a `COUNTRY:INDICATOR` series
    WorldBank,
}

impl MetricsSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openweather" => Some(MetricsSource::OpenWeather),
            "worldbank" => Some(MetricsSource::WorldBank),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetricsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsSource::OpenWeather => write!(f, "openweather"),
            MetricsSource::WorldBank => write!(f, "worldbank"),
        }
    }
}

/// Outcome of one metrics lookup; constructed once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

impl MetricsResult {
    fn success(data: Map<String, Value>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            as_of: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
            as_of: None,
        }
    }
}

pub struct MetricsFetcher {
    http: reqwest::Client,
    config: MetricsConfig,
}

impl MetricsFetcher {
    pub fn new(http: reqwest::Client, config: MetricsConfig) -> Self {
        Self { http, config }
    }

    /// Fetch by source name as it arrives from a URL path segment
    pub async fn fetch_named(
        &self,
        source: &str,
        query: &str,
        metric_keys: &[String],
        format: Option<&str>,
    ) -> MetricsResult {
        match MetricsSource::parse(source) {
            Some(source) => self.fetch(source, query, metric_keys, format).await,
            None => MetricsResult::failure("Unsupported source"),
        }
    }

    pub async fn fetch(
        &self,
        source: MetricsSource,
        query: &str,
        metric_keys: &[String],
        format: Option<&str>,
    ) -> MetricsResult {
        let outcome = match source {
            MetricsSource::OpenWeather => self.fetch_openweather(query, format).await,
            MetricsSource::WorldBank => self.fetch_worldbank(query).await,
        };

        match outcome {
            Ok(data) => {
                debug!(source = %source, keys = data.len(), "Metrics fetched");
                MetricsResult::success(filter_keys(data, metric_keys))
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Metrics fetch failed");
                MetricsResult::failure(e.to_string())
            }
        }
    }

    async fn fetch_openweather(
        &self,
        query: &str,
        format: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let api_key = self
            .config
            .openweather_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow::anyhow!("OPENWEATHER_API_KEY not set"))?;

        let units = if format == Some("imperial") {
            Units::Imperial
        } else {
            Units::Metric
        };

        let url = Url::parse_with_params(
            &format!(
                "{}/data/2.5/weather",
                self.config.openweather_base.trim_end_matches('/')
            ),
            &[("q", query), ("appid", api_key), ("units", units.as_str())],
        )?;

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("OpenWeather error: {}", response.status().as_u16());
        }
        let body: OpenWeatherResponse = response
            .json()
            .await
            .context("OpenWeather returned an unexpected payload")?;

        Ok(derive_weather(&body, units))
    }

    async fn fetch_worldbank(&self, query: &str) -> Result<Map<String, Value>> {
        let (country, indicator) = query.split_once(':').unwrap_or((query, ""));

        let mut url = Url::parse(&format!(
            "{}/v2/country/",
            self.config.worldbank_base.trim_end_matches('/')
        ))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("WorldBank base URL cannot carry a path"))?
            .pop_if_empty()
            .extend([country, "indicator", indicator]);
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("per_page", "1");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("WorldBank error: {}", response.status().as_u16());
        }
        let body: Value = response
            .json()
            .await
            .context("WorldBank returned an unexpected payload")?;

        // Payload is [paging, [series...]]
        let series = body.get(1).and_then(|s| s.get(0));

        let mut data = Map::new();
        data.insert("country".into(), Value::String(country.to_string()));
        data.insert("indicator".into(), Value::String(indicator.to_string()));
        let value = series
            .and_then(|s| s.get("value"))
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Value::String("n/a".into()));
        data.insert("value".into(), value);
        if let Some(date) = series.and_then(|s| s.get("date")).filter(|d| !d.is_null()) {
            data.insert("date".into(), date.clone());
        }
        Ok(data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Units {
    Metric,
    Imperial,
}

impl Units {
    fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherResponse {
    name: Option<String>,
    main: Option<OpenWeatherMain>,
    wind: Option<OpenWeatherWind>,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherMain {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherCondition {
    description: Option<String>,
}

/// Derive display metrics from the provider's native units.
/// In metric mode wind arrives in m/s and is reported as km/h.
fn derive_weather(body: &OpenWeatherResponse, units: Units) -> Map<String, Value> {
    let temp = body.main.as_ref().and_then(|m| m.temp);
    let humidity = body.main.as_ref().and_then(|m| m.humidity);
    let wind = body.wind.as_ref().and_then(|w| w.speed);
    let conditions = body.weather.first().and_then(|w| w.description.clone());

    let mut data = Map::new();
    if let Some(t) = temp {
        data.insert("temp".into(), round(t));
    }
    if let Some(h) = humidity {
        data.insert("humidity".into(), number(h));
    }
    if let Some(c) = conditions {
        data.insert("conditions".into(), Value::String(c));
    }
    if let Some(city) = &body.name {
        data.insert("city".into(), Value::String(city.clone()));
    }

    match units {
        Units::Metric => {
            if let Some(t) = temp {
                data.insert("temperatureC".into(), round(t));
            }
            if let Some(w) = wind {
                data.insert("windKph".into(), round(w * 3.6));
            }
        }
        Units::Imperial => {
            if let Some(t) = temp {
                data.insert("temperatureF".into(), round(t));
            }
            if let Some(w) = wind {
                data.insert("windMph".into(), round(w));
            }
        }
    }
    data
}

fn round(v: f64) -> Value {
    Value::from(v.round() as i64)
}

/// Whole numbers stay integers in the JSON output
fn number(v: f64) -> Value {
    if v.fract() == 0.0 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

fn filter_keys(data: Map<String, Value>, metric_keys: &[String]) -> Map<String, Value> {
    if metric_keys.is_empty() {
        return data;
    }
    data.into_iter()
        .filter(|(k, _)| metric_keys.iter().any(|m| m == k))
        .collect()
}

/// Parse the `metricKeys` query parameter: a JSON array or a comma list
pub fn parse_metric_keys(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    if let Ok(keys) = serde_json::from_str::<Vec<String>>(raw) {
        return keys;
    }
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
