use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Candle sampling interval accepted by the time-series endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Min1,
    Min5,
    Min15,
    Min30,
    Hour1,
}

impl Interval {
    pub fn parse(s: &str) -> Option<Interval> {
        match s {
            "1min" => Some(Interval::Min1),
            "5min" => Some(Interval::Min5),
            "15min" => Some(Interval::Min15),
            "30min" => Some(Interval::Min30),
            "1h" => Some(Interval::Hour1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Min1 => "1min",
            Interval::Min5 => "5min",
            Interval::Min15 => "15min",
            Interval::Min30 => "30min",
            Interval::Hour1 => "1h",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    // unix millis
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStatus {
    Ok,
    NoData,
}

/// Candles for one symbol on one calendar date, oldest first, at most one
/// candle per timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct CandleSeries {
    pub status: SeriesStatus,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn no_data() -> Self {
        CandleSeries {
            status: SeriesStatus::NoData,
            candles: Vec::new(),
        }
    }

    pub fn latest_close(&self) -> Option<f64> {
        if self.status != SeriesStatus::Ok {
            return None;
        }
        self.candles.last().map(|c| c.close)
    }
}

/// Chart lookup boundary consumed by the alert scheduler. Upstreams with
/// nothing for the requested date report `no_data`, not an error; `Err` is
/// reserved for transport and API failures.
#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn chart(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<CandleSeries, String>;
}

#[derive(Clone)]
pub struct TwelveDataClient {
    http: Client,
    api_key: String,
}

impl TwelveDataClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Intraday candles for `symbol`, filtered to `date`.
    pub async fn time_series(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<CandleSeries, String> {
        if !self.has_key() {
            return Err("TWELVEDATA_API_KEY is missing in .env".to_string());
        }

        let url = "https://api.twelvedata.com/time_series";
        let res = self
            .http
            .get(url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                // max points (up to a full trading day of 1min bars)
                ("outputsize", "1000"),
                ("format", "JSON"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Twelve Data time_series failed: {status} {body}"));
        }

        let parsed = res
            .json::<TimeSeriesResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(series_from_response(parsed, date))
    }
}

#[async_trait]
impl ChartProvider for TwelveDataClient {
    async fn chart(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<CandleSeries, String> {
        self.time_series(symbol, date, interval).await
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    values: Option<Vec<RawBar>>,
}

// Twelve Data returns every OHLCV field as a string
#[derive(Debug, Deserialize)]
struct RawBar {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

fn series_from_response(resp: TimeSeriesResponse, date: NaiveDate) -> CandleSeries {
    if resp.status.as_deref() == Some("error") {
        return CandleSeries::no_data();
    }

    let Some(values) = resp.values else {
        return CandleSeries::no_data();
    };

    let day = date.format("%Y-%m-%d").to_string();

    let mut candles: Vec<Candle> = values
        .into_iter()
        .filter(|bar| bar.datetime.starts_with(&day))
        .filter_map(|bar| {
            let ts = NaiveDateTime::parse_from_str(&bar.datetime, "%Y-%m-%d %H:%M:%S")
                .ok()?
                .and_utc()
                .timestamp_millis();

            Some(Candle {
                ts,
                open: bar.open.parse().ok()?,
                high: bar.high.parse().ok()?,
                low: bar.low.parse().ok()?,
                close: bar.close.parse().ok()?,
                volume: bar.volume.and_then(|v| v.parse().ok()).unwrap_or(0.0),
            })
        })
        .collect();

    if candles.is_empty() {
        return CandleSeries::no_data();
    }

    candles.sort_by_key(|c| c.ts);
    candles.dedup_by_key(|c| c.ts);

    CandleSeries {
        status: SeriesStatus::Ok,
        candles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(datetime: &str, close: &str) -> RawBar {
        RawBar {
            datetime: datetime.to_string(),
            open: "100.0".to_string(),
            high: "101.0".to_string(),
            low: "99.0".to_string(),
            close: close.to_string(),
            volume: Some("1000".to_string()),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn error_status_maps_to_no_data() {
        let resp = TimeSeriesResponse {
            status: Some("error".to_string()),
            values: None,
        };
        let series = series_from_response(resp, date());
        assert_eq!(series.status, SeriesStatus::NoData);
        assert_eq!(series.latest_close(), None);
    }

    #[test]
    fn bars_from_other_days_are_dropped() {
        let resp = TimeSeriesResponse {
            status: Some("ok".to_string()),
            values: Some(vec![
                bar("2024-01-04 15:59:00", "148.0"),
                bar("2024-01-05 09:30:00", "150.5"),
            ]),
        };
        let series = series_from_response(resp, date());
        assert_eq!(series.candles.len(), 1);
        assert_eq!(series.latest_close(), Some(150.5));
    }

    #[test]
    fn bars_are_sorted_and_deduplicated_by_timestamp() {
        let resp = TimeSeriesResponse {
            status: Some("ok".to_string()),
            values: Some(vec![
                bar("2024-01-05 15:59:00", "151.2"),
                bar("2024-01-05 09:30:00", "150.0"),
                bar("2024-01-05 15:59:00", "151.2"),
            ]),
        };
        let series = series_from_response(resp, date());
        assert_eq!(series.candles.len(), 2);
        assert!(series.candles[0].ts < series.candles[1].ts);
        assert_eq!(series.latest_close(), Some(151.2));
    }

    #[test]
    fn unparseable_bars_are_skipped() {
        let resp = TimeSeriesResponse {
            status: Some("ok".to_string()),
            values: Some(vec![bar("2024-01-05 not-a-time", "150.0")]),
        };
        let series = series_from_response(resp, date());
        assert_eq!(series.status, SeriesStatus::NoData);
    }
}
