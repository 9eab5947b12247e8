use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct PolygonClient {
    http: Client,
    api_key: String,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Reference search over tickers matching a partial symbol or name.
    pub async fn search_tickers(
        &self,
        search: &str,
        limit: usize,
    ) -> Result<Vec<TickerInfo>, String> {
        if !self.has_key() {
            return Err("POLYGON_API_KEY is missing in .env".to_string());
        }

        let url = "https://api.polygon.io/v3/reference/tickers";
        let limit = limit.to_string();
        let res = self
            .http
            .get(url)
            .query(&[
                ("search", search),
                ("limit", limit.as_str()),
                ("apiKey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Polygon ticker search failed: {status} {body}"));
        }

        let parsed = res
            .json::<TickersResponse>()
            .await
            .map_err(|e| e.to_string())?;

        if parsed.status != "OK" {
            return Err(format!("Polygon returned status={}", parsed.status));
        }

        Ok(parsed.results)
    }

    /// Company/index overview for one ticker.
    pub async fn ticker_overview(&self, symbol: &str) -> Result<TickerOverview, String> {
        if !self.has_key() {
            return Err("POLYGON_API_KEY is missing in .env".to_string());
        }

        let url = format!(
            "https://api.polygon.io/v3/reference/tickers/{}",
            urlencode(symbol)
        );
        let res = self
            .http
            .get(&url)
            .query(&[("apiKey", &self.api_key)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if res.status().as_u16() == 429 {
            return Err("Polygon API rate limit exceeded".to_string());
        }

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Polygon overview failed: {status} {body}"));
        }

        let parsed = res
            .json::<OverviewResponse>()
            .await
            .map_err(|e| e.to_string())?;

        if parsed.status != "OK" {
            return Err(format!("Polygon returned status={}", parsed.status));
        }

        parsed
            .results
            .ok_or_else(|| "Polygon overview returned no results".to_string())
    }
}

// Symbols can carry characters like '^' or ':'
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    status: String,
    #[serde(default)]
    results: Vec<TickerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub primary_exchange: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
struct OverviewResponse {
    status: String,
    #[serde(default)]
    results: Option<TickerOverview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerOverview {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub primary_exchange: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub list_date: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::urlencode;

    #[test]
    fn urlencode_passes_plain_symbols_through() {
        assert_eq!(urlencode("AAPL"), "AAPL");
        assert_eq!(urlencode("BRK.A"), "BRK.A");
    }

    #[test]
    fn urlencode_escapes_index_prefixes() {
        assert_eq!(urlencode("^GSPC"), "%5EGSPC");
        assert_eq!(urlencode("I:SPX"), "I%3ASPX");
    }
}
