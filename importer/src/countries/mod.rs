//! Country name to ISO3 code lookup.
//!
//! The index is built from two JSON documents served by country.io:
//!
//! ```text
//! iso3.json   {"FR": "FRA", "ES": "ESP", ...}
//! names.json  {"FR": "France", "ES": "Spain", ...}
//! ```
//!
//! Both are joined on the 2-letter code and keyed by the uppercased display
//! name. The index is built once per run by the caller and then only read.
//!
//! ```rust,ignore
//! let index = CountryIndex::fetch(&CountrySources::default()).await?;
//! assert_eq!(index.resolve("france"), Some("FRA"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{CountryError, CountryResult};
use crate::logs::{log_info, log_success};

/// Default URL of the ISO2 -> ISO3 document.
pub const DEFAULT_CODES_URL: &str = "http://country.io/iso3.json";

/// Default URL of the ISO2 -> name document.
pub const DEFAULT_NAMES_URL: &str = "http://country.io/names.json";

/// Where to fetch the two documents from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySources {
    pub codes_url: String,
    pub names_url: String,
}

impl Default for CountrySources {
    fn default() -> Self {
        Self {
            codes_url: DEFAULT_CODES_URL.to_string(),
            names_url: DEFAULT_NAMES_URL.to_string(),
        }
    }
}

/// Uppercased country name -> ISO3 code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryIndex {
    by_name: HashMap<String, String>,
}

impl CountryIndex {
    /// An index that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Join the code map and the name map on their 2-letter keys.
    ///
    /// Codes without a name are dropped. If two codes share a display name,
    /// the one with the greater 2-letter code wins.
    pub fn from_maps(codes: BTreeMap<String, String>, names: BTreeMap<String, String>) -> Self {
        let by_name = codes
            .into_iter()
            .filter_map(|(iso2, iso3)| names.get(&iso2).map(|name| (name.to_uppercase(), iso3)))
            .collect();

        Self { by_name }
    }

    /// Download both documents and build the index.
    pub async fn fetch(sources: &CountrySources) -> CountryResult<Self> {
        let client = reqwest::Client::new();

        log_info(format!("🌍 Fetching country codes from {}", sources.codes_url));
        let codes = fetch_map(&client, &sources.codes_url).await?;
        log_info(format!("🌍 Fetching country names from {}", sources.names_url));
        let names = fetch_map(&client, &sources.names_url).await?;

        let index = Self::from_maps(codes, names);
        log_success(format!("Country index ready ({} countries)", index.len()));
        Ok(index)
    }

    /// Exact, case-insensitive lookup.
    pub fn resolve(&self, location: &str) -> Option<&str> {
        self.by_name.get(&location.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

async fn fetch_map(client: &reqwest::Client, url: &str) -> CountryResult<BTreeMap<String, String>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CountryError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CountryError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| CountryError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    parse_map(url, &body)
}

/// Parse a `{"XX": "value"}` document.
fn parse_map(url: &str, body: &str) -> CountryResult<BTreeMap<String, String>> {
    serde_json::from_str(body).map_err(|e| CountryError::Malformed {
        url: url.to_string(),
        message: e.to_string(),
    })
}
