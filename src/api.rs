use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use ipnetwork::IpNetwork;
use serde::Deserialize;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::path_graph::Asn;

pub const DEFAULT_ENDPOINT: &str = "https://stat.ripe.net/data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timestamp format the RIPEstat query parameters expect.
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const USER_AGENT: &str = concat!("bgpgrapher/", env!("CARGO_PKG_VERSION"));

/// What a query can be about: an announced prefix or an origin ASN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Prefix(IpNetwork),
    Asn(Asn),
}

impl Resource {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Ok(network) = IpNetwork::from_str(trimmed) {
            return Ok(Resource::Prefix(network));
        }
        parse_asn(trimmed)
            .map(Resource::Asn)
            .map_err(|_| QueryError::InvalidResource(input.to_string()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Prefix(network) => write!(f, "{}", network),
            Resource::Asn(asn) => write!(f, "AS{}", asn),
        }
    }
}

/// Parses an ASN argument such as "3333" or "AS3333" into its bare token.
pub fn parse_asn(input: &str) -> Result<Asn> {
    let trimmed = input.trim();
    let digits = if trimmed.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("as")) {
        &trimmed[2..]
    } else {
        trimmed
    };
    // ASNs are 32-bit; anything else is a typo, not an AS-set
    if digits.is_empty() || digits.parse::<u32>().is_err() {
        return Err(QueryError::InvalidAsn(input.to_string()));
    }
    Ok(Asn::new(digits))
}

pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, API_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| QueryError::InvalidTimestamp(input.to_string()))
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(API_TIME_FORMAT).to_string()
}

/// One announced route from the bgp-state endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StateEntry {
    pub path: Vec<Asn>,
}

/// Payload of `data` in a bgp-state response.
#[derive(Debug, Clone, Deserialize)]
pub struct StateData {
    #[serde(default)]
    pub bgp_state: Vec<StateEntry>,
}

#[derive(Debug, Deserialize)]
struct BgpStateResponse {
    data: StateData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventAttrs {
    #[serde(default)]
    pub path: Option<Vec<Asn>>,
}

/// One routing event from the bgplay endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub attrs: Option<EventAttrs>,
}

impl PlayEvent {
    /// The announced AS path, when the event carries one.
    pub fn path(&self) -> Option<&[Asn]> {
        self.attrs.as_ref().and_then(|attrs| attrs.path.as_deref())
    }
}

/// Payload of `data` in a bgplay response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayData {
    #[serde(default)]
    pub initial_state: Vec<StateEntry>,
    #[serde(default)]
    pub events: Vec<PlayEvent>,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub query_starttime: String,
}

#[derive(Debug, Deserialize)]
struct BgplayResponse {
    data: PlayData,
}

/// Blocking client for the RIPEstat data API.
pub struct RisClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl RisClient {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_ENDPOINT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::with_options(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_options(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(RisClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetches the announced-paths snapshot for `resource` at `timestamp`.
    pub fn bgp_state(&self, resource: &Resource, timestamp: &NaiveDateTime) -> Result<StateData> {
        let url = format!("{}/bgp-state/data.json", self.endpoint);
        let time = format_timestamp(timestamp);
        debug!("requesting {} resource={} timestamp={}", url, resource, time);
        let body = self
            .http
            .get(&url)
            .query(&[("resource", resource.to_string()), ("timestamp", time)])
            .send()?
            .error_for_status()?
            .text()?;
        let response: BgpStateResponse = serde_json::from_str(&body)?;
        debug!("bgp-state returned {} paths", response.data.bgp_state.len());
        Ok(response.data)
    }

    /// Fetches the event replay for `resource` over the given window.
    pub fn bgplay(
        &self,
        resource: &Resource,
        starttime: &NaiveDateTime,
        endtime: &NaiveDateTime,
    ) -> Result<PlayData> {
        let url = format!("{}/bgplay/data.json", self.endpoint);
        let start = format_timestamp(starttime);
        let end = format_timestamp(endtime);
        debug!(
            "requesting {} resource={} starttime={} endtime={}",
            url, resource, start, end
        );
        let body = self
            .http
            .get(&url)
            .query(&[
                ("resource", resource.to_string()),
                ("starttime", start),
                ("endtime", end),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        let response: BgplayResponse = serde_json::from_str(&body)?;
        debug!(
            "bgplay returned {} initial paths and {} events",
            response.data.initial_state.len(),
            response.data.events.len()
        );
        Ok(response.data)
    }
}
