//! Minimal Soroban JSON-RPC client: `getLatestLedger` and `getEvents`.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::errors::{IndexerError, Result};
use crate::events::RpcEvent;

/// Page size requested from `getEvents`.
pub const PAGE_LIMIT: u32 = 100;

/// Where a `getEvents` request starts.
#[derive(Debug, Clone, PartialEq)]
pub enum EventsStart {
    Ledger(i64),
    Cursor(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub events: Vec<RpcEvent>,
    pub latest_ledger: i64,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    contract_id: String,
}

impl RpcClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexerError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: config.rpc_url.clone(),
            contract_id: config.contract_id.clone(),
        })
    }

    /// Sequence of the most recent ledger known to the RPC node.
    pub async fn latest_ledger(&self) -> Result<i64> {
        let result = self.call("getLatestLedger", json!({})).await?;
        result
            .get("sequence")
            .and_then(Value::as_i64)
            .ok_or_else(|| IndexerError::Decode("getLatestLedger: missing sequence".to_string()))
    }

    /// Fetch one page of the contract's events.
    pub async fn get_events(&self, start: &EventsStart) -> Result<EventsPage> {
        let filters = json!([{ "type": "contract", "contractIds": [self.contract_id] }]);
        let params = match start {
            EventsStart::Ledger(ledger) => json!({
                "startLedger": ledger,
                "filters": filters,
                "pagination": { "limit": PAGE_LIMIT },
                "xdrFormat": "json",
            }),
            EventsStart::Cursor(cursor) => json!({
                "filters": filters,
                "pagination": { "cursor": cursor, "limit": PAGE_LIMIT },
                "xdrFormat": "json",
            }),
        };

        let result = self.call("getEvents", params).await?;
        serde_json::from_value(result)
            .map_err(|e| IndexerError::Decode(format!("getEvents: {e}")))
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .http
            .post(&self.url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| IndexerError::Network(format!("{method} request failed: {e}")))?;

        let mut response_json: Value = response
            .json()
            .await
            .map_err(|e| IndexerError::Network(format!("Failed to parse {method} response: {e}")))?;

        if let Some(error) = response_json.get("error") {
            return Err(IndexerError::Rpc(format!("{method} failed: {error}")));
        }
        debug!(method, "RPC call succeeded");

        response_json
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| IndexerError::Rpc(format!("{method}: no result in response")))
    }
}
