//! Decoding of Crowdfunding contract events.
//!
//! Events are requested from RPC with `xdrFormat: "json"`, so topics and
//! values arrive as JSON-encoded `ScVal`s:
//!
//! ```text
//! topicJson: [{"symbol":"donated"}, {"u64":"0"}]
//! valueJson: {"map":[{"key":{"symbol":"amount"},"val":{"i128":"20000"}}, ...]}
//! ```
//!
//! Integer encodings differ between RPC versions (bare numbers or decimal
//! strings), so every scalar is read leniently.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{IndexerError, Result};

/// A raw event as returned by `getEvents`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcEvent {
    pub id: String,
    pub ledger: i64,
    pub ledger_closed_at: String,
    pub contract_id: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub topic_json: Vec<Value>,
    #[serde(default)]
    pub value_json: Value,
}

/// A decoded event, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CrowdfundingEvent {
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    /// Token amounts are `i128`, kept as decimal strings.
    pub amount: Option<String>,
    pub threshold: Option<i64>,
    pub approve: Option<bool>,
    /// The full event value, as received.
    pub payload: String,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A stored event row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub threshold: Option<i64>,
    pub approve: Option<bool>,
    pub payload: String,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// Decode one RPC event into a [`CrowdfundingEvent`].
pub fn decode_event(raw: &RpcEvent) -> Result<CrowdfundingEvent> {
    let event_type = raw
        .topic_json
        .first()
        .and_then(symbol)
        .ok_or_else(|| IndexerError::Decode(format!("event {} has no symbol topic", raw.id)))?;

    let timestamp = DateTime::parse_from_rfc3339(&raw.ledger_closed_at)
        .map_err(|e| IndexerError::Decode(format!("bad ledgerClosedAt: {e}")))?
        .timestamp();

    let topic = |i: usize| raw.topic_json.get(i).and_then(scalar);
    let field = |key: &str| map_field(&raw.value_json, key);

    let mut event = CrowdfundingEvent {
        event_id: raw.id.clone(),
        event_type: event_type.clone(),
        project_id: None,
        actor: None,
        amount: None,
        threshold: None,
        approve: None,
        payload: raw.value_json.to_string(),
        ledger: raw.ledger,
        timestamp,
        contract_id: raw.contract_id.clone(),
        tx_hash: raw.tx_hash.clone(),
    };

    match event_type.as_str() {
        "created" => {
            event.project_id = topic(1);
            event.actor = field("owner").and_then(scalar);
            event.amount = field("required_amount").and_then(scalar);
        }
        "donated" => {
            event.project_id = topic(1);
            event.actor = field("donor").and_then(scalar);
            event.amount = field("amount").and_then(scalar);
        }
        "vote_open" => {
            event.project_id = topic(1);
            event.threshold = field("threshold").and_then(integer);
        }
        "voted" => {
            event.project_id = topic(1);
            event.threshold = field("threshold").and_then(integer);
            event.actor = field("voter").and_then(scalar);
            event.approve = field("approve").and_then(boolean);
        }
        "decided" => {
            event.project_id = topic(1);
            event.threshold = field("threshold").and_then(integer);
            event.approve = field("approved").and_then(boolean);
        }
        "withdrawn" => {
            event.project_id = topic(1);
            event.actor = field("owner").and_then(scalar);
            event.amount = field("amount").and_then(scalar);
        }
        "fees_out" => {
            event.actor = field("caller").and_then(scalar);
            event.amount = field("amount").and_then(scalar);
        }
        "moved" => {
            event.project_id = topic(1);
            event.amount = field("amount").and_then(scalar);
        }
        "fee_upd" | "status" | "cooldown" => {
            event.project_id = topic(1);
        }
        "token_add" | "paused" | "unpaused" | "granted" | "revoked" => {
            event.actor = topic(1);
        }
        _ => {}
    }

    Ok(event)
}

/// Rows stored for one RPC event.
///
/// A `moved` event is stored twice: the outflow under the source project and
/// a `moved_in` row under the destination, so each project's history shows it.
pub fn decode_rows(raw: &RpcEvent) -> Result<Vec<CrowdfundingEvent>> {
    let event = decode_event(raw)?;
    if event.event_type != "moved" {
        return Ok(vec![event]);
    }

    let destination = raw
        .topic_json
        .get(2)
        .and_then(scalar)
        .or_else(|| map_field(&raw.value_json, "to_project").and_then(scalar));
    let inflow = destination.map(|to| CrowdfundingEvent {
        event_id: format!("{}-in", event.event_id),
        event_type: "moved_in".to_string(),
        project_id: Some(to),
        ..event.clone()
    });

    Ok(std::iter::once(event).chain(inflow).collect())
}

/// `{"symbol": "x"}` -> `"x"`.
fn symbol(v: &Value) -> Option<String> {
    v.get("symbol").and_then(Value::as_str).map(str::to_string)
}

/// Any scalar `ScVal` rendered as a string.
fn scalar(v: &Value) -> Option<String> {
    let obj = v.as_object()?;
    let (_, inner) = obj.iter().next()?;
    match inner {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(v: &Value) -> Option<i64> {
    scalar(v)?.parse().ok()
}

fn boolean(v: &Value) -> Option<bool> {
    v.get("bool").and_then(Value::as_bool)
}

/// Look up `key` in a `{"map": [{"key": {"symbol": key}, "val": ...}]}` value.
fn map_field<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get("map")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("key").and_then(symbol).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
}
