//! Raw JSON store records → typed records, using the configured attribute
//! names.
//!
//! Stores deliver each source as `{ "status": .., "items": [..] }` with
//! loosely-typed objects inside. Ingestion is forgiving at the record level: a
//! record without a usable `id` can't take part in ordering, so it is logged
//! and skipped rather than failing the whole source.

use std::str::FromStr;

use lanesync_types::{
    BoardSnapshot, CardId, CardRecord, DecimalKey, LaneId, LaneRecord, LaneRef, RefKey, SortValue,
    Source, SourceStatus, parse_leading_float,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::config::BoardConfig;

#[derive(Error, Debug, PartialEq)]
pub enum IngestError {
    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("record has no usable id: {0}")]
    MissingId(String),

    #[error("source items must be an array")]
    ItemsNotArray,

    #[error("unknown source status '{0}'")]
    InvalidStatus(String),
}

/// Map one raw lane object.
pub fn lane_record(value: &Value, config: &BoardConfig) -> Result<LaneRecord, IngestError> {
    let obj = value.as_object().ok_or(IngestError::NotAnObject("lane"))?;
    let id = record_id(obj)?;

    let sort = match config.lane_sort_key.as_deref() {
        Some(key) => sort_value(obj.get(key)),
        None => SortValue::Absent,
    };
    let guid = obj.get(&config.lane_guid).and_then(scalar_text);

    let mut consumed = vec!["id", config.lane_guid.as_str()];
    consumed.extend(config.lane_sort_key.as_deref());

    Ok(LaneRecord {
        id: LaneId::new(id),
        sort,
        guid,
        attributes: remaining(obj, &consumed),
    })
}

/// Map one raw card object.
pub fn card_record(value: &Value, config: &BoardConfig) -> Result<CardRecord, IngestError> {
    let obj = value.as_object().ok_or(IngestError::NotAnObject("card"))?;
    let id = record_id(obj)?;

    let lane = obj
        .get(&config.card_lane_ref)
        .filter(|v| !v.is_null())
        .map(|v| {
            serde_json::from_value::<LaneRef>(v.clone()).unwrap_or_else(|_| LaneRef::Opaque(v.clone()))
        });

    Ok(CardRecord {
        id: CardId::new(id),
        sort: sort_value(obj.get(&config.card_sort_key)),
        lane,
        attributes: remaining(
            obj,
            &["id", config.card_sort_key.as_str(), config.card_lane_ref.as_str()],
        ),
    })
}

/// Map a lanes envelope. Records that fail to map are skipped.
pub fn lanes_source(envelope: &Value, config: &BoardConfig) -> Result<Source<LaneRecord>, IngestError> {
    source(envelope, "lanes", |v| lane_record(v, config))
}

/// Map a cards envelope. Records that fail to map are skipped.
pub fn cards_source(envelope: &Value, config: &BoardConfig) -> Result<Source<CardRecord>, IngestError> {
    source(envelope, "cards", |v| card_record(v, config))
}

/// Map both envelopes into a snapshot.
pub fn snapshot(lanes: &Value, cards: &Value, config: &BoardConfig) -> Result<BoardSnapshot, IngestError> {
    Ok(BoardSnapshot {
        lanes: lanes_source(lanes, config)?,
        cards: cards_source(cards, config)?,
    })
}

fn source<T>(
    envelope: &Value,
    what: &'static str,
    map: impl Fn(&Value) -> Result<T, IngestError>,
) -> Result<Source<T>, IngestError> {
    let obj = envelope.as_object().ok_or(IngestError::NotAnObject(what))?;

    let status = match obj.get("status").and_then(Value::as_str) {
        Some(s) => SourceStatus::from_str(s).map_err(|_| IngestError::InvalidStatus(s.to_string()))?,
        None => SourceStatus::Unavailable,
    };

    let items = match obj.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => raw
            .iter()
            .filter_map(|item| match map(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping {} record: {}", what, e);
                    None
                }
            })
            .collect(),
        Some(_) => return Err(IngestError::ItemsNotArray),
    };

    Ok(Source { status, items })
}

fn record_id(obj: &Map<String, Value>) -> Result<String, IngestError> {
    obj.get("id")
        .and_then(scalar_text)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| IngestError::MissingId(Value::Object(obj.clone()).to_string()))
}

/// String or number as text; anything else is not a key.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) => {
            serde_json::from_value::<RefKey>(value.clone()).ok().map(|k| k.to_key())
        }
        _ => None,
    }
}

fn sort_value(value: Option<&Value>) -> SortValue {
    match value {
        None | Some(Value::Null) => SortValue::Absent,
        Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Absent, SortValue::Number),
        Some(Value::String(s)) => SortValue::Text(s.clone()),
        Some(v @ Value::Object(obj)) => match serde_json::from_value::<DecimalKey>(v.clone()) {
            Ok(d) => SortValue::Decimal(d),
            Err(_) => match wide_decimal(obj) {
                Some(n) => SortValue::Number(n),
                None => {
                    warn!("Sort value {} is not a decimal, treating as absent", v);
                    SortValue::Absent
                }
            },
        },
        Some(other) => {
            warn!("Sort value {} is not sortable, treating as absent", other);
            SortValue::Absent
        }
    }
}

/// A decimal whose mantissa is past `i64` or sent as digit text. Ranking only
/// needs the approximate `f64`, which keeps the order.
fn wide_decimal(obj: &Map<String, Value>) -> Option<f64> {
    let mantissa = match obj.get("mantissa")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_leading_float(s)?,
        _ => return None,
    };
    let scale = match obj.get("scale") {
        None | Some(Value::Null) => 0,
        Some(s) => i32::try_from(s.as_u64()?).ok()?,
    };
    Some(mantissa / 10f64.powi(scale))
}

fn remaining(obj: &Map<String, Value>, consumed: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !consumed.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
