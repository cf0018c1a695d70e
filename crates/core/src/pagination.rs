//! Pagination tracker
//!
//! Converts a [`Pager`] into query parameters before a call and copies the
//! server's `totalHits` and `lastKey` back into it afterwards.

use para_domain::constants::{LAST_KEY_FIELD, TOTAL_HITS_FIELD};
use para_domain::{Pager, QueryParams};
use serde_json::Value;

/// Query parameters for a pager
///
/// `page`, `desc` and `limit` are always present. `lastKey`, `sort` and
/// `select` are only emitted when set, since the server treats an empty
/// parameter differently from a missing one.
pub fn pager_to_query_params(pager: &Pager) -> QueryParams {
    let mut params = QueryParams::new()
        .with("page", pager.page.max(1))
        .with("desc", pager.desc)
        .with("limit", pager.limit);

    if let Some(last_key) = pager.last_key.as_deref().filter(|k| !k.is_empty()) {
        params.insert("lastKey", last_key);
    }
    if let Some(sort) = pager.sortby.as_deref().filter(|s| !s.is_empty()) {
        params.insert("sort", sort);
    }
    if let Some(select) = pager.select.as_ref().filter(|fields| !fields.is_empty()) {
        params.insert("select", select.join(","));
    }
    params
}

/// Copy result counters from a list envelope into `pager`
///
/// Fields missing from the envelope leave the pager untouched.
pub fn apply_envelope(envelope: &Value, pager: &mut Pager) {
    if let Some(total) = envelope.get(TOTAL_HITS_FIELD).and_then(as_count) {
        pager.count = total;
    }
    match envelope.get(LAST_KEY_FIELD) {
        Some(Value::String(key)) if !key.is_empty() => pager.last_key = Some(key.clone()),
        Some(Value::Number(key)) => pager.last_key = Some(key.to_string()),
        _ => {}
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
