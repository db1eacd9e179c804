//! Ordered fallback extraction of the created-entity id
//!
//! The effect payload does not uniformly mark "the object the caller cares
//! about" across node versions and operation kinds, so extraction degrades
//! through increasingly generic heuristics. Order matters: the early
//! strategies are purpose-built signals; the late ones are best-effort and
//! must exclude known non-candidates to avoid false positives.

use crate::types::{ObjectId, SuiAddress, TransactionRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Generic canonical id shape: `0x` + 64 lowercase hex.
static CANONICAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-f]{64}$").expect("valid regex"));

/// Event types announcing a package publication.
static PUBLISH_EVENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)::publish(ed)?(event)?$").expect("valid regex"));

/// Extract the single most relevant newly-created entity id from a
/// transaction record. First match wins:
///
/// 1. a change record tagged as published (the package id itself);
/// 2. a created record with `Immutable` ownership;
/// 3. a publish-announcing event carrying an embedded id field;
/// 4. any created id of the generic canonical shape, excluding the sender
///    and already-known package ids.
///
/// Returns `None` when nothing matches; a valid outcome, not an error.
///
/// Strategy 4 is a known precision gap: when a transaction creates several
/// unrelated objects, the first surviving candidate may not be the one the
/// caller meant. The earlier strategies exist to make that rare; no further
/// disambiguation is attempted.
pub fn resolve_created_object(
    record: &TransactionRecord,
    sender: &SuiAddress,
    known_packages: &HashSet<ObjectId>,
) -> Option<ObjectId> {
    if let Some(package_id) = record.published.first() {
        return Some(package_id.clone());
    }

    if let Some(immutable) = record.created.iter().find(|c| c.owner.is_immutable()) {
        return Some(immutable.object_id().clone());
    }

    for event in &record.events {
        if PUBLISH_EVENT_RE.is_match(&event.event_type) {
            if let Some(id) = embedded_address(&event.fields) {
                return Some(id);
            }
        }
    }

    record
        .created
        .iter()
        .map(|c| c.object_id())
        .find(|id| {
            CANONICAL_ID_RE.is_match(id.as_str())
                && *id != sender
                && !known_packages.contains(*id)
        })
        .cloned()
}

/// Pull an address out of an event payload, trying the field names the
/// node has used across versions.
fn embedded_address(fields: &serde_json::Value) -> Option<ObjectId> {
    for key in ["package_id", "packageId", "id"] {
        if let Some(s) = fields.get(key).and_then(serde_json::Value::as_str) {
            if let Ok(addr) = SuiAddress::parse(s) {
                return Some(addr);
            }
        }
    }
    None
}
