//! Quota record normalization
//!
//! Raw records carry two kinds of entries that must never be submitted as a
//! limit: the backend's `id` metadata field and the `-1` "unlimited" sentinel.

use serde_json::Value;

use crate::models::{QuotaRecord, METADATA_ID_KEY, UNLIMITED};

/// Keep only entries usable for a write-back
pub fn normalize(record: &QuotaRecord) -> QuotaRecord {
    record
        .iter()
        .filter(|(key, value)| key.as_str() != METADATA_ID_KEY && !is_unlimited(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Drop the `id` metadata field, keeping unlimited markers
pub fn strip_metadata(mut record: QuotaRecord) -> QuotaRecord {
    record.remove(METADATA_ID_KEY);
    record
}

fn is_unlimited(value: &Value) -> bool {
    value.as_i64() == Some(UNLIMITED)
}
