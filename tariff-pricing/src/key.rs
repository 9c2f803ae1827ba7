//! Cache key derivation for pricing queries.

use tariff_core::RateQuery;

/// Namespace prefix shared by every pricing key. Versioned so a format
/// change never collides with entries written by older deployments.
const KEY_NAMESPACE: &str = "pricing:v1";

/// Derive the cache key for `query`.
///
/// # Format
///
/// `pricing:v1:<len>:<period>:<len>:<hotel>:<len>:<room>`, where each
/// `<len>` is the byte length of the field that follows. The length
/// prefixes keep the mapping injective even when a field value contains
/// the separator, so two distinct queries can never share a key.
pub fn derive_cache_key(query: &RateQuery) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}:{}",
        KEY_NAMESPACE,
        query.period.len(),
        query.period,
        query.hotel.len(),
        query.hotel,
        query.room.len(),
        query.room,
    )
}

// ===== TESTS =====
