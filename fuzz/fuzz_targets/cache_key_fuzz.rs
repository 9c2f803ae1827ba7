//! Fuzz test for cache key derivation
//!
//! This fuzz target derives keys from arbitrary query fields, including
//! fields containing the separator and non-ASCII content, to find:
//! - Panics or crashes
//! - Key collisions between distinct queries
//!
//! Run with: cargo +nightly fuzz run cache_key_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use tariff_core::RateQuery;
use tariff_pricing::derive_cache_key;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Split the input into the three query fields.
        let mut parts = input.splitn(3, '\n');
        let period = parts.next().unwrap_or("");
        let hotel = parts.next().unwrap_or("");
        let room = parts.next().unwrap_or("");
        let query = RateQuery::new(period, hotel, room);

        let key = derive_cache_key(&query);

        // Basic invariants that should always hold:
        // 1. Every key carries the namespace prefix
        assert!(
            key.starts_with("pricing:v1:"),
            "Keys should keep the namespace prefix"
        );

        // 2. Derivation is deterministic
        assert_eq!(
            key,
            derive_cache_key(&query),
            "The same query should always derive the same key"
        );

        // 3. Decoding the length-prefixed fields recovers the query, so
        //    distinct queries can never collide
        let mut rest = &key["pricing:v1:".len()..];
        let mut fields = Vec::new();
        for _ in 0..3 {
            let (len, tail) = rest.split_once(':').expect("length prefix present");
            let len: usize = len.parse().expect("length prefix is numeric");
            fields.push(&tail[..len]);
            rest = &tail[len..];
            if !rest.is_empty() {
                rest = &rest[1..];
            }
        }
        assert_eq!(fields, vec![period, hotel, room], "Keys decode back to their query");
        assert!(rest.is_empty(), "Keys carry nothing after the last field");
    }
});
