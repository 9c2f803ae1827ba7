//! Fuzz test for upstream response decoding
//!
//! This fuzz target feeds arbitrary status/body pairs through the response
//! parsing applied to every rate service reply to find:
//! - Panics or crashes
//! - Memory safety issues
//!
//! Run with: cargo +nightly fuzz run response_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use tariff_client::HttpRateSource;
use tariff_core::{ErrorStatus, SourceError};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the status code, the rest is the body.
    let status = u16::from_le_bytes([data[0], data[1]]);
    if let Ok(body) = std::str::from_utf8(&data[2..]) {
        // Parsing should never panic, whatever the service sent back.
        match HttpRateSource::parse_response(status, body) {
            Ok(response) => {
                // Basic invariants that should always hold:
                // 1. The status travels through unchanged
                assert_eq!(response.status(), status, "Status should pass through");

                // 2. Success responses carry a rate sheet, rejections never do
                if response.is_success() {
                    assert!(
                        response.rates().is_some(),
                        "Success responses should carry a rate sheet"
                    );
                } else {
                    assert!(
                        response.rates().is_none(),
                        "Rejections should never carry rates"
                    );
                    // 3. Every arrived rejection classifies without panicking
                    let _ = ErrorStatus::from_status_code(response.status());
                }
            }
            Err(fault) => {
                // 4. Only an undecodable success body is a parse fault
                assert!(
                    matches!(fault, SourceError::InvalidBody { .. }),
                    "Parse faults should always be InvalidBody"
                );
                let _ = ErrorStatus::from_source_error(&fault);
            }
        }
    }
});
