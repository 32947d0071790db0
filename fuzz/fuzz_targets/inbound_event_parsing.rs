#![no_main]

//! Fuzz target for inbound event parsing and normalization.
//!
//! Feeds arbitrary bytes through request validation and, when a document
//! parses, through the full normalization and serialization path. The
//! pipeline must never panic, whatever the mini-app (or anyone else on
//! the network) sends.

use libfuzzer_sys::fuzz_target;
use skybridge_core::{normalize, validate_request, RequestMeta, TestClock};

fuzz_target!(|data: &[u8]| {
    let Ok(validated) = validate_request("POST", data) else {
        return;
    };

    let clock = TestClock::at_unix_seconds(1_767_225_600);
    let meta = RequestMeta {
        remote_addr: Some("203.0.113.9".to_string()),
        user_agent: None,
        server_name: None,
    };

    // Normalization is total and its output always serializes.
    let payload = normalize(&validated.event, &meta, &clock);
    let serialized = serde_json::to_string(&payload).expect("canonical payload serializes");
    assert!(!serialized.is_empty());
});
