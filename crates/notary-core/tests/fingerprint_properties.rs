//! Property tests for content fingerprints.
//!
//! Upload and verification agree only if fingerprinting is a pure function
//! of the input bytes and sensitive to every byte.

use notary_core::{sha256_fingerprint, ContentFingerprint};
use proptest::prelude::*;

proptest! {
    #[test]
    fn fingerprint_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(sha256_fingerprint(&data), sha256_fingerprint(&data));
    }

    #[test]
    fn appending_a_byte_changes_the_fingerprint(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        extra in any::<u8>(),
    ) {
        let mut extended = data.clone();
        extended.push(extra);
        prop_assert_ne!(sha256_fingerprint(&data), sha256_fingerprint(&extended));
    }

    #[test]
    fn hex_rendering_parses_back(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let fp = sha256_fingerprint(&data);
        let hex = fp.to_hex();
        prop_assert_eq!(hex.len(), 64);
        prop_assert_eq!(ContentFingerprint::from_hex(&hex).unwrap(), fp);
    }
}
