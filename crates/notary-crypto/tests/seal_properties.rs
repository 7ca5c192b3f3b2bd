//! Property tests for the sealed container.

use notary_crypto::{open, seal, CryptoError, SealedPayload, SealingKey};
use proptest::prelude::*;

fn file_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn open_inverts_seal(
        contents in proptest::collection::vec(any::<u8>(), 0..2048),
        name in file_name(),
        key_bytes in proptest::array::uniform32(any::<u8>()),
    ) {
        let key = SealingKey::from_bytes(&key_bytes).unwrap();
        let sealed = seal(&contents, &name, &key).unwrap();
        let opened = open(&sealed, &key).unwrap();
        prop_assert_eq!(opened.file_name, name);
        prop_assert_eq!(opened.contents, contents);
    }

    #[test]
    fn any_flipped_bit_fails_closed(
        contents in proptest::collection::vec(any::<u8>(), 0..512),
        name in file_name(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = SealingKey::from_bytes(&[42u8; 32]).unwrap();
        let mut bytes = seal(&contents, &name, &key).unwrap().into_bytes();
        let i = position.index(bytes.len());
        bytes[i] ^= 1 << bit;
        let tampered = SealedPayload::from_bytes(bytes).unwrap();
        prop_assert_eq!(open(&tampered, &key), Err(CryptoError::AuthenticationFailed));
    }
}

#[test]
fn truncated_tag_fails_closed() {
    let key = SealingKey::generate();
    let mut bytes = seal(b"hello", "hello.txt", &key).unwrap().into_bytes();
    bytes.pop();
    let truncated = SealedPayload::from_bytes(bytes).unwrap();
    assert_eq!(open(&truncated, &key), Err(CryptoError::AuthenticationFailed));
}
