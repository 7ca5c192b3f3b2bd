//! # Contract ABI Encoding
//!
//! Hand-rolled Solidity ABI encoding for the two shapes the `HashStorage`
//! contract uses: a `storeHash(string)` call and a
//! `HashStored(string,uint256,uint256)` event with all arguments
//! non-indexed. Function selectors and event topics are Keccak-256 digests
//! of the canonical signatures.

use sha3::{Digest, Keccak256};

use crate::error::LedgerError;

/// Canonical signature of the store function.
pub const STORE_HASH_SIGNATURE: &str = "storeHash(string)";

/// Canonical signature of the emitted event.
pub const HASH_STORED_SIGNATURE: &str = "HashStored(string,uint256,uint256)";

const WORD: usize = 32;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// First four bytes of the Keccak-256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `topics[0]` of an event, as a `0x`-prefixed lowercase hex string.
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// `0x`-prefixed calldata for `storeHash(value)`.
///
/// Layout: selector, head word holding the offset of the string (0x20),
/// length word, then the UTF-8 bytes right-padded to a word boundary.
pub fn encode_store_hash(value: &str) -> String {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 2 * WORD + padded_len);
    data.extend_from_slice(&selector(STORE_HASH_SIGNATURE));
    data.extend_from_slice(&u64_word(WORD as u64));
    data.extend_from_slice(&u64_word(bytes.len() as u64));
    data.extend_from_slice(bytes);
    data.resize(4 + 2 * WORD + padded_len, 0);

    format!("0x{}", hex::encode(data))
}

/// Decoded arguments of a `HashStored` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashStoredEvent {
    /// The stored string.
    pub hash: String,
    /// Contract timestamp (`block.timestamp` at storage time).
    pub timestamp: u64,
    /// Position in the contract's list of hashes.
    pub index: u64,
}

/// Decode the `data` field of a `HashStored` log.
pub fn decode_hash_stored(data_hex: &str) -> Result<HashStoredEvent, LedgerError> {
    let data = decode_hex_data(data_hex)?;
    if data.len() < 3 * WORD {
        return Err(LedgerError::AbiDecode(format!(
            "event data too short: {} bytes",
            data.len()
        )));
    }

    let offset = word_to_usize(&data[..WORD])?;
    let timestamp = word_to_u64(&data[WORD..2 * WORD])?;
    let index = word_to_u64(&data[2 * WORD..3 * WORD])?;

    let len_end = offset
        .checked_add(WORD)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| LedgerError::AbiDecode(format!("string offset {offset} out of range")))?;
    let len = word_to_usize(&data[offset..len_end])?;
    let str_end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| LedgerError::AbiDecode(format!("string length {len} out of range")))?;

    let hash = String::from_utf8(data[len_end..str_end].to_vec())
        .map_err(|_| LedgerError::AbiDecode("stored string is not UTF-8".into()))?;

    Ok(HashStoredEvent {
        hash,
        timestamp,
        index,
    })
}

/// Parse a JSON-RPC hex quantity (`0x1a`) into a `u64`.
pub fn parse_quantity(value: &str) -> Option<u64> {
    let body = value.strip_prefix("0x")?;
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(body, 16).ok()
}

fn decode_hex_data(data_hex: &str) -> Result<Vec<u8>, LedgerError> {
    let body = data_hex.strip_prefix("0x").unwrap_or(data_hex);
    hex::decode(body).map_err(|e| LedgerError::AbiDecode(format!("invalid hex data: {e}")))
}

fn u64_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_to_u64(word: &[u8]) -> Result<u64, LedgerError> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(LedgerError::AbiDecode("uint256 value exceeds u64".into()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(buf))
}

fn word_to_usize(word: &[u8]) -> Result<usize, LedgerError> {
    usize::try_from(word_to_u64(word)?)
        .map_err(|_| LedgerError::AbiDecode("offset exceeds address space".into()))
}

/// Encode a `HashStored` event's `data` field. Used by tests and mock nodes.
pub fn encode_hash_stored(event: &HashStoredEvent) -> String {
    let bytes = event.hash.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 * WORD + padded_len);
    data.extend_from_slice(&u64_word(3 * WORD as u64));
    data.extend_from_slice(&u64_word(event.timestamp));
    data.extend_from_slice(&u64_word(event.index));
    data.extend_from_slice(&u64_word(bytes.len() as u64));
    data.extend_from_slice(bytes);
    data.resize(4 * WORD + padded_len, 0);

    format!("0x{}", hex::encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_empty_input_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn selector_matches_erc20_transfer() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn topic_matches_erc20_transfer_event() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn store_hash_calldata_layout() {
        let fp = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        let calldata = encode_store_hash(fp);
        let raw = hex::decode(&calldata[2..]).unwrap();

        // selector + offset + length + 64 bytes of string (2 words)
        assert_eq!(raw.len(), 4 + 32 + 32 + 64);
        assert_eq!(&raw[..4], &selector(STORE_HASH_SIGNATURE));
        assert_eq!(raw[4 + 31], 0x20);
        assert_eq!(raw[4 + 32 + 31], 64);
        assert_eq!(&raw[4 + 64..], fp.as_bytes());
    }

    #[test]
    fn short_strings_are_right_padded() {
        let raw = hex::decode(&encode_store_hash("abc")[2..]).unwrap();
        assert_eq!(raw.len(), 4 + 32 + 32 + 32);
        assert_eq!(&raw[68..71], b"abc");
        assert!(raw[71..].iter().all(|b| *b == 0));
    }

    #[test]
    fn empty_string_has_no_data_words() {
        let raw = hex::decode(&encode_store_hash("")[2..]).unwrap();
        assert_eq!(raw.len(), 4 + 64);
    }

    #[test]
    fn decode_inverts_encode_for_event_data() {
        let event = HashStoredEvent {
            hash: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".into(),
            timestamp: 1_726_000_000,
            index: 41,
        };
        assert_eq!(decode_hash_stored(&encode_hash_stored(&event)).unwrap(), event);
    }

    #[test]
    fn decode_rejects_truncated_data() {
        assert!(matches!(
            decode_hash_stored("0x00"),
            Err(LedgerError::AbiDecode(_))
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_offset() {
        let mut data = vec![0u8; 96];
        data[31] = 0xff;
        let hex_data = format!("0x{}", hex::encode(data));
        assert!(matches!(
            decode_hash_stored(&hex_data),
            Err(LedgerError::AbiDecode(_))
        ));
    }

    #[test]
    fn decode_rejects_oversized_uint() {
        let mut data = hex::decode(
            &encode_hash_stored(&HashStoredEvent {
                hash: "x".into(),
                timestamp: 1,
                index: 0,
            })[2..],
        )
        .unwrap();
        data[32] = 1; // high byte of the timestamp word
        assert!(decode_hash_stored(&hex::encode(data)).is_err());
    }

    #[test]
    fn parse_quantity_handles_hex() {
        assert_eq!(parse_quantity("0x1a"), Some(26));
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("0x"), None);
        assert_eq!(parse_quantity("26"), None);
    }
}
