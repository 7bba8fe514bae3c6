//! Minimal ABI encoding for the upgrade call and constructor arguments.

use alloy_core::primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};

/// Function: `upgradeTo(address)`
/// Selector: `0x3659cfe6`
const UPGRADE_TO_SELECTOR: [u8; 4] = [0x36, 0x59, 0xcf, 0xe6];

/// ABI-encode an `upgradeTo(address)` call.
pub fn upgrade_to_call(implementation: Address) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&UPGRADE_TO_SELECTOR);
    data.extend_from_slice(&address_word(implementation));
    Bytes::from(data)
}

/// Split a raw `--args` string into the ordered constructor literals.
///
/// `"1,2,3"` yields `["1", "2", "3"]`; `None` and a blank string both yield
/// an empty list, so passing `--args ""` is a no-op rather than an error.
pub fn parse_args(raw: Option<&str>) -> Vec<String> {
    match raw.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => raw.split(',').map(str::to_string).collect(),
    }
}

/// ABI-encode constructor arguments as a sequence of 32-byte words.
///
/// Only scalar literals are supported: addresses (`0x` + 40 hex chars),
/// booleans, and unsigned integers (decimal or `0x`-prefixed hex). Dynamic
/// types would change the head/tail layout and are rejected.
pub fn encode_constructor_args(args: &[String]) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(args.len() * 32);
    for arg in args {
        encoded.extend_from_slice(&encode_word(arg)?);
    }
    Ok(encoded)
}

/// Encode a single scalar literal as a left-padded 32-byte word.
fn encode_word(literal: &str) -> Result<[u8; 32]> {
    if literal == "true" {
        let mut word = [0u8; 32];
        word[31] = 1;
        return Ok(word);
    }
    if literal == "false" {
        return Ok([0u8; 32]);
    }

    if let Some(hex_part) = literal.strip_prefix("0x") {
        if hex_part.len() == 40 {
            let address: Address = literal
                .parse()
                .with_context(|| format!("Invalid address literal: '{}'", literal))?;
            return Ok(address_word(address));
        }
        let value = U256::from_str_radix(hex_part, 16)
            .with_context(|| format!("Invalid hex literal: '{}'", literal))?;
        return Ok(value.to_be_bytes::<32>());
    }

    let value = U256::from_str_radix(literal, 10).with_context(|| {
        format!(
            "Unsupported constructor argument: '{}' (expected address, bool or unsigned integer)",
            literal
        )
    })?;
    Ok(value.to_be_bytes::<32>())
}

/// Left-pad an address into a 32-byte word.
fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_to_call_layout() {
        let implementation: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            .parse()
            .unwrap();
        let calldata = upgrade_to_call(implementation);

        // 4-byte selector + one 32-byte word.
        assert_eq!(calldata.len(), 36);
        assert_eq!(&calldata[..4], &UPGRADE_TO_SELECTOR);
        assert_eq!(
            hex::encode(&calldata[4..]),
            "00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_parse_args_preserves_order() {
        assert_eq!(parse_args(Some("1,2,3")), vec!["1", "2", "3"]);
        assert_eq!(parse_args(None), Vec::<String>::new());
    }

    #[test]
    fn test_parse_args_blank_string_is_empty() {
        assert_eq!(parse_args(Some("")), Vec::<String>::new());
        assert_eq!(parse_args(Some("   ")), Vec::<String>::new());
        assert!(encode_constructor_args(&parse_args(Some(""))).unwrap().is_empty());
    }

    #[test]
    fn test_encode_uint_literals() {
        let encoded = encode_constructor_args(&parse_args(Some("1,2,3"))).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 2);
        assert_eq!(encoded[95], 3);
    }

    #[test]
    fn test_encode_empty_args() {
        let encoded = encode_constructor_args(&[]).unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_encode_bool_literals() {
        let encoded =
            encode_constructor_args(&["true".to_string(), "false".to_string()]).unwrap();
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[32..64], [0u8; 32]);
    }

    #[test]
    fn test_encode_address_literal() {
        let encoded = encode_constructor_args(&[
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        ])
        .unwrap();
        assert_eq!(
            hex::encode(&encoded),
            "00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_encode_hex_literal() {
        let encoded = encode_constructor_args(&["0xff".to_string()]).unwrap();
        assert_eq!(encoded[31], 0xff);
    }

    #[test]
    fn test_encode_rejects_strings() {
        assert!(encode_constructor_args(&["hello".to_string()]).is_err());
    }
}
