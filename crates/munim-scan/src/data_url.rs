//! Base64 data-URL encoding and decoding.
//!
//! Camera captures arrive as `data:image/...;base64,` URLs; the OCR tier
//! needs raw bytes.

use base64::Engine;

use munim_core::error::{MunimError, Result};

/// Decode a base64 data URL (or bare base64 payload) into raw bytes.
pub fn decode(data_url: &str) -> Result<Vec<u8>> {
    let payload = match data_url.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => data_url,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| MunimError::Scan(format!("Invalid image data URL: {}", e)))
}

/// Encode raw bytes as a data URL with the given MIME type.
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let url = encode(&bytes, "image/jpeg");
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode(&url).unwrap(), bytes);
    }

    #[test]
    fn test_decode_bare_base64() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"parchi");
        assert_eq!(decode(&encoded).unwrap(), b"parchi");
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode("data:image/png;base64,!!not-base64!!").is_err());
    }
}
