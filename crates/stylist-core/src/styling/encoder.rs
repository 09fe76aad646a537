//! Base64 encoding for inline image payloads
//!
//! Standard alphabet with padding, no line breaks and no `data:` prefix.

use std::io::Read;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::{Error, Result};

/// Encode image bytes for a JSON request body
pub fn encode(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(Error::EncodingError("image is empty".to_string()));
    }
    Ok(BASE64.encode(bytes))
}

/// Read a whole stream and encode it
pub fn encode_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::EncodingError(e.to_string()))?;
    encode(&bytes)
}

/// Decode a payload produced by [`encode`] or returned by the service
pub fn decode(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|e| Error::EncodingError(format!("invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn samples() -> Vec<Vec<u8>> {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0xFF];
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        let mut webp = b"RIFF\x24\x00\x00\x00WEBPVP8 ".to_vec();
        webp.extend((0u8..=255).collect::<Vec<_>>());
        vec![png, jpeg, webp]
    }

    #[test]
    fn test_encode_is_lossless_for_supported_types() {
        for bytes in samples() {
            let text = encode(&bytes).unwrap();
            assert_eq!(decode(&text).unwrap(), bytes);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        for bytes in samples() {
            assert_eq!(encode(&bytes).unwrap(), encode(&bytes).unwrap());
        }
    }

    #[test]
    fn test_encode_has_no_prefix_or_line_breaks() {
        let bytes = vec![0xABu8; 4096];
        let text = encode(&bytes).unwrap();
        assert!(!text.contains('\n'));
        assert!(!text.contains('\r'));
        assert!(!text.starts_with("data:"));
        assert_eq!(encode(b"hi").unwrap(), "aGk=");
    }

    #[test]
    fn test_encode_empty_fails() {
        assert!(matches!(encode(&[]), Err(Error::EncodingError(_))));
        assert!(matches!(
            encode_reader(io::empty()),
            Err(Error::EncodingError(_))
        ));
    }

    #[test]
    fn test_encode_reader_matches_encode() {
        let bytes = b"\xFF\xD8\xFFjpeg-ish".to_vec();
        assert_eq!(
            encode_reader(io::Cursor::new(bytes.clone())).unwrap(),
            encode(&bytes).unwrap()
        );
    }

    #[test]
    fn test_encode_reader_unreadable_stream() {
        let err = encode_reader(BrokenReader).unwrap_err();
        assert!(matches!(err, Error::EncodingError(ref msg) if msg.contains("denied")));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not base64!"), Err(Error::EncodingError(_))));
    }
}
