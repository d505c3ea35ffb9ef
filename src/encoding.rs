use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::models::{B64Bytes, Example, InferenceRequest};

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Wrap already-encoded image data in the single-example envelope.
pub fn request_from(b64_image: String) -> InferenceRequest {
    InferenceRequest {
        examples: vec![Example {
            image: B64Bytes { b64: b64_image },
        }],
    }
}

pub fn encode_image(bytes: &[u8]) -> InferenceRequest {
    request_from(to_base64(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(req: &InferenceRequest) -> Vec<u8> {
        assert_eq!(req.examples.len(), 1);
        STANDARD.decode(&req.examples[0].image.b64).unwrap()
    }

    #[test]
    fn round_trips_arbitrary_bytes() {
        let inputs: [&[u8]; 4] = [b"", &[0x01, 0x02], &[0xff, 0xfe, 0x00, 0x3e, 0x3f], b"\x89PNG\r\n"];
        for input in inputs {
            assert_eq!(decoded(&encode_image(input)), input);
        }
    }

    #[test]
    fn empty_image_encodes_to_empty_string() {
        assert_eq!(encode_image(b"").examples[0].image.b64, "");
    }

    #[test]
    fn uses_standard_alphabet_with_padding() {
        // 0xfb 0xff would be "-_8" in the URL-safe alphabet
        assert_eq!(to_base64(&[0xfb, 0xff]), "+/8=");
        let long = vec![0u8; 200];
        assert!(!to_base64(&long).contains('\n'));
    }

    #[test]
    fn serializes_to_backend_envelope() {
        let json = serde_json::to_value(encode_image(&[0x01, 0x02])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "examples": [ { "image": { "b64": "AQI=" } } ] })
        );
    }
}
