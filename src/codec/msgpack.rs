//! MsgPack codec using `rmp-serde`.
//!
//! Always `to_vec_named`: structs go out as maps keyed by field name, which is
//! what the host side expects. `to_vec` would emit positional arrays.

use crate::error::Result;

/// MessagePack codec for call payloads.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UrlsError;
    use crate::uri::UriComponents;

    #[test]
    fn test_uri_components_encode_as_map() {
        let uri = UriComponents::new("https")
            .authority("example.com")
            .path("/cb");

        let encoded = MsgPackCodec::encode(&uri).unwrap();

        // fixmap with 3 entries; None fields are skipped
        assert_eq!(encoded[0], 0x83);
    }

    #[test]
    fn test_decode_components_with_missing_fields() {
        #[derive(serde::Serialize)]
        struct SchemeOnly {
            scheme: &'static str,
        }

        let encoded = MsgPackCodec::encode(&SchemeOnly { scheme: "vscode" }).unwrap();
        let decoded: UriComponents = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded, UriComponents::new("vscode"));
    }

    #[test]
    fn test_decode_components_with_nil_fields() {
        // Node.js sends `undefined` members as nil when they are present
        #[derive(serde::Serialize)]
        struct WithNil {
            scheme: &'static str,
            authority: Option<&'static str>,
            path: &'static str,
        }

        let encoded = MsgPackCodec::encode(&WithNil {
            scheme: "https",
            authority: None,
            path: "/x",
        })
        .unwrap();
        let decoded: UriComponents = MsgPackCodec::decode(&encoded).unwrap();

        assert!(decoded.authority.is_none());
        assert_eq!(decoded.path.as_deref(), Some("/x"));
    }

    #[test]
    fn test_string_list() {
        let domains = vec!["*.example.com".to_string(), "github.com".to_string()];
        let encoded = MsgPackCodec::encode(&domains).unwrap();

        // fixarray with 2 elements
        assert_eq!(encoded[0], 0x92);

        let decoded: Vec<String> = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, domains);
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let result: Result<UriComponents> = MsgPackCodec::decode(b"not valid msgpack");
        assert!(matches!(result, Err(UrlsError::MsgPackDecode(_))));
    }
}
