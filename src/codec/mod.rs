//! Codec module - payload serialization for host calls.
//!
//! Inbound calls (`$handleExternalUri`, `$updateTrustedDomains`) and outbound
//! message parameters are MessagePack maps with named fields, the layout a
//! Node.js host decodes with `@msgpack/msgpack`.
//!
//! # Example
//!
//! ```
//! use procwire_urls::codec::MsgPackCodec;
//! use procwire_urls::uri::UriComponents;
//!
//! let uri = UriComponents::new("https").authority("example.com");
//! let encoded = MsgPackCodec::encode(&uri).unwrap();
//! let decoded: UriComponents = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, uri);
//! ```

mod msgpack;

pub use msgpack::MsgPackCodec;
