//! # Tonkit Codec
//!
//! Tagged JSON envelope encoding/decoding for Tonkit.
//!
//! Every record crossing the node-engine boundary is one line of JSON text:
//! an object whose `"@type"` field names the record kind. This crate provides:
//! - [`to_wire`] / [`from_wire`], the only places where bytes become structure
//! - [`TaggedEnvelope`], the open view over any decoded record
//! - [`RawResult`], a decoded record plus its verbatim bytes for typed
//!   re-decoding
//!
//! The codec enforces exactly one structural invariant: a decoded record has
//! a non-empty string `"@type"`. Everything else is interpretation, which
//! belongs to the layers above.
//!
//! ## Usage
//!
//! ```
//! use tonkit_codec::from_wire;
//!
//! let raw = from_wire(br#"{"@type":"ok","@extra":"req-7"}"#).unwrap();
//! assert_eq!(raw.type_tag(), "ok");
//! assert_eq!(raw.envelope().extra(), Some("req-7"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod error;

pub use envelope::{from_wire, to_wire, RawResult, TaggedEnvelope, EXTRA_FIELD, TYPE_FIELD};
pub use error::{CodecError, CodecResult};
