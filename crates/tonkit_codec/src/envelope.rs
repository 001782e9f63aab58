//! Tagged JSON envelopes.

use crate::error::{CodecError, CodecResult};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Field holding the record discriminator.
pub const TYPE_FIELD: &str = "@type";

/// Field carrying opaque request/response correlation data.
pub const EXTRA_FIELD: &str = "@extra";

/// A decoded wire record: a JSON object with a mandatory `"@type"` tag.
///
/// The envelope is an open view. It names no record kinds; callers interpret
/// the discriminator and read whichever fields the kind implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEnvelope {
    tag: String,
    fields: Map<String, Value>,
}

impl TaggedEnvelope {
    /// Wraps a decoded object, enforcing the discriminator invariant.
    ///
    /// Fails with [`CodecError::MissingTypeTag`] when `"@type"` is absent,
    /// empty, or not a string.
    pub fn new(fields: Map<String, Value>) -> CodecResult<Self> {
        let tag = match fields.get(TYPE_FIELD) {
            Some(Value::String(tag)) if !tag.is_empty() => tag.clone(),
            _ => return Err(CodecError::MissingTypeTag),
        };
        Ok(Self { tag, fields })
    }

    /// Returns the `"@type"` discriminator.
    pub fn type_tag(&self) -> &str {
        &self.tag
    }

    /// Returns the `"@extra"` correlation value, when present as a string.
    pub fn extra(&self) -> Option<&str> {
        self.get_str(EXTRA_FIELD)
    }

    /// Returns a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a string field by name.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns an integer field by name.
    ///
    /// The engine emits 64-bit values as decimal strings to survive JSON
    /// number precision limits, so both encodings are accepted.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(Value::Number(value)) => value.as_i64(),
            Some(Value::String(value)) => value.parse().ok(),
            _ => None,
        }
    }

    /// Returns all fields of the record.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the envelope, returning its fields.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// A decoded record together with its verbatim wire bytes.
///
/// Keeping the bytes lets callers re-decode into a typed shape with
/// [`RawResult::decode_as`] once the discriminator tells them which one.
#[derive(Debug, Clone)]
pub struct RawResult {
    envelope: TaggedEnvelope,
    raw: Bytes,
}

impl RawResult {
    /// Returns the decoded envelope.
    pub fn envelope(&self) -> &TaggedEnvelope {
        &self.envelope
    }

    /// Returns the `"@type"` discriminator.
    pub fn type_tag(&self) -> &str {
        self.envelope.type_tag()
    }

    /// Returns the verbatim wire bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the wire bytes as text.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Re-decodes the verbatim bytes into a typed shape.
    pub fn decode_as<T: DeserializeOwned>(&self) -> CodecResult<T> {
        serde_json::from_slice(&self.raw).map_err(|e| CodecError::decoding_failed(e.to_string()))
    }

    /// Consumes the result, returning the envelope.
    pub fn into_envelope(self) -> TaggedEnvelope {
        self.envelope
    }
}

/// Encodes a request into wire text.
///
/// The request's serialization must produce a JSON object carrying its own
/// `"@type"` field; the reserved request shapes do this by construction.
pub fn to_wire<T: Serialize>(value: &T) -> CodecResult<String> {
    serde_json::to_string(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Decodes wire bytes into a [`RawResult`].
///
/// Fails with [`CodecError::DecodingFailed`] on malformed JSON or a
/// non-object top level, and with [`CodecError::MissingTypeTag`] when the
/// discriminator invariant does not hold.
pub fn from_wire(raw: &[u8]) -> CodecResult<RawResult> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    let fields = match value {
        Value::Object(fields) => fields,
        _ => return Err(CodecError::decoding_failed("top-level value is not an object")),
    };
    let envelope = TaggedEnvelope::new(fields)?;
    Ok(RawResult {
        envelope,
        raw: Bytes::copy_from_slice(raw),
    })
}
