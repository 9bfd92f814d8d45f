//! Conversion between typed values and persisted text

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed stored value: {0}")]
    Malformed(String),
}

/// Encode/decode pair for one value type.
///
/// `encode` must be a pure function of the value so repeated writes of the
/// same value produce the same text.
pub trait Codec<T> {
    fn encode(&self, value: &T) -> Result<String, CodecError>;
    fn decode(&self, raw: &str) -> Result<T, CodecError>;
}

/// Default codec: `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec {
    fn encode(&self, value: &T) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<T, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Codec assembled from a pair of closures
///
/// ```
/// use keepsake::{Codec, CodecError, FnCodec};
///
/// let csv = FnCodec::new(
///     |v: &Vec<u32>| v.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(","),
///     |s: &str| -> Result<Vec<u32>, CodecError> {
///         s.split(',')
///             .map(|p| p.parse().map_err(|_| CodecError::Malformed(p.to_string())))
///             .collect()
///     },
/// );
/// assert_eq!(csv.encode(&vec![4, 5, 6]).unwrap(), "4,5,6");
/// assert_eq!(csv.decode("4,5,6").unwrap(), vec![4, 5, 6]);
/// ```
#[derive(Clone, Copy)]
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D> {
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<E, D> std::fmt::Debug for FnCodec<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<T, E, D> Codec<T> for FnCodec<E, D>
where
    E: Fn(&T) -> String,
    D: Fn(&str) -> Result<T, CodecError>,
{
    fn encode(&self, value: &T) -> Result<String, CodecError> {
        Ok((self.encode)(value))
    }

    fn decode(&self, raw: &str) -> Result<T, CodecError> {
        (self.decode)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_codec_numbers() {
        let codec = JsonCodec;
        assert_eq!(Codec::<i32>::encode(&codec, &2).unwrap(), "2");
        assert_eq!(Codec::<i32>::decode(&codec, "99").unwrap(), 99);
    }

    #[test]
    fn test_json_codec_rejects_malformed() {
        let result: Result<i32, _> = JsonCodec.decode("{not json");
        assert!(matches!(result, Err(CodecError::Json(_))));

        // Valid JSON of the wrong shape is also a decode failure
        let result: Result<Vec<u8>, _> = JsonCodec.decode(r#""text""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_codec_encode_failure() {
        // Non-string map keys cannot be JSON object keys
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(JsonCodec.encode(&map).is_err());
    }

    #[test]
    fn test_fn_codec_decode_error() {
        let codec = FnCodec::new(
            |v: &u8| v.to_string(),
            |s: &str| s.parse::<u8>().map_err(|e| CodecError::Malformed(e.to_string())),
        );
        assert_eq!(codec.encode(&7).unwrap(), "7");
        assert!(matches!(codec.decode("300"), Err(CodecError::Malformed(_))));
    }
}
