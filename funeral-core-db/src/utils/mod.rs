use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use serde::Serialize;
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash64;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// This provides a stable hash across different runs and systems by:
/// - Serializing the data to CBOR format (deterministic binary representation)
/// - Using XxHash64 with a fixed seed (0) for consistent hashing
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

/// Converts command input into a bounded string, naming the field on overflow.
pub fn to_heapless<const N: usize>(value: &str, field: &str) -> ApiResult<HeaplessString<N>> {
    HeaplessString::from_str(value)
        .map_err(|_| ApiError::validation(format!("{field} is too long (max {N} chars)")))
}

pub fn to_optional_heapless<const N: usize>(
    value: Option<&str>,
    field: &str,
) -> ApiResult<Option<HeaplessString<N>>> {
    value.map(|v| to_heapless::<N>(v, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        amount: i64,
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let a = hash_as_i64(&Sample { name: "oak casket", amount: 2500 }).unwrap();
        let b = hash_as_i64(&Sample { name: "oak casket", amount: 2500 }).unwrap();
        let c = hash_as_i64(&Sample { name: "oak casket", amount: 2600 }).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_to_heapless_rejects_overflow() {
        assert_eq!(to_heapless::<4>("abcd", "code").unwrap().as_str(), "abcd");
        let err = to_heapless::<4>("abcde", "code").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: code is too long (max 4 chars)");
    }
}
