use std::fmt;

use base64::{
    display::Base64Display, engine::general_purpose::STANDARD, prelude::BASE64_STANDARD, Engine,
};

/// Represents an opaque payload blob. Stored internally as a `Vec<u8>`,
/// serialized as a base64 string. Serde is implemented manually as the
/// byte-per-byte default representation is both verbose and slow to parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPayload(pub Vec<u8>);

impl serde::Serialize for RawPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&Base64Display::new(&self.0, &STANDARD))
    }
}

impl<'de> serde::Deserialize<'de> for RawPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RawPayloadVisitor;

        impl serde::de::Visitor<'_> for RawPayloadVisitor {
            type Value = RawPayload;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("payload as base64 string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match BASE64_STANDARD.decode(value).map(RawPayload) {
                    Ok(v) => Ok(v),
                    Err(_) => Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Str(value),
                        &self,
                    )),
                }
            }
        }

        deserializer.deserialize_str(RawPayloadVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serde() {
        let payload = RawPayload(vec![0xde, 0xad, 0xbe, 0xef]);

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(&json, "\"3q2+7w==\"");

        let back: RawPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);

        assert!(serde_json::from_str::<RawPayload>("\"not base64!\"").is_err());
    }
}
