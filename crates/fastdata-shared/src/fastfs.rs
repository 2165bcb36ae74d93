//! FastFS upload payload.
//!
//! The receiving contract decodes the argument of `__fastdata_fastfs` with a
//! fixed Borsh schema, so the layout here must not drift:
//!
//! ```text
//! FastfsData        = enum { Simple(SimpleFastfs) }        u8 tag
//! SimpleFastfs      = { relative_path: string,             u32 LE len + utf8
//!                       content: option<FastfsFileContent> } u8 flag
//! FastfsFileContent = { mime_type: string,                 u32 LE len + utf8
//!                       content: bytes }                   u32 LE len + bytes
//! ```

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::EncodeError;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FastfsFileContent {
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SimpleFastfs {
    pub relative_path: String,
    pub content: Option<FastfsFileContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum FastfsData {
    Simple(SimpleFastfs),
}

impl FastfsData {
    pub fn simple(relative_path: impl Into<String>, content: Option<FastfsFileContent>) -> Self {
        Self::Simple(SimpleFastfs {
            relative_path: relative_path.into(),
            content,
        })
    }

    pub fn relative_path(&self) -> &str {
        match self {
            Self::Simple(simple) => &simple.relative_path,
        }
    }

    /// Serialize to the contract's Borsh layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        borsh::to_vec(self).map_err(EncodeError::from)
    }

    /// Deserialize from the contract's Borsh layout.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EncodeError> {
        borsh::from_slice(data).map_err(EncodeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FastfsData {
        FastfsData::simple(
            "a/b.txt",
            Some(FastfsFileContent {
                mime_type: "text/plain".to_string(),
                content: vec![1, 2, 3],
            }),
        )
    }

    #[test]
    fn test_roundtrip() {
        let data = sample();
        let bytes = data.to_bytes().unwrap();
        assert_eq!(FastfsData::from_bytes(&bytes).unwrap(), data);
    }

    #[test]
    fn test_exact_layout() {
        let bytes = sample().to_bytes().unwrap();

        let mut expected = vec![0u8];
        expected.extend_from_slice(&7u32.to_le_bytes());
        expected.extend_from_slice(b"a/b.txt");
        expected.push(1);
        expected.extend_from_slice(&10u32.to_le_bytes());
        expected.extend_from_slice(b"text/plain");
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.extend_from_slice(&[1, 2, 3]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_absent_content() {
        let bytes = FastfsData::simple("dir/", None).to_bytes().unwrap();
        assert_eq!(bytes, [0, 4, 0, 0, 0, b'd', b'i', b'r', b'/', 0]);
    }

    #[test]
    fn test_truncated_input_fails() {
        let bytes = sample().to_bytes().unwrap();
        assert!(FastfsData::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_unknown_variant_fails() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = 1;
        assert!(FastfsData::from_bytes(&bytes).is_err());
    }
}
