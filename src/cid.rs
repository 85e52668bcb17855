//! Content identifiers are CIDv1 values over the `raw` codec with a sha2-256 multihash,
//! rendered as lowercase base32 multibase text (prefix `b`, no padding).
//!
//! The identifier depends on the content bytes only. The same bytes will always produce the same
//! identifier, regardless of file name, time or host.
//!
//! ``` ignore,
//! bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku
//! ```
//!
//! is the identifier of empty content.
use std::fmt;
use std::str::FromStr;

use ::cid::{
    Cid,
    Version,
};
use ::cid::multihash::Multihash;
use sha2::{Sha256, Digest};
use serde::{
    Serialize,
    Serializer,
};
use thiserror::Error;

use log::debug;

/// Multicodec code for `raw` binary content.
pub const CODEC_RAW: u64 = 0x55;
/// Multihash code for sha2-256.
pub const MULTIHASH_SHA2_256: u64 = 0x12;
/// Digest length for sha2-256.
pub const DIGEST_LENGTH: usize = 32;
/// Multibase prefix for rfc4648 lowercase base32 without padding.
pub const MULTIBASE_BASE32: char = 'b';

#[derive(Debug, Error)]
pub enum ContentIdError {
    #[error("unsupported multibase prefix in {0:?}")]
    Multibase(String),
    #[error("invalid content identifier: {0}")]
    Parse(#[from] ::cid::Error),
    #[error("not a cidv1 identifier")]
    Version,
    #[error("unsupported codec 0x{0:x}")]
    Codec(u64),
    #[error("unsupported multihash 0x{0:x}")]
    Hash(u64),
    #[error("declared digest length {0} does not match sha2-256")]
    Length(u8),
    #[error("{0:?} is not in canonical form")]
    NonCanonical(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId {
    cid: Cid,
}

impl ContentId {

    /// Derive the identifier for the given content.
    pub fn from_bytes(data: &[u8]) -> ContentId {
        let mut h = Sha256::new();
        h.update(data);
        let digest = h.finalize();
        debug!("sha256 {} for {} bytes", hex::encode(&digest), data.len());
        // a 32 byte digest always fits the 64 byte multihash
        let mh = Multihash::<64>::wrap(MULTIHASH_SHA2_256, &digest)
            .expect("sha2-256 digest fits multihash");
        ContentId{
            cid: Cid::new_v1(CODEC_RAW, mh),
        }
    }

    /// The raw sha2-256 digest of the content.
    pub fn digest(&self) -> &[u8] {
        self.cid.hash().digest()
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }

    /// Binary CID: version, codec, multihash code, digest length, digest.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cid.to_bytes()
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.cid.to_string())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ContentId({})", self)
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;

    /// Only the exact text [Display](fmt::Display) produces is accepted.
    fn from_str(s: &str) -> Result<ContentId, ContentIdError> {
        if !s.starts_with(MULTIBASE_BASE32) {
            return Err(ContentIdError::Multibase(s.to_string()));
        }
        let cid = Cid::try_from(s)?;
        if cid.version() != Version::V1 {
            return Err(ContentIdError::Version);
        }
        if cid.codec() != CODEC_RAW {
            return Err(ContentIdError::Codec(cid.codec()));
        }
        if cid.hash().code() != MULTIHASH_SHA2_256 {
            return Err(ContentIdError::Hash(cid.hash().code()));
        }
        if cid.hash().size() as usize != DIGEST_LENGTH {
            return Err(ContentIdError::Length(cid.hash().size()));
        }
        if cid.to_string() != s {
            return Err(ContentIdError::NonCanonical(s.to_string()));
        }
        Ok(ContentId{
            cid,
        })
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ::cid::Cid;
    use ::cid::multihash::Multihash;

    use super::{
        ContentId,
        ContentIdError,
        CODEC_RAW,
        MULTIHASH_SHA2_256,
    };

    const HELLO: &str = "bafkreifjjcie6lypi6ny7amxnfftagclbuxndqonfipmb64f2km2devei4";

    #[test]
    fn test_empty() {
        let id = ContentId::from_bytes(b"");
        assert_eq!(id.to_string(), "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku");
        assert_eq!(id.digest_hex(), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn test_known_content() {
        let id = ContentId::from_bytes(b"hello world\n");
        assert_eq!(id.to_string(), HELLO);

        let id = ContentId::from_bytes(b"foo");
        assert_eq!(id.to_string(), "bafkreibme22gw2h7y2h7tg2fhqotaqjucnbc24deqo72b6mkl2egezxhvy");
        assert_eq!(id.digest_hex(), "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae");

        let b = id.to_bytes();
        assert_eq!(b[..4], [0x01, 0x55, 0x12, 0x20]);
        assert_eq!(b.len(), 36);
    }

    #[test]
    fn test_deterministic() {
        let inputs: Vec<Vec<u8>> = vec!(
            vec!(),
            vec!(0x00),
            b"# title\n\nsome markdown\n".to_vec(),
            (0..=255u8).cycle().take(70000).collect(),
        );
        for data in inputs.iter() {
            let a = ContentId::from_bytes(data);
            let b = ContentId::from_bytes(&data.clone());
            assert_eq!(a, b);
            assert_eq!(a.to_string(), b.to_string());
        }
        assert_ne!(ContentId::from_bytes(b"foo"), ContentId::from_bytes(b"foo\n"));
    }

    #[test]
    fn test_parse() {
        let id = ContentId::from_bytes(b"hello world\n");
        let parsed = ContentId::from_str(HELLO).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), HELLO);

        match ContentId::from_str("zafkrei") {
            Err(ContentIdError::Multibase(_)) => {},
            v => panic!("expected multibase error, got {:?}", v),
        }
        match ContentId::from_str("bafkrei1") {
            Err(ContentIdError::Parse(_)) => {},
            v => panic!("expected parse error, got {:?}", v),
        }
        // cidv1 dag-pb
        match ContentId::from_str("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi") {
            Err(ContentIdError::Codec(0x70)) => {},
            v => panic!("expected codec error, got {:?}", v),
        }
    }

    #[test]
    fn test_parse_rejects_trailing_character() {
        let s = format!("{}a", HELLO);
        assert!(ContentId::from_str(&s).is_err());
    }

    #[test]
    fn test_parse_rejects_changed_padding_bits() {
        // the final character carries 2 unused bits, '5' differs from '4' only in those
        let mut s = HELLO.to_string();
        s.pop();
        s.push('5');
        assert!(ContentId::from_str(&s).is_err());
    }

    #[test]
    fn test_parse_reports_declared_length() {
        let mh = Multihash::<64>::wrap(MULTIHASH_SHA2_256, &[0x2a; 20]).unwrap();
        let s = Cid::new_v1(CODEC_RAW, mh).to_string();
        match ContentId::from_str(&s) {
            Err(ContentIdError::Length(20)) => {},
            v => panic!("expected length error, got {:?}", v),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let s = format!("b{}", HELLO[1..].to_uppercase());
        assert!(ContentId::from_str(&s).is_err());
    }

    #[test]
    fn test_serialize() {
        let id = ContentId::from_bytes(b"");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku\"");
    }
}
