use url::Url;
use thiserror::Error;

/// Viewer used when none is configured.
pub const DEFAULT_EXPLORER: &str = "https://viewblock.io/arweave/tx/";

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("invalid explorer url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("explorer url {0} cannot have path segments")]
    NotBase(String),
}

/// Turns remote identifiers into URLs on a block explorer style viewer.
///
/// This is string formatting only, the URL is never fetched.
#[derive(Debug, Clone)]
pub struct Explorer {
    base: Url,
}

impl Explorer {

    pub fn new(base: &str) -> Result<Explorer, ExplorerError> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(ExplorerError::NotBase(base.to_string()));
        }
        Ok(Explorer {
            base,
        })
    }

    /// URL for the given remote identifier. The identifier becomes a single, percent-encoded
    /// path segment.
    pub fn url_for(&self, remote_id: &str) -> Url {
        let mut u = self.base.clone();
        if let Ok(mut segments) = u.path_segments_mut() {
            segments.pop_if_empty().push(remote_id);
        }
        u
    }
}

impl Default for Explorer {
    fn default() -> Explorer {
        Explorer {
            base: Url::parse(DEFAULT_EXPLORER).expect("default explorer url is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Explorer,
        ExplorerError,
    };

    #[test]
    fn test_default() {
        let e = Explorer::default();
        let u = e.url_for("abc-DEF_123");
        assert_eq!(u.as_str(), "https://viewblock.io/arweave/tx/abc-DEF_123");
    }

    #[test]
    fn test_no_trailing_slash() {
        let e = Explorer::new("https://example.org/tx").unwrap();
        assert_eq!(e.url_for("foo").as_str(), "https://example.org/tx/foo");
    }

    #[test]
    fn test_segment_escaped() {
        let e = Explorer::new("https://example.org/tx/").unwrap();
        assert_eq!(e.url_for("a/b?c").as_str(), "https://example.org/tx/a%2Fb%3Fc");
    }

    #[test]
    fn test_invalid() {
        match Explorer::new("not a url") {
            Err(ExplorerError::Parse(_)) => {},
            v => panic!("expected parse error, got {:?}", v),
        }
        match Explorer::new("mailto:foo@example.org") {
            Err(ExplorerError::NotBase(_)) => {},
            v => panic!("expected base error, got {:?}", v),
        }
    }
}
