//! Uploads content with a single HTTP `PUT` to a storage gateway.
//!
//! Tags are sent as `X-Tag-<name>` headers in tag set order, the credential as a bearer token.
//! The gateway answers with the remote identifier as the response body.
//!
//! | response                 | result                                                     |
//! |--------------------------|------------------------------------------------------------|
//! | 2xx with non-empty body  | [Receipt](crate::upload::Receipt)                          |
//! | 401, 403                 | [Credential](crate::upload::UploadErrorKind::Credential)   |
//! | 402                      | [InsufficientFunds](crate::upload::UploadErrorKind::InsufficientFunds) |
//! | other status, empty body | [Rejected](crate::upload::UploadErrorKind::Rejected)       |
//! | no response              | [Network](crate::upload::UploadErrorKind::Network)         |
use std::time::Duration;

use ureq::{Agent, AgentBuilder};
use url::Url;

use log::{debug, info, error};

use crate::tag::TagSet;
use crate::upload::{
    Credentials,
    Receipt,
    UploadError,
    UploadErrorKind,
    Uploader,
};

const TAG_HEADER_PREFIX: &str = "X-Tag-";
const TIMEOUT_SECS: u64 = 300;

pub struct HttpUploader {
    agent: Agent,
    gateway: Url,
}

impl HttpUploader {

    pub fn new(gateway: Url) -> HttpUploader {
        let agent = AgentBuilder::new()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build();
        HttpUploader {
            agent,
            gateway,
        }
    }
}

impl Uploader for HttpUploader {
    fn upload(&self, credentials: &Credentials, data: &[u8], tags: &TagSet) -> Result<Receipt, UploadError> {
        let mut req = self.agent.put(self.gateway.as_str());
        if !credentials.is_empty() {
            req = req.set("Authorization", &format!("Bearer {}", credentials.token()));
        }
        for t in tags {
            req = req.set(&tag_header(&t.name), &t.value);
        }
        debug!("put {} bytes to {}", data.len(), self.gateway);

        match req.send_bytes(data) {
            Ok(v) => {
                let status = v.status();
                match v.into_string() {
                    Ok(body) => {
                        receipt_from_body(status, &body)
                    },
                    Err(e) => {
                        error!("cannot read response from {}: {}", self.gateway, e);
                        Err(UploadError::new(UploadErrorKind::Network, e.to_string()))
                    },
                }
            },
            Err(ureq::Error::Status(code, v)) => {
                let body = v.into_string().unwrap_or_default();
                Err(classify_status(code, &body))
            },
            Err(ureq::Error::Transport(e)) => {
                error!("upload to {} failed: {}", self.gateway, e);
                Err(UploadError::new(UploadErrorKind::Network, e.to_string()))
            },
        }
    }
}

fn tag_header(name: &str) -> String {
    let mut s = String::from(TAG_HEADER_PREFIX);
    s.push_str(name);
    s
}

fn receipt_from_body(status: u16, body: &str) -> Result<Receipt, UploadError> {
    let remote_id = body.trim();
    if remote_id.is_empty() {
        return Err(UploadError::new(UploadErrorKind::Rejected, format!("status {} with empty response", status)));
    }
    info!("gateway accepted upload as {}", remote_id);
    Ok(Receipt{
        remote_id: remote_id.to_string(),
    })
}

fn classify_status(code: u16, body: &str) -> UploadError {
    let kind = match code {
        401 | 403 => UploadErrorKind::Credential,
        402 => UploadErrorKind::InsufficientFunds,
        _ => UploadErrorKind::Rejected,
    };
    let body = body.trim();
    let diagnostic = if body.is_empty() {
        format!("status {}", code)
    } else {
        format!("status {}: {}", code, body)
    };
    UploadError::new(kind, diagnostic)
}
