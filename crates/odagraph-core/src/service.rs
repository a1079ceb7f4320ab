//! Service-URL helpers and OData version detection.
//!
//! The transport itself (fetching the metadata document) is the caller's
//! concern; this module only normalizes what the caller needs to send and
//! classifies what came back.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ODataVersion {
    V2,
    V3,
    V4,
    #[default]
    Unknown,
}

impl std::fmt::Display for ODataVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ODataVersion::V2 => "V2",
            ODataVersion::V3 => "V3",
            ODataVersion::V4 => "V4",
            ODataVersion::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Classifies a metadata document body by its declared version marker.
///
/// Some V2 services only announce themselves via the `DataServiceVersion`
/// response header; callers that kept the headers can fall back to
/// [`detect_version_header`].
pub fn detect_version(body: &str) -> ODataVersion {
    if body.contains("Version=\"4.0\"") {
        return ODataVersion::V4;
    }
    if body.contains("Version=\"2.0\"") {
        return ODataVersion::V2;
    }
    if body.contains("Version=\"3.0\"") {
        return ODataVersion::V3;
    }
    ODataVersion::Unknown
}

/// Classifies a `DataServiceVersion` header value.
pub fn detect_version_header(value: &str) -> ODataVersion {
    let value = value.trim();
    if value.starts_with("2.0") {
        return ODataVersion::V2;
    }
    if value.starts_with("3.0") {
        return ODataVersion::V3;
    }
    if value.starts_with("4.0") {
        return ODataVersion::V4;
    }
    ODataVersion::Unknown
}

/// Normalizes a service root or explicit metadata URL to the `$metadata`
/// document URL: `https://host/svc/` and `https://host/svc` both become
/// `https://host/svc/$metadata`; an input already ending in `$metadata` is
/// passed through unchanged.
pub fn metadata_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    let mut url = Url::parse(trimmed)?;
    if url.cannot_be_a_base() {
        return Err(Error::CannotBeABase {
            url: trimmed.to_string(),
        });
    }
    if url.path().ends_with("$metadata") {
        return Ok(url);
    }
    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{path}/$metadata"));
    Ok(url)
}
