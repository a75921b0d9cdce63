//! Composite job identifier stored as a single process variable.
//!
//! A generation job is owned by one tenant, so the engine-side state carries
//! both parts as one opaque string: `job:{tenantId}/{requestId}`. [`JobPath`]
//! is the only way that string is produced or consumed; raw strings never
//! cross the subsystem boundary.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Prefix identifying an encoded job path.
pub const JOB_PATH_PREFIX: &str = "job:";

/// Errors from constructing or decoding a [`JobPath`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobPathError {
    /// A constructor argument violates the job path invariants.
    #[error("invalid job path argument: {0}")]
    InvalidArgument(String),

    /// An encoded string could not be decoded back into a job path.
    #[error("malformed job path: {0}")]
    Malformed(String),
}

/// Validated `{tenantId, requestId}` pair identifying one generation job.
///
/// Invariants: both parts are non-empty and the request id contains no `/`.
/// `decode(encode(t, r)) == (t, r)` holds for every value this type admits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobPath {
    tenant_id: String,
    request_id: String,
}

impl JobPath {
    /// Build a job path, validating both segments.
    pub fn new(
        tenant_id: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Result<Self, JobPathError> {
        let tenant_id = tenant_id.into();
        let request_id = request_id.into();

        if tenant_id.is_empty() {
            return Err(JobPathError::InvalidArgument(
                "tenant id must not be empty".into(),
            ));
        }
        if request_id.is_empty() {
            return Err(JobPathError::InvalidArgument(
                "request id must not be empty".into(),
            ));
        }
        if request_id.contains('/') {
            return Err(JobPathError::InvalidArgument(format!(
                "request id must not contain '/': {request_id}"
            )));
        }

        Ok(Self {
            tenant_id,
            request_id,
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Serialize to the `job:{tenantId}/{requestId}` wire form.
    pub fn encode(&self) -> String {
        format!("{JOB_PATH_PREFIX}{}/{}", self.tenant_id, self.request_id)
    }
}

impl fmt::Display for JobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for JobPath {
    type Err = JobPathError;

    /// Decode an encoded job path.
    ///
    /// Splits on the last `/` so the request-id segment (which admits no
    /// slash) is unambiguous regardless of the tenant segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(JOB_PATH_PREFIX)
            .ok_or_else(|| JobPathError::Malformed(format!("missing '{JOB_PATH_PREFIX}' prefix: {s}")))?;

        let (tenant_id, request_id) = rest
            .rsplit_once('/')
            .ok_or_else(|| JobPathError::Malformed(format!("missing '/' separator: {s}")))?;

        if tenant_id.is_empty() || request_id.is_empty() {
            return Err(JobPathError::Malformed(format!("empty segment: {s}")));
        }

        Self::new(tenant_id, request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn encode_produces_expected_format() {
        let path = JobPath::new("acme", "r-1").unwrap();
        assert_eq!(path.encode(), "job:acme/r-1");
        assert_eq!(path.to_string(), "job:acme/r-1");
    }

    #[test]
    fn decode_extracts_tenant_and_request_id() {
        let path: JobPath = "job:demo-tenant/550e8400-e29b-41d4-a716-446655440000"
            .parse()
            .unwrap();
        assert_eq!(path.tenant_id(), "demo-tenant");
        assert_eq!(path.request_id(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn round_trips_through_encode_and_decode() {
        let request_id = Uuid::new_v4().to_string();
        let original = JobPath::new("my-tenant", request_id.clone()).unwrap();
        let decoded: JobPath = original.encode().parse().unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.request_id(), request_id);
    }

    #[test]
    fn new_rejects_empty_tenant() {
        let err = JobPath::new("", "r-1").unwrap_err();
        assert!(matches!(err, JobPathError::InvalidArgument(_)));
    }

    #[test]
    fn new_rejects_empty_request_id() {
        let err = JobPath::new("acme", "").unwrap_err();
        assert!(matches!(err, JobPathError::InvalidArgument(_)));
    }

    #[test]
    fn new_rejects_slash_in_request_id() {
        let err = JobPath::new("acme", "a/b").unwrap_err();
        assert!(matches!(err, JobPathError::InvalidArgument(_)));
    }

    #[test]
    fn decode_rejects_missing_prefix() {
        let err = "invalid:prefix/abc".parse::<JobPath>().unwrap_err();
        assert!(matches!(err, JobPathError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_missing_separator() {
        let err = "job:no-slash".parse::<JobPath>().unwrap_err();
        assert!(matches!(err, JobPathError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_empty_segments() {
        assert!("job:/r-1".parse::<JobPath>().is_err());
        assert!("job:acme/".parse::<JobPath>().is_err());
        assert!("job:/".parse::<JobPath>().is_err());
    }

    #[test]
    fn decode_rejects_empty_string() {
        assert!("".parse::<JobPath>().is_err());
    }
}
