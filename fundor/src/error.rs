use std::fmt;

/// Category of a schema-generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The principal may not see the handler.
    PermissionDenied,
    /// A handler hook reported a missing object.
    NotFound,
    /// Any other API-level exception raised by a handler hook.
    Api,
    /// A configuration contract the host application must satisfy is broken.
    Misconfigured,
    /// The document could not be encoded.
    Serialization,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::PermissionDenied,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: msg.into(),
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Api,
            message: msg.into(),
        }
    }

    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Misconfigured,
            message: msg.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            message: msg.into(),
        }
    }

    /// HTTP status a host framework would use for this error.
    pub fn status(&self) -> u16 {
        match self.kind {
            ErrorKind::PermissionDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Api => 400,
            ErrorKind::Misconfigured | ErrorKind::Serialization => 500,
        }
    }

    /// Errors that hide a handler from the document instead of aborting it.
    pub fn is_visibility_denial(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::PermissionDenied | ErrorKind::NotFound | ErrorKind::Api
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::permission_denied("no").status(), 403);
        assert_eq!(Error::not_found("gone").status(), 404);
        assert_eq!(Error::api("bad").status(), 400);
        assert_eq!(Error::misconfigured("oops").status(), 500);
    }

    #[test]
    fn test_visibility_denial() {
        assert!(Error::permission_denied("no").is_visibility_denial());
        assert!(Error::not_found("gone").is_visibility_denial());
        assert!(Error::api("bad").is_visibility_denial());
        assert!(!Error::misconfigured("oops").is_visibility_denial());
        assert!(!Error::serialization("oops").is_visibility_denial());
    }

    #[test]
    fn test_display_is_message() {
        let err = Error::misconfigured("missing entity");
        assert_eq!(err.to_string(), "missing entity");
    }
}
