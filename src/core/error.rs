use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidInput,
    MalformedErrors,
    ErrorsWithData,
    UpstreamErrors,
    MissingData,
    MissingType,
    MissingId,
    UnknownType,
    TypeMismatch,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    type_name: Option<String>,
    id: Option<String>,
    relationship: Option<String>,
    hint: Option<String>,
    upstream: Option<Vec<Value>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            type_name: None,
            id: None,
            relationship: None,
            hint: None,
            upstream: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Original `errors` array from an upstream error document.
    /// Present only on `ErrorKind::UpstreamErrors`.
    pub fn upstream(&self) -> Option<&[Value]> {
        self.upstream.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_upstream(mut self, errors: Vec<Value>) -> Self {
        self.upstream = Some(errors);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {type_name})")?;
        }
        if let Some(id) = &self.id {
            write!(f, " (id: {id})")?;
        }
        if let Some(relationship) = &self.relationship {
            write!(f, " (relationship: {relationship})")?;
        }
        if let Some(upstream) = &self.upstream {
            write!(f, " ({} upstream errors)", upstream.len())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Suggested HTTP status for callers mapping decode failures to responses.
/// Conflict-class kinds (registry disagreements) map to 409; everything else
/// is a generic client error.
pub fn to_http_status(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::UnknownType | ErrorKind::TypeMismatch => 409,
        _ => 400,
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidInput => 1,
        ErrorKind::MalformedErrors => 2,
        ErrorKind::ErrorsWithData => 3,
        ErrorKind::UpstreamErrors => 4,
        ErrorKind::MissingData => 5,
        ErrorKind::MissingType => 6,
        ErrorKind::MissingId => 7,
        ErrorKind::UnknownType => 8,
        ErrorKind::TypeMismatch => 9,
    }
}
