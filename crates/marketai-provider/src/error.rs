use thiserror::Error;

const UNAVAILABLE_STATUS_CODE: u16 = 503;
const UNAVAILABLE_STATUS_LABEL: &str = "UNAVAILABLE";

/// Whether retrying a failed call can be expected to help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service reported temporary unavailability (503 / `UNAVAILABLE`).
    Transient,
    /// Anything else: bad credential, malformed request, quota, transport.
    Permanent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

/// Classify an upstream failure from its HTTP status and the provider's
/// textual status label. Only service unavailability is transient.
pub fn classify(status_code: Option<u16>, status_label: Option<&str>) -> ErrorKind {
    if status_code == Some(UNAVAILABLE_STATUS_CODE) || status_label == Some(UNAVAILABLE_STATUS_LABEL)
    {
        ErrorKind::Transient
    } else {
        ErrorKind::Permanent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "gemini api error ({}){}: {}",
    describe_status(.status_code, .status_label),
    kind_marker(.kind),
    .message
)]
pub struct InferenceError {
    pub kind: ErrorKind,
    pub status_code: Option<u16>,
    pub status_label: Option<String>,
    pub message: String,
}

impl InferenceError {
    pub fn from_status(
        status_code: u16,
        status_label: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: classify(Some(status_code), status_label.as_deref()),
            status_code: Some(status_code),
            status_label,
            message: message.into(),
        }
    }

    /// A 503 `UNAVAILABLE` failure, as the service reports overload.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::from_status(
            UNAVAILABLE_STATUS_CODE,
            Some(UNAVAILABLE_STATUS_LABEL.to_string()),
            message,
        )
    }

    /// A failure with no upstream status, e.g. transport or body errors.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            status_code: None,
            status_label: None,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}

fn describe_status(status_code: &Option<u16>, status_label: &Option<String>) -> String {
    match (status_code, status_label.as_deref()) {
        (Some(code), Some(label)) => format!("{code} {label}"),
        (Some(code), None) => code.to_string(),
        (None, Some(label)) => label.to_string(),
        (None, None) => "no status".to_string(),
    }
}

fn kind_marker(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transient => " [transient]",
        ErrorKind::Permanent => "",
    }
}
