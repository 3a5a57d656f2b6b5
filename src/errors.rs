use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
            AppError::Storage(message) => write!(formatter, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// True for 401/403 responses, which the auth flows treat as rejections
    /// rather than transport failures.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::Http { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn http_error_display_includes_status() {
        let err = AppError::Http {
            status: 503,
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (503): upstream down");
    }

    #[test]
    fn rejection_covers_unauthorized_and_forbidden_only() {
        let unauthorized = AppError::Http {
            status: 401,
            message: String::new(),
        };
        let forbidden = AppError::Http {
            status: 403,
            message: String::new(),
        };
        let server = AppError::Http {
            status: 500,
            message: String::new(),
        };
        assert!(unauthorized.is_rejection());
        assert!(forbidden.is_rejection());
        assert!(!server.is_rejection());
        assert!(!AppError::Network("down".to_string()).is_rejection());
    }
}
