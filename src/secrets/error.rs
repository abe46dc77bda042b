//! Secret lookup errors

/// Why a parameter lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupReason {
    NotFound,
    AccessDenied,
    Backend,
}

impl std::fmt::Display for LookupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupReason::NotFound => f.write_str("not found"),
            LookupReason::AccessDenied => f.write_str("access denied"),
            LookupReason::Backend => f.write_str("backend error"),
        }
    }
}

/// Errors raised by the secret cache and its backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    /// Backend client could not be constructed (region, credentials, binary)
    #[error("secret service unavailable: {0}")]
    ServiceInit(String),

    /// Parameter lookup failed
    #[error("lookup of '{key}' failed ({reason}): {message}")]
    Lookup {
        key: String,
        reason: LookupReason,
        message: String,
    },

    /// Ciphertext is not valid base64
    #[error("ciphertext is not valid base64: {0}")]
    Decode(String),

    /// Key service rejected the ciphertext
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// Parameter value is not a JSON object
    #[error("value of '{key}' is not a JSON object: {message}")]
    Format { key: String, message: String },
}

impl SecretError {
    pub fn lookup(
        key: impl Into<String>,
        reason: LookupReason,
        message: impl Into<String>,
    ) -> Self {
        SecretError::Lookup {
            key: key.into(),
            reason,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_display_includes_reason() {
        let err = SecretError::lookup("/app/db", LookupReason::NotFound, "ParameterNotFound");
        assert_eq!(
            err.to_string(),
            "lookup of '/app/db' failed (not found): ParameterNotFound"
        );
    }
}
