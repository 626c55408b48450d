//! Authorized connection to one platform environment.

use crate::secret::Redacted;

/// Credential plus environment for a single request.
///
/// Produced by the connection authenticator and passed explicitly into every
/// platform call. Never stored by forcehook itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    session_id: Redacted,
    env: String,
}

impl ConnectionContext {
    pub fn new(session_id: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            session_id: Redacted::new(session_id),
            env: env.into(),
        }
    }

    /// The platform session (access token).
    pub fn session_id(&self) -> &str {
        self.session_id.expose()
    }

    /// Environment name, e.g. `prod` or `sandbox`.
    pub fn env(&self) -> &str {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_session() {
        let conn = ConnectionContext::new("00D!secret-token", "prod");
        let debug = format!("{conn:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("prod"));
        assert_eq!(conn.session_id(), "00D!secret-token");
    }
}
