// 🔐 Access gate - shared admin password
// Viewing is public. Writes need an admin context, resolved from whatever
// credential the caller presented.

use sha2::{Digest, Sha256};

/// Who is calling. Passed explicitly into every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessContext {
    Viewer,
    Admin,
}

impl AccessContext {
    pub fn is_admin(&self) -> bool {
        matches!(self, AccessContext::Admin)
    }
}

/// How callers are authorized
#[derive(Clone)]
pub enum AccessPolicy {
    /// No password configured: every caller may write
    Open,
    /// SHA-256 digest of the shared admin password
    Password([u8; 32]),
}

impl AccessPolicy {
    pub fn with_password(password: &str) -> Self {
        AccessPolicy::Password(digest(password))
    }

    /// `Some(password)` gates writes, `None` leaves them open
    pub fn from_optional(password: Option<&str>) -> Self {
        match password {
            Some(p) if !p.is_empty() => AccessPolicy::with_password(p),
            _ => AccessPolicy::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AccessPolicy::Open)
    }

    /// Resolve the caller's context from a presented password (if any)
    pub fn authorize(&self, presented: Option<&str>) -> AccessContext {
        match self {
            AccessPolicy::Open => AccessContext::Admin,
            AccessPolicy::Password(expected) => match presented {
                Some(p) if constant_time_eq(&digest(p), expected) => AccessContext::Admin,
                _ => AccessContext::Viewer,
            },
        }
    }
}

impl std::fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessPolicy::Open => f.write_str("Open"),
            AccessPolicy::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

fn digest(password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_policy_grants_admin_to_everyone() {
        let policy = AccessPolicy::Open;
        assert_eq!(policy.authorize(None), AccessContext::Admin);
        assert_eq!(policy.authorize(Some("anything")), AccessContext::Admin);
    }

    #[test]
    fn test_password_policy() {
        let policy = AccessPolicy::with_password("s3cret");
        assert!(policy.authorize(Some("s3cret")).is_admin());
        assert_eq!(policy.authorize(Some("wrong")), AccessContext::Viewer);
        assert_eq!(policy.authorize(Some("")), AccessContext::Viewer);
        assert_eq!(policy.authorize(None), AccessContext::Viewer);
    }

    #[test]
    fn test_empty_configured_password_means_open() {
        assert!(AccessPolicy::from_optional(Some("")).is_open());
        assert!(AccessPolicy::from_optional(None).is_open());
        assert!(!AccessPolicy::from_optional(Some("x")).is_open());
    }

    #[test]
    fn test_debug_does_not_leak_digest() {
        let policy = AccessPolicy::with_password("s3cret");
        assert_eq!(format!("{:?}", policy), "Password(<redacted>)");
    }
}
