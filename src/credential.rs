use std::fmt;

/// A bearer credential taken from an inbound `Authorization` header.
///
/// `Credential` keeps the raw token out of logs and error messages. The value
/// can only be read through [`expose_secret`](Self::expose_secret), which the
/// validator calls once to verify the token.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - Owned by the request that extracted it and dropped with it
///
/// # Examples
///
/// ```
/// use gateway_authorizer::Credential;
///
/// let token = Credential::new("eyJhbGciOiJIUzI1NiJ9.e30.sig".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), "eyJhbGciOiJIUzI1NiJ9.e30.sig");
/// ```
// BREAKING CHANGE WARNING: Do NOT add Clone, Copy, or Default derives.
// A cloned credential can outlive the request that owns it.
pub struct Credential {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // Making it public lets the raw token reach logs (CWE-532).
    token: String,
}

/// Number of leading characters shown by [`Credential::preview`].
const PREVIEW_LEN: usize = 15;

impl Credential {
    /// Wraps a bearer token.
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// Explicitly exposes the raw token.
    ///
    /// # Security Warning
    ///
    /// Only credential validators should call this. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.token
    }

    /// Returns a truncated form of the token suitable for debug-level logs.
    ///
    /// The first 15 characters are kept, followed by `...`. A JWT header
    /// prefix carries no signing material. Tokens of 15 characters or fewer
    /// would be shown whole, so they preview as `[REDACTED]`.
    pub fn preview(&self) -> String {
        let mut chars = self.token.chars();
        let head: String = chars.by_ref().take(PREVIEW_LEN).collect();

        if chars.next().is_none() {
            return "[REDACTED]".to_string();
        }
        format!("{head}...")
    }
}

impl fmt::Debug for Credential {
    /// BREAKING CHANGE WARNING: This MUST unconditionally return "[REDACTED]".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Credential {
    /// BREAKING CHANGE WARNING: This MUST unconditionally return "[REDACTED]".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_redacts_debug() {
        let token = Credential::new("hunter2-token".to_string());
        let debug_output = format!("{:?}", token);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn credential_redacts_display() {
        let token = Credential::new("sk-1234567890".to_string());
        let display_output = format!("{}", token);

        assert_eq!(display_output, "[REDACTED]");
        assert!(!display_output.contains("sk-"));
    }

    #[test]
    fn credential_exposes_when_explicit() {
        let token = Credential::new("good-token".to_string());
        assert_eq!(token.expose_secret(), "good-token");
    }

    #[test]
    fn preview_truncates_long_tokens() {
        let token = Credential::new("eyJhbGciOiJSUzI1NiIsImtpZCI6IjEifQ".to_string());
        assert_eq!(token.preview(), "eyJhbGciOiJSUzI...");
    }

    #[test]
    fn preview_hides_short_tokens() {
        assert_eq!(Credential::new("abc".to_string()).preview(), "[REDACTED]");
        assert_eq!(
            Credential::new("exactly15chars!".to_string()).preview(),
            "[REDACTED]"
        );
    }

    #[test]
    fn preview_of_sixteen_chars_drops_the_last() {
        let token = Credential::new("a0AAAa---0Aa_a-.".to_string());
        assert_eq!(token.preview(), "a0AAAa---0Aa_a-...");
        assert_ne!(token.preview(), token.expose_secret());
    }
}
