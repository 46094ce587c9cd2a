use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

pub use auth::Role;

use crate::domain::credentials::errors::EmailError;
use crate::domain::credentials::errors::PasswordPolicyError;
use crate::domain::credentials::errors::UserIdError;
use crate::domain::credentials::errors::UsernameError;
use crate::domain::credentials::errors::ValidationError;

/// User aggregate entity.
///
/// Represents a registered account. Users are never hard-deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user with a new id and the default role.
    pub fn new(
        email: EmailAddress,
        username: Username,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            username,
            password_hash,
            role: Role::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Free-form display name: trimmed, 1-64 characters, no control characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Nothing left after trimming
    /// * `TooLong` - Longer than 64 characters
    /// * `ControlCharacters` - Contains control characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = username.trim().to_string();
        let length = username.chars().count();

        if length == 0 {
            return Err(UsernameError::Empty);
        }
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if username.chars().any(char::is_control) {
            return Err(UsernameError::ControlCharacters);
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Case-folded and trimmed. Must parse as an RFC 5322 address and carry both
/// an `@` and a `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub const MAX_LENGTH: usize = 254;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email is missing `@`/`.` or does not conform to RFC 5322
    /// * `TooLong` - Email exceeds the 254 character SMTP path limit
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();

        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if !email.contains('@') || !email.contains('.') {
            return Err(EmailError::InvalidFormat(
                "email must contain '@' and '.'".to_string(),
            ));
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfied the password policy.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with validated fields
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub username: Username,
    pub password: Password,
}

impl RegisterCommand {
    /// Validate raw registration input.
    ///
    /// # Errors
    /// * `ValidationError` - First field that fails its check
    pub fn new(email: &str, username: &str, password: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            email: EmailAddress::new(email.to_string())?,
            username: Username::new(username.to_string())?,
            password: Password::new(password.to_string())?,
        })
    }
}

/// Opaque refresh credential handle, the public key of a `RefreshCredential`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RefreshHandle(String);

impl RefreshHandle {
    pub fn new(handle: String) -> Self {
        Self(handle)
    }

    /// Draw a fresh 256-bit handle.
    pub fn generate() -> Self {
        Self(auth::random::refresh_handle())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only a prefix, enough to correlate log lines.
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "RefreshHandle({}…)", prefix)
    }
}

/// Persisted refresh credential record.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshCredential {
    pub token: RefreshHandle,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Usable for a refresh at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}

/// Authenticated identity derived from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub jti: String,
    pub exp: i64,
}

/// Credentials handed out by login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: RefreshHandle,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Counts removed by one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub revocations: usize,
    pub refresh_credentials: u64,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_email_is_case_folded() {
        let email = EmailAddress::new("  Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_requires_at_and_dot() {
        assert!(EmailAddress::new("alice.example.com".to_string()).is_err());
        assert!(EmailAddress::new("alice@localhost".to_string()).is_err());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_email_rejects_garbage_with_at_and_dot() {
        assert!(EmailAddress::new("@.".to_string()).is_err());
    }

    #[test]
    fn test_email_length_fits_users_column() {
        let local = "a".repeat(64);
        let longest = format!(
            "{}@{}.{}.{}.com",
            local,
            "b".repeat(63),
            "c".repeat(63),
            "d".repeat(57)
        );
        assert_eq!(longest.len(), EmailAddress::MAX_LENGTH);
        assert!(EmailAddress::new(longest).is_ok());

        let too_long = format!(
            "{}@{}.{}.{}.com",
            local,
            "b".repeat(63),
            "c".repeat(63),
            "d".repeat(63)
        );
        assert_eq!(
            EmailAddress::new(too_long),
            Err(EmailError::TooLong {
                max: 254,
                actual: 260
            })
        );
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(
            Username::new("  alice ".to_string()).unwrap().as_str(),
            "alice"
        );
        assert_eq!(Username::new("   ".to_string()), Err(UsernameError::Empty));
        assert!(matches!(
            Username::new("a".repeat(65)),
            Err(UsernameError::TooLong { max: 64, actual: 65 })
        ));
        assert_eq!(
            Username::new("bad\nname".to_string()),
            Err(UsernameError::ControlCharacters)
        );
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(Password::new("Secret12".to_string()).is_ok());
        assert_eq!(
            Password::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("Secret12".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("Secret12"));
    }

    #[test]
    fn test_register_command_validation() {
        assert!(RegisterCommand::new("alice@example.com", "alice", "Secret12").is_ok());
        assert!(matches!(
            RegisterCommand::new("alice", "alice", "Secret12"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            RegisterCommand::new("alice@example.com", "alice", "short"),
            Err(ValidationError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_new_user_defaults() {
        let now = Utc::now();
        let user = User::new(
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
            "$argon2id$hash".to_string(),
            now,
        );

        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);
    }

    #[test]
    fn test_refresh_credential_expiry_is_strict() {
        let now = Utc::now();
        let credential = RefreshCredential {
            token: RefreshHandle::generate(),
            user_id: UserId::new(),
            issued_at: now - Duration::hours(1),
            expires_at: now,
            revoked: false,
        };

        assert!(credential.is_expired_at(now));
        assert!(!credential.is_active_at(now));
        assert!(credential.is_active_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_refresh_handle_debug_hides_secret() {
        let handle = RefreshHandle::generate();
        assert!(!format!("{:?}", handle).contains(handle.as_str()));
    }

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new();
        assert_eq!(UserId::from_string(&id.to_string()), Ok(id));
        assert!(UserId::from_string("nope").is_err());
    }
}
