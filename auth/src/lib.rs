//! Credential primitives library
//!
//! Provides the building blocks the auth service composes into a credential lifecycle:
//! - Password hashing (Argon2id) with a configurable work factor
//! - HS256 JWT encoding/decoding of access claims
//! - Roles carried inside access claims
//! - High-entropy random identifiers (token ids, refresh handles)
//!
//! Storage, revocation and the session state machine live in the service; this crate
//! holds no state besides keys and hashing parameters.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Claims
//! ```
//! use auth::{AccessClaims, JwtHandler, Role};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = AccessClaims::issue(uuid::Uuid::new_v4(), Role::User, 1_700_000_000, 900);
//! let token = handler.encode(&claims).unwrap();
//! let decoded: AccessClaims = handler.decode(&token).unwrap();
//! assert_eq!(decoded, claims);
//! assert!(decoded.check_validity(1_700_000_100).is_ok());
//! ```

pub mod jwt;
pub mod password;
pub mod random;
pub mod role;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtHandler;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::WorkFactor;
pub use role::Role;
pub use role::UnknownRole;
