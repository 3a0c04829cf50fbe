//! `quill-auth`: authentication and ownership authorization.
//!
//! Pure of HTTP and of concrete storage: credential and opaque-token stores are
//! injected through the traits in [`store`], and time through [`Clock`].

pub mod authorize;
pub mod claims;
pub mod clock;
pub mod config;
pub mod hashing;
pub mod issuer;
pub mod password;
pub mod principal;
pub mod service;
pub mod store;
pub mod user;
pub mod validator;

pub use authorize::{AuthzError, OwnershipDecision, authorize_owner};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SigningSecret, TokenConfig, parse_algorithm};
pub use hashing::{PasswordError, hash_password, verify_password};
pub use issuer::{IssueError, IssuedToken, TokenIssuer};
pub use password::{PasswordPolicy, PasswordRule, RuleViolation, UserAttribute, UserContext};
pub use principal::Principal;
pub use service::{Authenticator, LoginError, RegisterRequest, RegistrationError};
pub use store::{AccessTokenRecord, AccessTokenStore, CreateUserError, CredentialStore, StoreError};
pub use user::{NewUser, PasswordHash, User};
pub use validator::{AuthOutcome, TokenScheme, TokenValidator};
