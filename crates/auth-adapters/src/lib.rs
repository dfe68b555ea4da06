//! # auth-adapters
//!
//! Authentication mechanisms behind the domain identity ports: argon2
//! password encoding, local form-login credentials, OAuth2 social
//! sign-in with auto-provisioning, and HMAC-signed session cookies.

mod local;
mod password;
mod session;
mod social;

pub use local::LocalCredentials;
pub use password::PasswordEncoder;
pub use session::{SessionManager, SESSION_COOKIE};
pub use social::{OAuthSettings, SocialIdentity};
