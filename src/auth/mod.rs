// Session-token lifecycle and credential handling: HS256 signing in
// `token`, Argon2 hashing and the password policy in `password`, and the
// issue/revoke/resolve operations in `session`.
pub mod password;
pub mod session;
pub mod token;

pub use session::{SessionError, SessionManager};
