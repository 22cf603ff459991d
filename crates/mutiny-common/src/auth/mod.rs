//! Credentials used by the REST client and the gateway handshake

mod credentials;

pub use credentials::{Authentication, AuthenticationKind};
