//! Credentials from the hosting environment and request signing.

pub mod credentials;
pub mod error;
pub mod profile;
pub mod sigv4;

pub use credentials::AwsCredentials;
pub use error::AuthError;
pub use sigv4::{RequestSigner, SignableRequest};
