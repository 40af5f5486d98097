pub mod token;

pub use token::{AuthenticationToken, AuthorizationToken};
