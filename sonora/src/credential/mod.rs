mod errors;
mod hasher;

pub use errors::CredentialError;
pub use hasher::CredentialHasher;
