pub mod claims;
pub mod codec;
pub mod errors;
pub mod secret;

pub use claims::Claims;
pub use claims::ISSUER;
pub use codec::AccessTokenCodec;
pub use codec::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;
pub use errors::AccessTokenError;
pub use secret::SigningSecret;
