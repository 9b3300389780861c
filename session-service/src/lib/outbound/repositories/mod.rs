pub mod memory;
pub mod refresh_token;
pub mod user_credentials;

pub use memory::InMemoryRefreshTokenRepository;
pub use memory::InMemoryUserCredentialRepository;
pub use refresh_token::PostgresRefreshTokenRepository;
pub use user_credentials::PostgresUserCredentialRepository;
