pub mod extractor;

pub use extractor::api_key;
pub use extractor::bearer_token;
pub use extractor::extract;
pub use extractor::extract_from_headers;
pub use extractor::Credential;
pub use extractor::Scheme;
