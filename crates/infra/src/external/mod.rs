//! HTTP clients for the external collaborators (token introspection and
//! class membership).

pub mod introspector_http;
pub mod membership_http;

pub use introspector_http::HttpIntrospector;
pub use membership_http::HttpMembershipAuthority;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

/// Resolve `path` below `base`, keeping any path prefix `base` already has.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ClientError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ClientError::Endpoint(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("https://hydra.example.com/admin").unwrap();
        assert_eq!(
            endpoint(&base, "/oauth2/introspect").unwrap().as_str(),
            "https://hydra.example.com/admin/oauth2/introspect"
        );

        let bare = Url::parse("http://classsvc:8080").unwrap();
        assert_eq!(endpoint(&bare, "classes/").unwrap().as_str(), "http://classsvc:8080/classes/");
    }
}
