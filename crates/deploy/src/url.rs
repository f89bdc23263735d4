//! Upload and login URL helpers.

use reqwest::Url;

use crate::error::DeployError;

/// Parses an upload URL, prepending `https://` when it does not start
/// with `http`.
pub fn normalize_url(raw: &str) -> Result<Url, DeployError> {
    let candidate = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    Url::parse(&candidate).map_err(|e| DeployError::InvalidUrl {
        url: candidate.clone(),
        reason: e.to_string(),
    })
}

/// Builds the token endpoint `<scheme>://<authority>/<login>` from the
/// upload URL. Path, query and fragment of `upload` are dropped.
pub fn login_endpoint(upload: &Url, login: &str) -> Result<Url, DeployError> {
    let origin = upload.origin();
    if !origin.is_tuple() {
        return Err(DeployError::InvalidUrl {
            url: upload.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    let endpoint = format!(
        "{}/{}",
        origin.ascii_serialization(),
        login.trim_start_matches('/')
    );
    Url::parse(&endpoint).map_err(|e| DeployError::InvalidUrl {
        url: endpoint.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_https_scheme() {
        let url = normalize_url("api.example.com/upload").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/upload");
    }

    #[test]
    fn keeps_explicit_scheme() {
        let url = normalize_url("http://localhost:8080/upload").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/upload");
    }

    #[test]
    fn rejects_garbage() {
        let err = normalize_url("https://").unwrap_err();
        assert!(matches!(err, DeployError::InvalidUrl { .. }));
    }

    #[test]
    fn login_endpoint_uses_scheme_and_authority() {
        let upload = normalize_url("http://localhost:8080/api/v1/upload?x=1").unwrap();
        let login = login_endpoint(&upload, "auth/login").unwrap();
        assert_eq!(login.as_str(), "http://localhost:8080/auth/login");
    }

    #[test]
    fn login_endpoint_default_port_is_omitted() {
        let upload = normalize_url("example.com/upload").unwrap();
        let login = login_endpoint(&upload, "/token").unwrap();
        assert_eq!(login.as_str(), "https://example.com/token");
    }
}
