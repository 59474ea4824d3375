use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a remote host would send the bearer credential in clear text.
    #[error("Insecure API URL: HTTPS required (except localhost for development)")]
    InsecureApiUrl,
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validate the backend API root.
///
/// Every privileged request carries the bearer credential, so the root must be
/// `https://`. Plain `http://` is accepted only for `localhost` and
/// `127.0.0.1`, which is what local backends and mock servers use.
pub fn validate_api_base(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" => {
            let is_local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));
            if !is_local {
                tracing::error!(api_url = %url, "Rejecting non-HTTPS API URL");
                return Err(UrlValidationError::InsecureApiUrl);
            }
            tracing::warn!(api_url = %url, "Using non-HTTPS API URL (localhost only)");
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Validate an article link before handing it to the system browser.
///
/// Article links come from aggregated third-party feeds; anything other than
/// an http(s) URL with a host (`file://`, `javascript:`, custom schemes) is
/// refused.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
