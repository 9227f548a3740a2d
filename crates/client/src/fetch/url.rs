//! URL handling for resource keys and endpoint construction.

/// Error type for resource URL failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a resource key into a fetchable URL.
///
/// Keys are opaque to the cache, so this only trims surrounding whitespace
/// and checks that the result is an absolute http(s) URL. The key itself is
/// never rewritten.
pub fn parse_resource_url(key: &str) -> Result<url::Url, UrlError> {
    let trimmed = key.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Join `segment` onto `base` and append query parameters.
///
/// Query values are percent-encoded with `%20` for spaces so the same city
/// always maps to the same cache key.
pub fn endpoint(base: &str, segment: &str, params: &[(&str, &str)]) -> Result<String, UrlError> {
    let mut url = parse_resource_url(base)?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| UrlError::InvalidUrl(format!("{base} cannot be a base")))?;
        path.pop_if_empty().push(segment);
    }

    if params.is_empty() {
        url.set_query(None);
    } else {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    Ok(url.to_string())
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
