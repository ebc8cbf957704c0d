//! URL helpers for the Gemini REST surface
//!
//! Base URLs come from user configuration and may carry trailing slashes;
//! model names may be given bare (`gemini-2.5-flash`) or fully qualified
//! (`models/gemini-2.5-flash`).

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use bible_expert::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling slashes
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Build the URL for a model method such as `generateContent`
///
/// # Examples
///
/// ```
/// use bible_expert::utils::url::model_method_url;
///
/// assert_eq!(
///     model_method_url("https://example.com/v1beta/", "gemini-2.5-flash", "generateContent"),
///     "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
/// );
/// ```
pub fn model_method_url(base_url: &str, model: &str, method: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    construct_api_url(base_url, &format!("models/{model}:{method}"))
}

/// URL for the server-sent-events variant of `streamGenerateContent`
pub fn stream_url(base_url: &str, model: &str) -> String {
    format!(
        "{}?alt=sse",
        model_method_url(base_url, model, "streamGenerateContent")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/v1"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1///"),
            "https://api.example.com/v1"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("https://api.example.com/v1/", "/models"),
            "https://api.example.com/v1/models"
        );
        assert_eq!(
            construct_api_url("https://api.example.com/v1", "///models"),
            "https://api.example.com/v1/models"
        );
    }

    #[test]
    fn model_prefix_is_not_duplicated() {
        assert_eq!(
            model_method_url("https://x.test/v1beta", "models/gemini-pro", "generateContent"),
            "https://x.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn stream_url_requests_sse() {
        assert_eq!(
            stream_url("https://x.test/v1beta/", "gemini-2.5-flash"),
            "https://x.test/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
    }
}
