use http::header::{HeaderMap, HOST};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Works out the base URL at which callers reached this worker.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    static_endpoint: String,
}

impl EndpointResolver {
    pub fn new(static_endpoint: impl Into<String>) -> Self {
        Self {
            static_endpoint: static_endpoint.into(),
        }
    }

    /// `scheme://host` from forwarding headers, or the static endpoint
    /// (possibly empty) when no host is known.
    ///
    /// Host: `x-forwarded-host`, then `host`. Scheme: `x-forwarded-proto`,
    /// then whether the inbound connection itself was encrypted.
    pub fn resolve(&self, headers: &HeaderMap, encrypted: bool) -> String {
        let host = first_value(headers, X_FORWARDED_HOST).or_else(|| first_value(headers, HOST.as_str()));
        let Some(host) = host else {
            return self.static_endpoint.clone();
        };

        let scheme = first_value(headers, X_FORWARDED_PROTO)
            .unwrap_or(if encrypted { "https" } else { "http" });

        format!("{scheme}://{host}")
    }

    pub fn static_endpoint(&self) -> &str {
        &self.static_endpoint
    }
}

/// First element of a header that may be repeated or comma-joined by proxies.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .next()
        .filter(|value| !value.is_empty())
}
