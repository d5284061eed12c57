use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::domain::{GenerationRequest, LlmError};

use super::LlmProvider;
use super::response_parsing::{extract_text, truncate_message};

const GENERATE_PATH: &str = "api/generate";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Plain-text generation endpoint reached through a tunnel link
/// (`POST <link>/api/generate` with `{model, prompt, stream}`).
pub struct GenerateEndpointProvider {
    endpoint_url: String,
    timeout: Duration,
    client: Client,
}

impl GenerateEndpointProvider {
    pub fn from_link(link: &str) -> Result<Self, LlmError> {
        Self::with_config(link, DEFAULT_TIMEOUT)
    }

    pub fn with_config(link: &str, timeout: Duration) -> Result<Self, LlmError> {
        if link.trim().is_empty() {
            return Err(LlmError::validation(
                "generation endpoint URL must not be empty",
            ));
        }
        if timeout.is_zero() {
            return Err(LlmError::validation(
                "generation timeout must be greater than 0 seconds",
            ));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            LlmError::internal(format!("failed to create generation HTTP client: {err}"))
        })?;

        Ok(Self {
            endpoint_url: normalize_endpoint_url(link),
            timeout,
            client,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl LlmProvider for GenerateEndpointProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        request.validate()?;

        debug!(
            endpoint = %self.endpoint_url,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "sending generation request"
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let response_body = response.text().map_err(map_transport_error)?;
        debug!(%status, body_len = response_body.len(), "generation response received");

        if !status.is_success() {
            let error = map_http_error(status, &response_body);
            warn!(%status, "generation endpoint returned an error status");
            return Err(error);
        }

        Ok(extract_text(&response_body))
    }
}

/// Turns a bare tunnel link into the generate endpoint URL.
pub fn normalize_endpoint_url(link: &str) -> String {
    let link = link.trim();
    if link.trim_end_matches('/').ends_with(GENERATE_PATH) {
        return link.to_string();
    }

    if link.ends_with('/') {
        format!("{link}{GENERATE_PATH}")
    } else {
        format!("{link}/{GENERATE_PATH}")
    }
}

fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return LlmError::Timeout;
    }

    let message = truncate_message(body);
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        message
    };

    LlmError::Http {
        status: status.as_u16(),
        message,
    }
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        warn!("generation request timed out");
        return LlmError::Timeout;
    }

    warn!(%error, "generation request failed");
    LlmError::transport(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{DEFAULT_TIMEOUT, GenerateEndpointProvider, map_http_error, normalize_endpoint_url};
    use crate::domain::LlmError;

    #[test]
    fn normalize_endpoint_url_appends_generate_path() {
        assert_eq!(
            normalize_endpoint_url("https://abc.a.pinggy.link"),
            "https://abc.a.pinggy.link/api/generate"
        );
        assert_eq!(
            normalize_endpoint_url(" https://abc.a.pinggy.link/ "),
            "https://abc.a.pinggy.link/api/generate"
        );
    }

    #[test]
    fn normalize_endpoint_url_keeps_complete_endpoint() {
        assert_eq!(
            normalize_endpoint_url("http://localhost:11434/api/generate"),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn from_link_uses_default_timeout() {
        let provider = GenerateEndpointProvider::from_link("http://localhost:11434")
            .expect("provider should build");

        assert_eq!(provider.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(provider.endpoint_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn with_config_rejects_empty_link_and_zero_timeout() {
        let empty = match GenerateEndpointProvider::with_config("  ", Duration::from_secs(1)) {
            Ok(_) => panic!("empty link should fail"),
            Err(error) => error,
        };
        assert!(matches!(
            empty,
            LlmError::Validation { message } if message == "generation endpoint URL must not be empty"
        ));

        let zero = match GenerateEndpointProvider::with_config("http://localhost", Duration::ZERO)
        {
            Ok(_) => panic!("zero timeout should fail"),
            Err(error) => error,
        };
        assert!(matches!(zero, LlmError::Validation { .. }));
    }

    #[test]
    fn map_http_error_maps_status_and_body() {
        let not_found = map_http_error(StatusCode::NOT_FOUND, "404 page not found\n");
        assert_eq!(
            not_found,
            LlmError::Http {
                status: 404,
                message: "404 page not found".to_string()
            }
        );

        let empty = map_http_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(
            empty,
            LlmError::Http {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );

        assert_eq!(
            map_http_error(StatusCode::GATEWAY_TIMEOUT, "upstream timed out"),
            LlmError::Timeout
        );
    }
}
