/// Failures of the geocoding and routing endpoints.
///
/// Variants carry strings rather than transport errors so browser and native
/// clients report the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodingError {
    /// Missing or malformed configuration (token, base URLs).
    Config(String),
    /// Caller input the service cannot accept (empty query, too few waypoints).
    InvalidInput(String),
    /// The request never produced a response.
    Transport(String),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body was not the expected JSON shape.
    Decode(String),
    /// The service answered successfully but refused the request (`code != "Ok"`).
    Rejected(String),
}

impl std::fmt::Display for GeocodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodingError::Config(msg) => write!(f, "geocoding config error: {msg}"),
            GeocodingError::InvalidInput(msg) => write!(f, "invalid geocoding input: {msg}"),
            GeocodingError::Transport(msg) => write!(f, "geocoding request failed: {msg}"),
            GeocodingError::Status { status, body } if body.is_empty() => {
                write!(f, "geocoding service returned HTTP {status}")
            }
            GeocodingError::Status { status, body } => {
                write!(f, "geocoding service returned HTTP {status}: {body}")
            }
            GeocodingError::Decode(msg) => write!(f, "failed to parse geocoding response: {msg}"),
            GeocodingError::Rejected(code) => write!(f, "request rejected by service: {code}"),
        }
    }
}

impl std::error::Error for GeocodingError {}

#[cfg(test)]
mod tests {
    use super::GeocodingError;

    #[test]
    fn status_display_omits_empty_body() {
        let e = GeocodingError::Status {
            status: 401,
            body: String::new(),
        };
        assert_eq!(e.to_string(), "geocoding service returned HTTP 401");

        let e = GeocodingError::Status {
            status: 422,
            body: "Query too long".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "geocoding service returned HTTP 422: Query too long"
        );
    }
}
