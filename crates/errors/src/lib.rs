use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("{operation} failed ({status}): {body}")]
    Backend {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("{0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type MonitorResult<T> = Result<T, MonitorError>;

impl MonitorError {
    pub fn backend<S: Into<String>, B: Into<String>>(operation: S, status: u16, body: B) -> Self {
        Self::Backend {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::Timeout(err.to_string())
        } else {
            MonitorError::Network(err.to_string())
        }
    }
}
