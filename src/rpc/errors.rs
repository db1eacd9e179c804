use thiserror::Error;

/// Fullnode client error types
#[derive(Debug, Clone, Error)]
pub enum RpcClientError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout after {timeout_ms}ms (endpoint: {endpoint})")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// JSON-RPC error object returned by the node
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded (endpoint: {endpoint})")]
    RateLimited { endpoint: String },

    /// The queried entity does not exist on the node
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The node answered with a payload we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcClientError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcClientError::Transport { .. } => true,
            RpcClientError::Timeout { .. } => true,
            RpcClientError::RateLimited { .. } => true,

            // NotFound covers eventual visibility too, but retry timing is
            // the resolver's call, not the transport's
            RpcClientError::NotFound { .. } => false,
            RpcClientError::InvalidResponse(_) => false,

            RpcClientError::RpcResponse { code, .. } => {
                // Retry on server errors (5xx-style codes)
                matches!(code, Some(c) if (500..600).contains(c))
            }
        }
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            RpcClientError::Transport { endpoint, .. } => Some(endpoint),
            RpcClientError::Timeout { endpoint, .. } => Some(endpoint),
            RpcClientError::RpcResponse { endpoint, .. } => Some(endpoint),
            RpcClientError::RateLimited { endpoint } => Some(endpoint),
            _ => None,
        }
    }

    /// Create from a reqwest error with endpoint context
    pub fn from_reqwest(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_timeout() {
            return RpcClientError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: 0,
            };
        }
        if let Some(status) = err.status() {
            if status.as_u16() == 429 {
                return RpcClientError::RateLimited {
                    endpoint: endpoint.to_string(),
                };
            }
            return RpcClientError::RpcResponse {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
                code: Some(status.as_u16() as i64),
            };
        }
        RpcClientError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

/// Retry policy for fullnode requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_attempts: u32,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,

    /// Jitter factor (0.0 - 1.0)
    pub jitter_factor: f64,

    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
            jitter_factor: 0.1,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Calculate delay for a given attempt number
    pub fn calculate_delay(&self, attempt: u32) -> Option<std::time::Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        // Exponential backoff
        let delay_ms = self.base_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64);

        // Add jitter to prevent thundering herd
        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * self.jitter_factor;
        let jittered_delay = (delay_ms * (1.0 + jitter)).max(0.0) as u64;

        Some(std::time::Duration::from_millis(jittered_delay))
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(RpcClientError::Transport {
            endpoint: "test".to_string(),
            message: "connection failed".to_string(),
        }
        .is_retryable());

        assert!(RpcClientError::Timeout {
            endpoint: "test".to_string(),
            timeout_ms: 5000,
        }
        .is_retryable());

        assert!(!RpcClientError::NotFound {
            what: "object".to_string(),
        }
        .is_retryable());

        assert!(!RpcClientError::InvalidResponse("bad json".to_string()).is_retryable());
    }

    #[test]
    fn test_rpc_response_retryable_on_server_codes() {
        let server = RpcClientError::RpcResponse {
            endpoint: "test".to_string(),
            message: "oops".to_string(),
            code: Some(503),
        };
        assert!(server.is_retryable());

        let client = RpcClientError::RpcResponse {
            endpoint: "test".to_string(),
            message: "bad params".to_string(),
            code: Some(-32602),
        };
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_error_endpoint() {
        let err = RpcClientError::Timeout {
            endpoint: "https://fullnode.testnet.sui.io:443".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(err.endpoint(), Some("https://fullnode.testnet.sui.io:443"));

        let not_found = RpcClientError::NotFound {
            what: "package".to_string(),
        };
        assert_eq!(not_found.endpoint(), None);
    }

    #[test]
    fn test_retry_policy_delay() {
        let policy = RetryPolicy::default();

        let delay1 = policy.calculate_delay(0);
        assert!(delay1.is_some());

        let delay_none = policy.calculate_delay(10);
        assert!(delay_none.is_none());

        assert!(RetryPolicy::none().calculate_delay(1).is_none());
    }
}
