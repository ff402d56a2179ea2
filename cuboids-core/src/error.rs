/// Error taxonomy for the transform pipeline and demo configuration

/// Convenience result type used across the core crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The perspective parameters cannot describe a valid frustum.
    #[error("invalid projection config: {0}")]
    InvalidProjectionConfig(String),

    /// The rotation/scale block of a model matrix has no inverse.
    #[error("singular matrix (determinant {determinant})")]
    SingularMatrix { determinant: f32 },

    /// Malformed or out-of-range demo configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::InvalidProjectionConfig(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::projection("near must be positive").to_string(),
            "invalid projection config: near must be positive"
        );
        assert!(Error::SingularMatrix { determinant: 0.0 }
            .to_string()
            .starts_with("singular matrix"));
        assert_eq!(Error::config("count is zero").to_string(), "config error: count is zero");
    }
}
