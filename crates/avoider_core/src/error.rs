use thiserror::Error;

/// Construction-time configuration errors. Per-tick evaluation never fails;
/// degraded inputs degrade to hold-position instead.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AvoiderError {
    #[error("search range must be positive and finite, got {value}")]
    InvalidRange { value: f32 },

    #[error("sample spacing must be positive and finite, got {value}")]
    InvalidSpacing { value: f32 },
}
