use thiserror::Error;

/// Everything that can abort a generation attempt.
///
/// Generation is a pure function of seed and configuration, so none of these
/// are retried: the caller fixes the input and calls again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("recursion depth {depth} exceeds ceiling {ceiling}")]
    DepthExceeded { depth: u32, ceiling: u32 },

    #[error("degenerate spike field: width = {width}, length = {length}")]
    InvalidGeometry { width: f32, length: f32 },

    #[error("invalid terrain parameter: {field} = {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("unknown sky gradient '{0}'")]
    UnknownPalette(String),
}

pub type GenResult<T> = Result<T, GenError>;

// shorthand used by the validators
pub(crate) fn invalid(field: &'static str, value: f32, reason: &'static str) -> GenError {
    GenError::InvalidConfiguration { field, value, reason }
}

/// Fails unless `value` is finite and inside `[min, max]`.
pub(crate) fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> GenResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(field, value, "out of range"));
    }
    Ok(())
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn check_positive(field: &'static str, value: f32) -> GenResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive"));
    }
    Ok(())
}
