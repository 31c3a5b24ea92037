//! Error type shared by every fallible operation in the crate.
//!
//! Only construction and the control path can fail. Rendering never returns
//! an error: anything that could produce a bad sample is rejected here first.

/// Errors raised when building a voice or mutating its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FmError {
    /// An argument has the wrong shape (e.g. a constant where a frequency
    /// signal is required, a non-finite note number).
    InvalidArgument {
        what: &'static str,
        reason: &'static str,
    },
    /// A value lies outside the documented range of a parameter.
    OutOfRange {
        param: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// A duration that must be strictly positive was zero, negative or NaN.
    NonPositiveDuration { param: &'static str, value: f32 },
    /// The control queue towards the render thread is full.
    QueueFull,
}

pub type Result<T> = std::result::Result<T, FmError>;

impl std::fmt::Display for FmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FmError::InvalidArgument { what, reason } => {
                write!(f, "invalid argument `{}`: {}", what, reason)
            }
            FmError::OutOfRange {
                param,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "`{}` = {} is out of range (expected {} to {})",
                    param, value, min, max
                )
            }
            FmError::NonPositiveDuration { param, value } => {
                write!(f, "`{}` = {} must be a positive duration in seconds", param, value)
            }
            FmError::QueueFull => write!(f, "control queue is full, message dropped"),
        }
    }
}

impl std::error::Error for FmError {}

/// Accept `value` only if it is finite and inside `[min, max]`.
pub(crate) fn check_range(param: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(FmError::OutOfRange {
            param,
            value,
            min,
            max,
        })
    }
}

/// Accept `value` only if it is a finite, strictly positive duration.
pub(crate) fn check_duration(param: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FmError::NonPositiveDuration { param, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_rejects_nan_and_bounds() {
        assert_eq!(check_range("index", 3.0, 0.0, 20.0), Ok(3.0));
        assert!(check_range("index", -3.0, 0.0, 20.0).is_err());
        assert!(check_range("index", 21.0, 0.0, 20.0).is_err());
        assert!(check_range("index", f32::NAN, 0.0, 20.0).is_err());
        assert!(check_range("index", f32::INFINITY, 0.0, 20.0).is_err());
    }

    #[test]
    fn duration_check_requires_positive() {
        assert_eq!(
            check_duration("attack", 0.0),
            Err(FmError::NonPositiveDuration {
                param: "attack",
                value: 0.0
            })
        );
        assert!(check_duration("attack", -1.0).is_err());
        assert!(check_duration("attack", f32::INFINITY).is_err());
        assert_eq!(check_duration("attack", 0.05), Ok(0.05));
        assert_eq!(check_duration("release", 30.0), Ok(30.0));
    }

    #[test]
    fn display_names_the_parameter() {
        let err = FmError::OutOfRange {
            param: "factor_mod",
            value: 10.0,
            min: 0.0,
            max: 4.0,
        };
        assert!(err.to_string().contains("factor_mod"));
    }
}
