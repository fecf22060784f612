/// Rejection reasons for a shot's parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamError {
    NonFinite { field: &'static str },
    NonPositive { field: &'static str, value: f64 },
    Negative { field: &'static str, value: f64 },
}

impl ParamError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonFinite { field }
            | Self::NonPositive { field, .. }
            | Self::Negative { field, .. } => field,
        }
    }
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            },
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            },
        }
    }
}

impl std::error::Error for ParamError {}
