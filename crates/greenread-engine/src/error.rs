use greenread_core::ParamError;

/// Why the aim solver produced no launch angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveError {
    InvalidParams(ParamError),
    /// No launch angle near this end of the search range reaches the cup
    /// line at the fixed launch speed.
    TargetUnreachable { angle_deg: f64 },
    /// Both ends of the range miss the cup on the same side.
    NotBracketed {
        low_deg: f64,
        high_deg: f64,
        f_low: f64,
        f_high: f64,
    },
    /// Bisection used its whole budget without meeting the tolerance.
    NoConvergence {
        iterations: usize,
        best_angle_deg: f64,
        residual: f64,
    },
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(e) => write!(f, "invalid parameters: {e}"),
            Self::TargetUnreachable { angle_deg } => {
                write!(f, "cup line unreachable near {angle_deg:.3} deg")
            },
            Self::NotBracketed {
                low_deg,
                high_deg,
                f_low,
                f_high,
            } => write!(
                f,
                "no sign change between {low_deg:.3} deg ({f_low:+.4} m) and {high_deg:.3} deg ({f_high:+.4} m)"
            ),
            Self::NoConvergence {
                iterations,
                best_angle_deg,
                residual,
            } => write!(
                f,
                "no convergence after {iterations} iterations (best {best_angle_deg:.4} deg, {residual:+.5} m)"
            ),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidParams(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParamError> for SolveError {
    fn from(e: ParamError) -> Self {
        Self::InvalidParams(e)
    }
}

/// Errors from loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(msg) => write!(f, "failed to parse config: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_errors_convert_and_chain() {
        let err: SolveError = ParamError::NonFinite { field: "slope_deg" }.into();
        assert!(matches!(err, SolveError::InvalidParams(_)));
        assert!(err.to_string().contains("slope_deg"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn bracket_message_names_both_ends() {
        let err = SolveError::NotBracketed {
            low_deg: -45.0,
            high_deg: 45.0,
            f_low: 0.2,
            f_high: 0.3,
        };
        let msg = err.to_string();
        assert!(msg.contains("-45.000"), "{msg}");
        assert!(msg.contains("45.000"), "{msg}");
    }
}
