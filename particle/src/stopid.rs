/// Terminal status of a particle's integration.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StopId {
    /// Integration still running.
    #[default]
    Unknown,
    /// Absorbed in the solid with this id.
    Absorbed(i32),
    /// Survived to t_max or reached the trajectory-length bound.
    NotFinished,
    /// Left the world bounding box.
    HitBoundaries,
    /// Stepper failure or geometry inconsistency, with a diagnostic.
    NumericalError(Box<str>),
    /// Reached the proper lifetime τ.
    Decayed,
    /// No valid initial position could be found.
    InitialError,
}

impl StopId {
    /// The numeric code written to the end log.
    pub fn code(&self) -> i32 {
        match self {
            StopId::Unknown => 0,
            StopId::Absorbed(id) => *id,
            StopId::NotFinished => -1,
            StopId::HitBoundaries => -2,
            StopId::NumericalError(_) => -3,
            StopId::Decayed => -4,
            StopId::InitialError => -5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StopId::Unknown)
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopId::Unknown => write!(f, "unknown"),
            StopId::Absorbed(id) => write!(f, "absorbed in solid {id}"),
            StopId::NotFinished => write!(f, "not finished"),
            StopId::HitBoundaries => write!(f, "hit world boundaries"),
            StopId::NumericalError(msg) => write!(f, "numerical error: {msg}"),
            StopId::Decayed => write!(f, "decayed"),
            StopId::InitialError => write!(f, "no initial position"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(StopId::Unknown.code(), 0);
        assert_eq!(StopId::Absorbed(7).code(), 7);
        assert_eq!(StopId::NotFinished.code(), -1);
        assert_eq!(StopId::HitBoundaries.code(), -2);
        assert_eq!(StopId::NumericalError("x".into()).code(), -3);
        assert_eq!(StopId::Decayed.code(), -4);
        assert_eq!(StopId::InitialError.code(), -5);
    }

    #[test]
    fn test_terminal() {
        assert!(!StopId::Unknown.is_terminal());
        assert!(StopId::Decayed.is_terminal());
    }
}
