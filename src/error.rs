use std::fmt;

/// Fatal problems found while decoding a scene description.
///
/// Line numbers are 1-based and refer to the raw input, comments included.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A `Star`/`Planet` line did not split into the required number of fields.
    FieldCount { line: usize, kind: &'static str, expected: usize, got: usize },
    /// A numeric field failed to parse or was not finite.
    InvalidNumber { line: usize, field: &'static str, token: String },
    /// Mass must be strictly positive for every loaded body.
    NonPositiveMass { line: usize, mass: f64 },
    /// A planet sits exactly on its parent star, so no orbit can be derived.
    DegenerateOrbit { line: usize },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::FieldCount { line, kind, expected, got } => write!(
                f,
                "line {}: invalid {} format (expected {}, got {} fields)",
                line, kind, expected, got
            ),
            SceneError::InvalidNumber { line, field, token } => {
                write!(f, "line {}: cannot parse {} from '{}'", line, field, token)
            }
            SceneError::NonPositiveMass { line, mass } => {
                write!(f, "line {}: mass must be positive, got {}", line, mass)
            }
            SceneError::DegenerateOrbit { line } => {
                write!(f, "line {}: planet coincides with its parent star, orbit radius is zero", line)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Non-fatal issues reported while decoding; the offending line is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneWarning {
    UnknownKind { line: usize, keyword: String },
}

impl fmt::Display for SceneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneWarning::UnknownKind { line, keyword } => {
                write!(f, "line {}: unknown space object '{}', skipped", line, keyword)
            }
        }
    }
}

/// Errors raised by an engine. A tick that fails leaves the scene untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    NonPositiveMass { body: usize, mass: f64 },
    /// Two distinct bodies share a position, the force direction is undefined.
    UnboundedForce { body: usize, other: usize },
    /// The step would produce NaN or infinite state for this body.
    NonFiniteState { body: usize },
    /// A non-star body has no orbit to follow in the kinematic model.
    MissingOrbit { body: usize },
    /// Parent index does not name an earlier body in the scene.
    DanglingParent { body: usize, parent: usize },
    /// Parent exists but has the wrong kind for this body.
    InvalidParent { body: usize, parent: usize },
    InvalidTimeStep { dt: f64 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NonPositiveMass { body, mass } => {
                write!(f, "body {} has non-positive mass {}", body, mass)
            }
            EngineError::UnboundedForce { body, other } => {
                write!(f, "bodies {} and {} coincide, force is unbounded", body, other)
            }
            EngineError::NonFiniteState { body } => {
                write!(f, "body {} would reach a non-finite state", body)
            }
            EngineError::MissingOrbit { body } => {
                write!(f, "body {} has no parent orbit", body)
            }
            EngineError::DanglingParent { body, parent } => {
                write!(f, "body {} references missing parent {}", body, parent)
            }
            EngineError::InvalidParent { body, parent } => {
                write!(f, "body {} cannot orbit body {}", body, parent)
            }
            EngineError::InvalidTimeStep { dt } => {
                write!(f, "time step must be finite and non-negative, got {}", dt)
            }
        }
    }
}

impl std::error::Error for EngineError {}
