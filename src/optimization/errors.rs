use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Relative cost reduction tolerance needs to be positive and finite.
    InvalidTolF {
        tol: f64,
        reason: &'static str,
    },
    /// Relative step tolerance needs to be positive and finite.
    InvalidTolX {
        tol: f64,
        reason: &'static str,
    },
    /// Simplex function-value spread tolerance needs to be positive and finite.
    InvalidTolSpread {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Evaluation budget needs to be positive.
    InvalidMaxEvals {
        max_evals: usize,
        reason: &'static str,
    },
    /// At least one convergence tolerance must be provided.
    NoTolerancesProvided,

    /// Initial damping / simplex step must be positive and finite.
    InvalidStep {
        value: f64,
        reason: &'static str,
    },

    // ---- Objective ----
    /// Objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// Residual vector holds a non-finite entry.
    NonFiniteResidual {
        index: usize,
        value: f64,
    },

    /// Residual length changed between evaluations.
    ResidualDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Fewer residuals than free parameters.
    Underdetermined {
        residuals: usize,
        params: usize,
    },

    /// Starting point has the wrong number of parameters.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Starting point must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Jacobian ----
    JacobianDimMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Jacobian values need to be finite.
    InvalidJacobian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Convergence ----
    /// Evaluation budget exhausted before convergence.
    MaxEvaluations {
        evaluations: usize,
    },
    /// Damping grew past its ceiling without finding a descent step.
    DampingExhausted {
        lambda: f64,
    },
    /// Solver stopped for a reason other than meeting its tolerance.
    AbnormalTermination {
        status: String,
        iterations: usize,
    },
    /// `JᵀJ` at the stopping point is singular: some parameter direction
    /// leaves the residuals unchanged.
    RankDeficientJacobian,
    /// The residuals do not pin down parameter `index`: its standard error
    /// exceeds `max(|θ_index|, 1)`.
    UndeterminedParameter {
        index: usize,
        value: f64,
        std_error: f64,
    },
    /// The fitted curve is no larger than the residual noise.
    UnresolvedSignal {
        ratio: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolF { tol, reason } => {
                write!(f, "Invalid function tolerance {tol}: {reason}")
            }
            OptError::InvalidTolX { tol, reason } => {
                write!(f, "Invalid step tolerance {tol}: {reason}")
            }
            OptError::InvalidTolSpread { tol, reason } => {
                write!(f, "Invalid simplex spread tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidMaxEvals { max_evals, reason } => {
                write!(f, "Invalid evaluation budget {max_evals}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidStep { value, reason } => {
                write!(f, "Invalid step size {value}: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::NonFiniteResidual { index, value } => {
                write!(f, "Non-finite residual at index {index}: {value}")
            }
            OptError::ResidualDimMismatch { expected, found } => {
                write!(f, "Residual dimension mismatch: expected {expected}, found {found}")
            }
            OptError::Underdetermined { residuals, params } => {
                write!(f, "Underdetermined problem: {residuals} residuals for {params} parameters")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Jacobian ----
            OptError::JacobianDimMismatch { expected, found } => {
                write!(f, "Jacobian dimension mismatch: expected {expected:?}, found {found:?}")
            }
            OptError::InvalidJacobian { row, col, value } => {
                write!(f, "Invalid Jacobian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Convergence ----
            OptError::MaxEvaluations { evaluations } => {
                write!(f, "Evaluation budget exhausted after {evaluations} evaluations")
            }
            OptError::DampingExhausted { lambda } => {
                write!(f, "Damping parameter {lambda:e} exceeded its ceiling without a descent step")
            }
            OptError::AbnormalTermination { status, iterations } => {
                write!(f, "Abnormal termination after {iterations} iterations: {status}")
            }
            OptError::RankDeficientJacobian => {
                write!(f, "Degenerate stopping point: Jacobian is rank deficient")
            }
            OptError::UndeterminedParameter { index, value, std_error } => write!(
                f,
                "Degenerate stopping point: parameter {index} = {value} has standard error {std_error:e}"
            ),
            OptError::UnresolvedSignal { ratio } => {
                write!(f, "Fitted model is not resolved above the residual noise (ratio {ratio:.3})")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Objective errors raised inside argmin come back wrapped; unwrap them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}
