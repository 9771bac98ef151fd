//! Error types for the preparation engine.
//!
//! Every variant carries the identifiers needed to fix the request (action
//! name, missing key, step id) and its message starts with a stable code.

use crate::action::Scope;
use thiserror::Error;

/// The main error type for preparation operations.
#[derive(Error, Debug)]
pub enum PrepError {
    // =========================================================================
    // Scope Validation Errors (E100-E199)
    // =========================================================================
    /// The parameters carry no `scope` key, or an unrecognized one.
    #[error("E101: Action '{action}' has no valid scope in its parameters")]
    MissingActionScope {
        /// Name of the action being created.
        action: String,
    },

    /// The action does not declare support for the requested scope.
    #[error("E102: Action '{action}' does not support scope {scope}")]
    UnsupportedActionScope {
        /// Name of the action being created.
        action: String,
        /// The scope that was requested.
        scope: Scope,
    },

    /// A key that the scope makes mandatory is missing.
    #[error("E103: Action '{action}' with scope {scope} requires parameter '{parameter}'")]
    MissingActionScopeParameter {
        /// Name of the action being created.
        action: String,
        /// The requested scope.
        scope: Scope,
        /// The missing parameter key.
        parameter: String,
    },

    // =========================================================================
    // Execution Errors (E200-E299)
    // =========================================================================
    /// An action failed during compile or apply. Fatal for the whole request.
    #[error("E201: Action '{action}' at position {position} failed: {cause}")]
    ActionExecution {
        /// Name of the failing action.
        action: String,
        /// Position of the action in the executed list.
        position: usize,
        /// Reason for the failure.
        cause: String,
    },

    /// A parameter value could not be used by the action.
    #[error("E202: Invalid parameter '{parameter}' for action '{action}': {cause}")]
    InvalidActionParameter {
        /// Name of the action.
        action: String,
        /// The offending parameter key.
        parameter: String,
        /// Why the value was rejected.
        cause: String,
    },

    /// A column looked up by name does not exist in the schema.
    #[error("E203: Column '{name}' not found")]
    ColumnNotFound {
        /// Logical column name or id.
        name: String,
    },

    // =========================================================================
    // Step Chain Errors (E300-E399)
    // =========================================================================
    /// A step id could not be resolved.
    #[error("E301: Step '{step_id}' does not exist")]
    StepNotFound {
        /// The unresolved step id.
        step_id: String,
    },

    /// A content blob referenced by a step could not be resolved.
    #[error("E302: Content '{content_id}' referenced by step '{step_id}' does not exist")]
    ContentNotFound {
        /// The step holding the dangling reference.
        step_id: String,
        /// The unresolved content id.
        content_id: String,
    },

    /// The parent chain does not terminate at the root step.
    #[error("E303: Step chain starting at '{step_id}' is corrupted: {cause}")]
    CorruptedStepChain {
        /// Where the walk started.
        step_id: String,
        /// What went wrong during the walk.
        cause: String,
    },

    /// A preparation id could not be resolved.
    #[error("E304: Preparation '{preparation_id}' does not exist")]
    PreparationNotFound {
        /// The unresolved preparation id.
        preparation_id: String,
    },

    /// Steps cannot be appended to a preparation without a dataset.
    #[error("E305: Preparation '{preparation_id}' does not reference a dataset")]
    DatasetReferenceMissing {
        /// The preparation without dataset.
        preparation_id: String,
    },

    /// The root step is shared by every preparation.
    #[error("E306: The root step cannot be updated or deleted")]
    RootStepImmutable,

    /// The step exists but is not part of the preparation history.
    #[error("E307: Step '{step_id}' is not part of preparation '{preparation_id}'")]
    StepNotInPreparation {
        /// The preparation.
        preparation_id: String,
        /// The foreign step.
        step_id: String,
    },

    // =========================================================================
    // Registry and Script Errors (E400-E499)
    // =========================================================================
    /// No action is registered under this name.
    #[error("E401: Unknown action '{name}'")]
    UnknownAction {
        /// The unresolved action name.
        name: String,
    },

    /// An action script could not be parsed.
    #[error("E402: Invalid action script: {cause}")]
    InvalidScript {
        /// Parser message.
        cause: String,
    },

    // =========================================================================
    // I/O and Serialization Errors (E900-E999)
    // =========================================================================
    /// Serialization or deserialization failed.
    #[error("E901: Serialization error: {cause}")]
    Serialization {
        /// Underlying serde message.
        cause: String,
    },

    /// An I/O operation failed.
    #[error("E902: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrepError {
    /// Get the error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingActionScope { .. } => "E101",
            Self::UnsupportedActionScope { .. } => "E102",
            Self::MissingActionScopeParameter { .. } => "E103",
            Self::ActionExecution { .. } => "E201",
            Self::InvalidActionParameter { .. } => "E202",
            Self::ColumnNotFound { .. } => "E203",
            Self::StepNotFound { .. } => "E301",
            Self::ContentNotFound { .. } => "E302",
            Self::CorruptedStepChain { .. } => "E303",
            Self::PreparationNotFound { .. } => "E304",
            Self::DatasetReferenceMissing { .. } => "E305",
            Self::RootStepImmutable => "E306",
            Self::StepNotInPreparation { .. } => "E307",
            Self::UnknownAction { .. } => "E401",
            Self::InvalidScript { .. } => "E402",
            Self::Serialization { .. } => "E901",
            Self::Io(_) => "E902",
        }
    }

    /// Check if this error is raised while validating action parameters.
    ///
    /// These are always recoverable by resubmitting corrected parameters.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingActionScope { .. }
                | Self::UnsupportedActionScope { .. }
                | Self::MissingActionScopeParameter { .. }
        )
    }

    /// Check if this error means a step chain cannot be replayed.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::StepNotFound { .. } | Self::ContentNotFound { .. } | Self::CorruptedStepChain { .. }
        )
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            cause: err.to_string(),
        }
    }
}

/// Result type alias using PrepError.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for attaching action context to errors.
pub trait ResultExt<T> {
    /// Wrap an error as an execution failure of the given action.
    fn with_action(self, action: &str, position: usize) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_action(self, action: &str, position: usize) -> Result<T> {
        self.map_err(|e| match e {
            already @ PrepError::ActionExecution { .. } => already,
            other => PrepError::ActionExecution {
                action: action.to_string(),
                position,
                cause: other.to_string(),
            },
        })
    }
}
