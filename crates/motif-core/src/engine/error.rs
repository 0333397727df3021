use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pairing refers to an atom that is not part of structure '{structure}'")]
    UnknownAtom { structure: String },

    #[error("Inconsistent pairing: {0}")]
    InconsistentPairing(String),

    #[error(
        "Model graph is not connected and will not be analyzed. Likely cause: Misplaced and/or missing atoms."
    )]
    ModelNotConnected { model: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
