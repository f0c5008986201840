use thiserror::Error;

#[derive(Error, Debug)]
pub enum PveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    /// A required collaborator was never supplied.
    #[error("{0}")]
    MissingDependency(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Authentication(String),

    #[error("Proxmox API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("VM with vmid {0} does not exist in cluster")]
    VmNotFound(u32),

    #[error("Multiple VMs with name {0} found, provide vmid instead")]
    AmbiguousName(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PveError {
    /// Short category name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PveError::Config(_) => "config",
            PveError::Validation(_) => "validation",
            PveError::MissingDependency(_) => "missing_dependency",
            PveError::Network(_) => "network",
            PveError::Authentication(_) => "authentication",
            PveError::Api { .. } => "api",
            PveError::VmNotFound(_) => "vm_not_found",
            PveError::AmbiguousName(_) => "ambiguous_name",
            PveError::Serialization(_) => "serialization",
            PveError::Io(_) => "io",
        }
    }
}

impl From<serde_yaml_ng::Error> for PveError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PveError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PveError {
    fn from(err: serde_json::Error) -> Self {
        PveError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PveError>;
