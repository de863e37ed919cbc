use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhToolsError {
    #[error("Missing GitHub token. Pass --token or set GITHUB_TOKEN.")]
    MissingToken,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Looks like organization `{0}` doesn't exist.")]
    OrgNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl GhToolsError {
    /// Process exit code for this failure. Usage problems exit with 2, like clap does.
    pub fn exit_code(&self) -> i32 {
        match self {
            GhToolsError::MissingToken => 2,
            _ => 1,
        }
    }
}

impl From<octocrab::Error> for GhToolsError {
    fn from(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { ref source, .. } = err {
            if source.status_code.as_u16() == 404 {
                return GhToolsError::NotFound(source.message.clone());
            }
        }
        GhToolsError::GitHub(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GhToolsError>;
