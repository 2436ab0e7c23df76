use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum GeneratorError {
    #[error("unknown access level '{0}', expected one of list, read, write, tagging, permissions, all")]
    UnknownAccessLevel(String),

    #[error("internal minimizer error: {0}")]
    MinimizerInternal(String),

    #[error("{}", too_long_message(.length, .max_length, .auto_shortened))]
    PolicyTooLong {
        length: usize,
        max_length: usize,
        auto_shortened: bool,
    },

    #[error("invalid manifest entry: {0}")]
    InvalidManifestEntry(String),

    #[error("unknown service '{0}' in action catalog")]
    UnknownService(String),

    #[error("invalid action catalog: {0}")]
    InvalidCatalog(String),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

fn too_long_message(length: &usize, max_length: &usize, auto_shortened: &bool) -> String {
    if *auto_shortened {
        format!(
            "the generated policy is {length} characters, which is larger than the maximum \
             {max_length} characters allowed. this policy is too long even after auto-shortening. \
             try specifying fewer arguments"
        )
    } else {
        format!(
            "the generated policy is {length} characters, which is larger than the maximum \
             {max_length} characters allowed. try using --compact, --minimize, --auto-shorten, \
             or specifying fewer arguments"
        )
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for GeneratorError {
    fn from(err: serde_yaml::Error) -> Self {
        GeneratorError::ManifestParse(err.to_string())
    }
}
