use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("failed to read stream of bundle entry `{key}`")]
    Stream {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bundle entry `{key}` is not valid UTF-8")]
    Encoding { key: String },
}

impl DomainError {
    pub fn stream(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Stream {
            key: key.into(),
            source,
        }
    }

    pub fn encoding(key: impl Into<String>) -> Self {
        Self::Encoding { key: key.into() }
    }
}
