pub type PhotoBookResult<T> = Result<T, PhotoBookError>;

#[derive(thiserror::Error, Debug)]
pub enum PhotoBookError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoBookError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PhotoBookError::configuration("x")
                .to_string()
                .contains("configuration error:")
        );
        assert!(
            PhotoBookError::persistence("x")
                .to_string()
                .contains("persistence error:")
        );
        assert!(
            PhotoBookError::export("x")
                .to_string()
                .contains("export error:")
        );
        assert!(
            PhotoBookError::validation("x")
                .to_string()
                .contains("validation error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PhotoBookError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_persistence());
    }
}
