use thiserror::Error;

/// Failure to assemble an extraction pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> Result<regex::Regex> {
        Ok(regex::Regex::new(pattern)?)
    }

    #[test]
    fn test_bad_pattern_converts() {
        let err = compile("(unclosed").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(err.to_string().starts_with("Invalid pattern:"));
    }
}
