//! Error type shared by engine construction, byte input and config loading.

/// Errors reported by hashmark.
///
/// Transformation of valid text never fails; errors only come from
/// option validation, byte decoding and configuration files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options that cannot drive a transformation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Byte input that is not UTF-8.
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidInputEncoding {
        /// Length of the longest valid prefix.
        valid_up_to: usize,
    },
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidInputEncoding {
            valid_up_to: err.valid_up_to(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_error_keeps_offset() {
        let bytes = [b'o', b'k', 0xFF];
        let err: Error = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, Error::InvalidInputEncoding { valid_up_to: 2 }));
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidOptions("tab_width must be at least 1".to_owned());
        assert_eq!(err.to_string(), "invalid options: tab_width must be at least 1");
    }
}
