//! Error types for psh.

use std::io;

/// Errors produced by the shell, its filesystem and its collaborators.
///
/// Display strings are shown to the user as-is, prefixed with the name of
/// the command that failed.
#[derive(Debug, thiserror::Error)]
pub enum PshError {
    #[error("Cannot find path '{0}' because it does not exist.")]
    PathNotFound(String),

    #[error("'{0}' is not a directory.")]
    NotADirectory(String),

    #[error("'{0}' is a directory, not a file.")]
    NotAFile(String),

    #[error("An item with the specified name '{0}' already exists.")]
    AlreadyExists(String),

    #[error(
        "The term '{0}' is not recognized as the name of a cmdlet, function, \
         script file, or operable program. Type 'help' for a list of commands."
    )]
    UnrecognizedCommand(String),

    #[error("{0} is not supported.")]
    Unsupported(String),

    #[error("{0}")]
    Command(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_not_found_display() {
        let e = PshError::PathNotFound("C:\\nope".into());
        assert_eq!(
            format!("{e}"),
            "Cannot find path 'C:\\nope' because it does not exist."
        );
    }

    #[test]
    fn wrong_node_type_display() {
        let e = PshError::NotADirectory("C:\\a.txt".into());
        assert_eq!(format!("{e}"), "'C:\\a.txt' is not a directory.");
        let e = PshError::NotAFile("C:\\Users".into());
        assert_eq!(format!("{e}"), "'C:\\Users' is a directory, not a file.");
    }

    #[test]
    fn unrecognized_command_mentions_help() {
        let e = PshError::UnrecognizedCommand("badcmd".into());
        let msg = format!("{e}");
        assert!(msg.contains("'badcmd'"));
        assert!(msg.contains("help"));
    }

    #[test]
    fn command_error_is_bare_message() {
        let e = PshError::Command("missing argument".into());
        assert_eq!(format!("{e}"), "missing argument");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: PshError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid").unwrap_err();
        let e: PshError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: PshError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }
}
