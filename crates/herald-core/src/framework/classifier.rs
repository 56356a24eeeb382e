//! Mapping from dispatch failures to user-facing replies.
//!
//! The classifier is a pure mapping: every failure in produces exactly one
//! message out, and nothing is ever suppressed silently. Logging the failure
//! detail is the dispatcher's job; this module only produces text.

use crate::foundation::error::DispatchError;

/// Turns a [`DispatchError`] into the single reply shown to the invoker.
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    prefix: char,
}

impl ErrorClassifier {
    /// Creates a classifier rendering guidance with the given command prefix.
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    /// Maps a failure to its user-facing message.
    pub fn classify(&self, error: &DispatchError) -> String {
        let prefix = self.prefix;
        match error {
            DispatchError::MissingArgument { command, param } => {
                format!("Missing required argument `{param}` for `{prefix}{command}`.")
            }
            DispatchError::CommandNotFound {
                namespace: Some(ns),
                name,
            } if name.is_empty() => {
                format!("The `{prefix}{ns}` group needs a sub-command. Try `{prefix}help`.")
            }
            DispatchError::CommandNotFound {
                namespace: Some(ns),
                name,
            } => {
                format!("Unknown command `{name}` in `{prefix}{ns}`. Try `{prefix}help`.")
            }
            DispatchError::CommandNotFound { .. } => {
                format!("Unknown command. Try `{prefix}help`.")
            }
            DispatchError::Handler { command, source } => {
                format!(
                    "Something went wrong running `{prefix}{command}`: {}",
                    source.message()
                )
            }
        }
    }

    /// Message for a failure the platform surfaced with only a description.
    pub fn failure_text(&self, description: &str) -> String {
        format!("Something went wrong: {description}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::HandlerError;

    #[test]
    fn test_missing_argument_names_the_parameter() {
        let classifier = ErrorClassifier::new('!');
        let message = classifier.classify(&DispatchError::MissingArgument {
            command: "greet".into(),
            param: "who".into(),
        });
        assert!(message.contains("`who`"));
        assert!(message.contains("`!greet`"));
    }

    #[test]
    fn test_not_found_points_at_help() {
        let classifier = ErrorClassifier::new('!');
        let message = classifier.classify(&DispatchError::CommandNotFound {
            namespace: None,
            name: "nosuchcommand".into(),
        });
        assert!(message.contains("`!help`"));
    }

    #[test]
    fn test_scoped_not_found_names_the_group() {
        let classifier = ErrorClassifier::new('!');
        let message = classifier.classify(&DispatchError::CommandNotFound {
            namespace: Some("util".into()),
            name: "frobnicate".into(),
        });
        assert!(message.contains("`frobnicate`"));
        assert!(message.contains("`!util`"));

        let bare = classifier.classify(&DispatchError::CommandNotFound {
            namespace: Some("util".into()),
            name: String::new(),
        });
        assert!(bare.contains("sub-command"));
    }

    #[test]
    fn test_handler_failure_embeds_the_description() {
        let classifier = ErrorClassifier::new('!');
        let message = classifier.classify(&DispatchError::Handler {
            command: "boom".into(),
            source: HandlerError::msg("kaput"),
        });
        assert!(message.contains("kaput"));
        assert!(message.contains("`!boom`"));
    }
}
