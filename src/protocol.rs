//! Reserved tokens and command classification for the tunnel protocol.
//!
//! Every response body the counterpart sends is classified into exactly
//! one [`Command`]. Anything that is not a sentinel or a describe request
//! is treated as an expression to evaluate.

/// Sent as the very first payload of a session.
pub const READY: &str = "__READY";

/// Sent after a timeout, asking for the next command without a result.
pub const KEEPALIVE: &str = "__KEEPALIVE";

/// The counterpart has no command yet.
pub const USER_INPUT_TIMEOUT: &str = "__USER_INPUT_TIMEOUT";

/// The counterpart ends the session.
pub const DISCONNECT: &str = "__DISCONNECT";

/// Prefix of an introspection request (`__DESCRIBE <expr>`).
pub const DESCRIBE_PREFIX: &str = "__DESCRIBE ";

/// Prefix of a diagnostic message forwarded outside the turn sequence.
pub const LOG_PREFIX: &str = "__LOG ";

/// Payload sent when a describe request cannot be answered.
pub const EMPTY_DESCRIPTION: &str = "[]";

/// What the counterpart asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session.
    Disconnect,
    /// No command yet; keep polling.
    Timeout,
    /// List the own properties of the target expression.
    Describe(String),
    /// Evaluate the text as an expression.
    Evaluate(String),
}

impl Command {
    /// Classify a response body. Total: every input maps to one variant.
    pub fn classify(incoming: &str) -> Self {
        if incoming == USER_INPUT_TIMEOUT {
            return Command::Timeout;
        }
        if incoming == DISCONNECT {
            return Command::Disconnect;
        }
        if let Some(target) = incoming.strip_prefix(DESCRIBE_PREFIX)
            && !target.is_empty()
            && !target.contains(['\n', '\r'])
        {
            return Command::Describe(target.to_string());
        }
        Command::Evaluate(incoming.to_string())
    }

    /// Short label used in logs and the transcript.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Disconnect => "disconnect",
            Command::Timeout => "timeout",
            Command::Describe(_) => "describe",
            Command::Evaluate(_) => "evaluate",
        }
    }
}

/// Body of a `__LOG` request.
pub fn log_payload(message: &str) -> String {
    format!("{LOG_PREFIX}{message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_sentinel() {
        assert_eq!(Command::classify("__USER_INPUT_TIMEOUT"), Command::Timeout);
    }

    #[test]
    fn disconnect_sentinel() {
        assert_eq!(Command::classify("__DISCONNECT"), Command::Disconnect);
    }

    #[test]
    fn sentinels_are_case_sensitive() {
        assert_eq!(
            Command::classify("__disconnect"),
            Command::Evaluate("__disconnect".to_string())
        );
    }

    #[test]
    fn sentinels_must_match_exactly() {
        assert_eq!(
            Command::classify("__DISCONNECT "),
            Command::Evaluate("__DISCONNECT ".to_string())
        );
        assert_eq!(
            Command::classify(" __USER_INPUT_TIMEOUT"),
            Command::Evaluate(" __USER_INPUT_TIMEOUT".to_string())
        );
    }

    #[test]
    fn describe_takes_remainder() {
        assert_eq!(
            Command::classify("__DESCRIBE config.server"),
            Command::Describe("config.server".to_string())
        );
    }

    #[test]
    fn describe_keeps_inner_spaces() {
        assert_eq!(
            Command::classify("__DESCRIBE  a"),
            Command::Describe(" a".to_string())
        );
    }

    #[test]
    fn describe_without_target_is_evaluated() {
        assert_eq!(
            Command::classify("__DESCRIBE "),
            Command::Evaluate("__DESCRIBE ".to_string())
        );
        assert_eq!(
            Command::classify("__DESCRIBE"),
            Command::Evaluate("__DESCRIBE".to_string())
        );
    }

    #[test]
    fn multiline_describe_is_evaluated() {
        let text = "__DESCRIBE a\nb";
        assert_eq!(Command::classify(text), Command::Evaluate(text.to_string()));
    }

    #[test]
    fn everything_else_is_evaluated() {
        assert_eq!(Command::classify("1+1"), Command::Evaluate("1+1".to_string()));
        assert_eq!(Command::classify(""), Command::Evaluate(String::new()));
    }

    #[test]
    fn kinds() {
        assert_eq!(Command::Timeout.kind(), "timeout");
        assert_eq!(Command::Disconnect.kind(), "disconnect");
        assert_eq!(Command::Describe("x".into()).kind(), "describe");
        assert_eq!(Command::Evaluate("x".into()).kind(), "evaluate");
    }

    #[test]
    fn log_payload_has_prefix() {
        assert_eq!(log_payload("hello"), "__LOG hello");
    }
}
