//! # Routing Commands
//!
//! The five commands the transition engine accepts. Each has its own
//! operation on [`crate::RoutingEngine`] with its own input contract; this
//! enum only names them for audit events, errors, and logs.

use serde::{Deserialize, Serialize};

/// A routing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    /// Claim a free incoming contract.
    Take,
    /// Accept an incoming contract addressed to the actor.
    Accept,
    /// Refuse an incoming contract addressed to the actor, with a reason.
    Reject,
    /// Pull an outgoing contract back into work.
    Return,
    /// Dispatch a contract from work to the outgoing pool.
    Send,
}

impl CommandKind {
    /// All commands, in rule-table order.
    pub const ALL: [CommandKind; 5] = [
        Self::Take,
        Self::Accept,
        Self::Reject,
        Self::Return,
        Self::Send,
    ];

    /// The canonical name of this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Take => "TAKE",
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
            Self::Return => "RETURN",
            Self::Send => "SEND",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
