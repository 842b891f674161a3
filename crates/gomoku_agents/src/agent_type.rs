//! Selector for which policy answers a request.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Which policy plays the responder's moves.
///
/// On the wire this is either a name (`"random"`, `"rule_based"`,
/// `"learned"`) or one of the numeric codes older clients send
/// (`-2`, `-1`, `0`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AgentType {
    /// Uniform choice over legal moves.
    Random,
    /// Hand-written threat heuristics.
    #[default]
    #[strum(to_string = "rule_based", serialize = "rulebot", serialize = "rule")]
    RuleBased,
    /// Weighted pattern model loaded from a file.
    #[strum(to_string = "learned", serialize = "model", serialize = "alphazero")]
    Learned,
}

impl AgentType {
    /// Maps a legacy numeric code to an agent type.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -2 => Some(AgentType::Random),
            -1 => Some(AgentType::RuleBased),
            0 => Some(AgentType::Learned),
            _ => None,
        }
    }

    /// Legacy numeric code for this agent type.
    pub fn code(self) -> i64 {
        match self {
            AgentType::Random => -2,
            AgentType::RuleBased => -1,
            AgentType::Learned => 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgentTypeRepr {
    Code(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for AgentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match AgentTypeRepr::deserialize(deserializer)? {
            AgentTypeRepr::Code(code) => AgentType::from_code(code).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown agent code {code}"))
            }),
            AgentTypeRepr::Name(name) => AgentType::from_str(name.trim())
                .map_err(|_| serde::de::Error::custom(format!("unknown agent type '{name}'"))),
        }
    }
}
