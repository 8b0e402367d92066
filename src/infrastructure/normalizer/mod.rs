//! Reference normalizers

mod agent;
mod callable;
mod rule_based;

pub use agent::{parse_agent_output, AgentNormalizer, AgentOutput};
pub use callable::CallableNormalizer;
pub use rule_based::RuleBasedNormalizer;
