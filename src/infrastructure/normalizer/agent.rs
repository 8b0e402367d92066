//! Model-driven normalizer adapter

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::intent::{NormalizedIntent, SlotMap, SlotValue};
use crate::domain::normalizer::Normalizer;
use crate::domain::DomainError;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").unwrap());

/// Raw agent output: JSON text, or an already-decoded JSON value
pub type AgentOutput = Result<Option<Value>, DomainError>;

type BlockingRunner = dyn Fn(&str, Option<&SlotMap>) -> AgentOutput + Send + Sync;
type AsyncRunner = dyn Fn(String, Option<SlotMap>) -> BoxFuture<'static, AgentOutput> + Send + Sync;

#[derive(Clone)]
enum AgentRunner {
    Blocking(Arc<BlockingRunner>),
    Async(Arc<AsyncRunner>),
}

/// Adapts an agent that answers with `{"intent": .., "slots": {..}, "meta": {..}}`
///
/// The runner may be blocking or async. An async runner cannot serve the
/// blocking call shape; asking it to is a usage fault. Output that does not
/// decode into that shape is treated as "no intent".
#[derive(Clone)]
pub struct AgentNormalizer {
    runner: AgentRunner,
    timeout: Option<Duration>,
}

impl fmt::Debug for AgentNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runner = match self.runner {
            AgentRunner::Blocking(_) => "blocking",
            AgentRunner::Async(_) => "async",
        };

        f.debug_struct("AgentNormalizer")
            .field("runner", &runner)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AgentNormalizer {
    /// Wraps a blocking runner
    pub fn blocking<F>(runner: F) -> Self
    where
        F: Fn(&str, Option<&SlotMap>) -> AgentOutput + Send + Sync + 'static,
    {
        Self {
            runner: AgentRunner::Blocking(Arc::new(runner)),
            timeout: None,
        }
    }

    /// Wraps an async runner
    pub fn from_async<F>(runner: F) -> Self
    where
        F: Fn(String, Option<SlotMap>) -> BoxFuture<'static, AgentOutput> + Send + Sync + 'static,
    {
        Self {
            runner: AgentRunner::Async(Arc::new(runner)),
            timeout: None,
        }
    }

    /// Bounds how long an async runner may take
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_async(&self) -> bool {
        matches!(self.runner, AgentRunner::Async(_))
    }
}

#[async_trait]
impl Normalizer for AgentNormalizer {
    fn normalize(
        &self,
        text: &str,
        context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        match &self.runner {
            AgentRunner::Blocking(run) => Ok(parse_agent_output(run(text, context)?)),
            AgentRunner::Async(_) => Err(DomainError::usage(
                "Async agent runner detected, use lookup_async instead",
            )),
        }
    }

    async fn normalize_async(
        &self,
        text: &str,
        context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        let run = match &self.runner {
            AgentRunner::Blocking(run) => return Ok(parse_agent_output(run(text, context)?)),
            AgentRunner::Async(run) => run.clone(),
        };

        let pending = run(text.to_string(), context.cloned());

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                warn!(timeout_ms = limit.as_millis() as u64, "Agent runner timed out");
                DomainError::cancelled(format!("Agent runner timed out after {:?}", limit))
            })??,
            None => pending.await?,
        };

        Ok(parse_agent_output(output))
    }
}

/// Decodes raw agent output; anything of the wrong shape yields `None`
pub fn parse_agent_output(output: Option<Value>) -> Option<NormalizedIntent> {
    let payload = match output? {
        Value::String(text) => {
            let body = CODE_FENCE
                .captures(&text)
                .and_then(|captures| captures.get(1))
                .map_or(text.as_str(), |m| m.as_str());

            match serde_json::from_str::<Value>(body) {
                Ok(value) => value,
                Err(e) => {
                    debug!(error = %e, "Agent output is not JSON");
                    return None;
                }
            }
        }
        other => other,
    };

    let Value::Object(mut object) = payload else {
        debug!("Agent output is not a JSON object");
        return None;
    };

    let Some(Value::String(intent)) = object.remove("intent") else {
        debug!("Agent output has no string intent");
        return None;
    };

    let slots = match object.remove("slots") {
        None => SlotMap::new(),
        Some(Value::Object(slots)) => slots
            .into_iter()
            .map(|(name, value)| (name, SlotValue::from(value)))
            .collect(),
        Some(_) => {
            debug!("Agent output slots is not an object");
            return None;
        }
    };

    let meta = match object.remove("meta") {
        Some(Value::Object(meta)) => Some(meta),
        _ => None,
    };

    Some(NormalizedIntent { intent, slots, meta })
}
