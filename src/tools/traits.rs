use super::types::{ToolOutcome, ToolSpec};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<ToolOutcome>> + Send + 'a>>;

/// External tool executor. An `Err` means the executor itself broke
/// (spawn failure, I/O); a tool that ran and reported failure returns
/// `Ok(ToolOutcome::Failure(..))`.
pub trait Tool: Send + Sync {
    /// Tool name (registry key)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Execute the tool with given arguments
    fn execute<'a>(&'a self, args: Value) -> ToolFuture<'a>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

type SyncHandler = dyn Fn(&Value) -> anyhow::Result<ToolOutcome> + Send + Sync;

/// Adapts a synchronous closure into a [`Tool`].
pub struct FnTool {
    name: String,
    description: String,
    handler: Box<SyncHandler>,
}

impl FnTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Fn(&Value) -> anyhow::Result<ToolOutcome> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Box::new(handler),
        }
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute<'a>(&'a self, args: Value) -> ToolFuture<'a> {
        Box::pin(async move { (self.handler)(&args) })
    }
}
