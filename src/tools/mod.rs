//! Tool executors, their capability contracts, and the registry pairing them.
pub mod contract;
pub mod registry;
pub mod traits;
pub mod types;

pub use contract::{CapabilityContract, ContractRegistry, builtin_contracts};
pub use registry::{RegisteredTool, ToolRegistry};
pub use traits::{FnTool, Tool, ToolFuture};
pub use types::{ToolOutcome, ToolSpec};
