//! MCP gateway: tools, `wegene://` resources and transports

pub mod resources;
pub mod server;
pub mod tools;

pub use resources::{ReportResource, ReportUri};
pub use server::{ToolReply, WegeneServer};
pub use tools::{ToolCall, WegeneTool};
