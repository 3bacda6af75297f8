//! Spotify capabilities exposed as tools.
//!
//! Each capability is a single entry point multiplexed over an `action`
//! field. Requests are parsed into typed enums, dispatched to exactly one
//! backing-client operation, and rendered as text.

mod definitions;
mod error;
mod host;
mod request;

pub use definitions::{definition, tool_definitions, ToolDefinition};
pub use error::ToolError;
pub use host::ToolHost;
pub use request::{
    Capability, GetInfoRequest, PlaybackAction, PlaybackRequest, PlaylistAction, PlaylistRequest,
    QueueAction, QueueRequest, SearchRequest, ToolRequest, MAX_SEARCH_LIMIT,
    MAX_SKIPS,
};
