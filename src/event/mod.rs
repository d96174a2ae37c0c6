//! Chat event model, feed transport seam, and rendering seam.

pub mod model;
pub mod render;
pub mod source;

pub use model::{ChatEvent, EventDraft, MessageKind, RollPayload, RollSummary};
pub use render::{CompactRenderer, ContentRenderer, RenderOutcome, RenderedContent, ScriptedRenderer};
pub use source::{EventSource, FeedEvent, FeedSubscription, MemoryTransport};
