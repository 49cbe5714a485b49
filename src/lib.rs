//! In-memory whiteboard cache reconciled against realtime edit events.
//!
//! The cache holds every whiteboard the session has opened, keyed by board
//! id. Exactly one of them is the live realtime target; the rest are frozen
//! snapshots marked stale. Remote participants' edits arrive on a
//! [`channel::RealtimeChannel`] from a background delivery context, are
//! decoded into a closed [`decoder::RealtimeCommand`], and applied to the
//! live board. Foreground readers query any cached board at any time.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`cache`] | [`cache::WhiteboardCache`]: board table, live-board discipline, subscription lifecycle |
//! | [`decoder`] | Realtime payload decoding and encoding |
//! | [`channel`] | Instance-owned pub/sub channel and the background delivery task |
//! | [`whiteboard`] | Board entity: id, ordered strokes, staleness |
//! | [`stroke`] | Immutable stroke record and blend mode |
//! | [`color`] | Packed color and its realtime JSON representation |
//! | [`config`] | Environment-driven tuning knobs |

pub mod cache;
pub mod channel;
pub mod color;
pub mod config;
pub mod decoder;
pub mod stroke;
pub mod whiteboard;

pub use cache::WhiteboardCache;
pub use channel::{RealtimeChannel, RealtimeEvent, RealtimeSubscriber, Subscription};
pub use color::Color;
pub use config::CacheConfig;
pub use decoder::{DecodeError, RealtimeAction, RealtimeCommand};
pub use stroke::{BlendMode, Stroke, StrokeError};
pub use whiteboard::Whiteboard;
