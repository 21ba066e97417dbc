//! Domain types shared across Lilt Player crates

mod completion;
mod ids;
mod media;

pub use completion::{CompletionSignal, CompletionSink, PlaybackToken};
pub use ids::EntryId;
pub use media::{EmbeddedPicture, ExtractedMetadata, SourceFile, SourceRef};
