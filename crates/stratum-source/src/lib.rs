mod line_index;
mod range;
mod snapshot;

pub use line_index::LineIndex;
pub use range::TextRange;
pub use snapshot::Snapshot;
pub use snapshot::SnapshotId;
