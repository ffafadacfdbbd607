mod capabilities;
mod source_map;
mod version;
mod virtual_file;

pub use capabilities::CapabilitySet;
pub use capabilities::RenameCapability;
pub use source_map::Mapping;
pub use source_map::SourceMap;
pub use version::VersionTracker;
pub use virtual_file::for_each_embedded;
pub use virtual_file::FileKind;
pub use virtual_file::MappedOffset;
pub use virtual_file::VirtualFile;
