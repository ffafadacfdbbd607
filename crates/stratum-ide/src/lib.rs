mod dispatch;
mod rename;
#[cfg(test)]
mod testing;

pub use dispatch::dispatch;
pub use dispatch::merge_first_valid;
pub use dispatch::FeatureProvider;
pub use dispatch::MapBack;
pub use rename::prepare_rename;
pub use stratum_workspace::CancellationToken;
