pub mod analyzers;
pub mod cleaner;
pub mod feed;
pub mod fetch;
pub mod store;
