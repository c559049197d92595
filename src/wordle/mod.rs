pub mod archive;
pub mod audit;
pub mod config;
pub mod fetcher;
pub mod gaps;
pub mod paths;
pub mod reconcile;
pub mod util;
pub mod warn;
