/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod cache;
pub mod config;
pub mod duration;
pub mod errors;
pub mod fetch;
pub mod prefix;
pub mod ranges;
pub mod shutdown;
pub mod store;
