pub mod builder;
pub mod defaults;
pub mod job;
pub mod runtime;
pub mod traits;
