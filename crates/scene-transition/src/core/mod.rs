pub mod deferred;
pub mod generation;
pub mod scheduler;
