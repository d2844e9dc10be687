#![forbid(unsafe_code)]

pub mod model;
pub mod mutator;
pub mod stages;
pub mod status;
pub mod time;

pub use time::Clock;
