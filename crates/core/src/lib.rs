#![forbid(unsafe_code)]

pub mod daily;
pub mod error;
pub mod html;
pub mod model;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
