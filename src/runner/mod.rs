mod runner;

pub use runner::{RunReport, Runner};
