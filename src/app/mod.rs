pub mod pipelines;
pub mod runner;

pub use runner::Runner;
