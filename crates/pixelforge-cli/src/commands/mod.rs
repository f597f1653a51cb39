pub mod batch;
pub mod generate;
