pub mod batch;
pub mod message;
