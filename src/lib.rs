pub mod ballot;
pub mod bfv;
