pub mod executor;
pub mod startup;
