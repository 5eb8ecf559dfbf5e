pub mod application;
pub mod exam;
