pub mod check;
pub mod languages;
pub mod resolve;
