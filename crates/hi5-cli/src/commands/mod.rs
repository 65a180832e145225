pub mod invoke;
pub mod search;
