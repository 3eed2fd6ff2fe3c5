pub mod capture;
pub mod detection;
pub mod expression;
pub mod poll;
pub mod shared;
