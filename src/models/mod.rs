pub mod child;
pub mod question;
pub mod unit_attempt;
