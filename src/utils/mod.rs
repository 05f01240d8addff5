pub mod signing;
pub mod time;
pub mod validation;
