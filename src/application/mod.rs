pub mod app_error;
pub mod hasher;
pub mod jwt;
pub mod use_cases;
pub mod validators;
