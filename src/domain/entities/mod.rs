pub mod token_pair;
pub mod user;
