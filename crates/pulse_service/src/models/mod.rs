pub mod sorts;
pub mod token_query;
pub mod tokens;
