pub mod expression;
pub mod statement;

pub use expression::*;
pub use statement::*;
