pub mod ast;
pub mod error;
pub mod token;
pub mod value;

pub use ast::*;
pub use error::*;
pub use token::*;
pub use value::*;
