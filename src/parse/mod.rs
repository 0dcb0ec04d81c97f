pub mod template;
pub mod token;

pub use template::{Node, Template, parse_template};
pub use token::{Token, TokenContext};
