mod ast;
mod display;
mod parser;

pub use ast::*;
pub use parser::{parse, parse_source, ParseResult};

#[cfg(test)]
mod tests;
