// Core leaves: error modeling, values, LOB files, and the dump grammar.
pub mod decode;
pub mod encode;
pub mod error;
pub mod lob;
pub mod script;
pub mod text;
pub mod tokenize;
pub mod value;
