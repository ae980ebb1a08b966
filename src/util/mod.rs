mod code;
mod logger;
mod position;

pub use code::Code;
pub use logger::{trace, trace_tokenizer, Log};
pub use position::Position;
