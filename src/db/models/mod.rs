mod context_block;

pub use context_block::ContextBlock;
