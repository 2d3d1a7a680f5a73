pub mod content;
pub mod extractor;
pub mod noise;
pub mod wait;

mod error;

pub use error::ExtractError;
pub use extractor::{
    extract_messages, format_messages_for_saving, select_messages, ChatMessage, Role,
};
