mod business;
mod command;
mod form;
mod message;
mod slash_command;

pub use business::*;
pub use command::*;
pub use form::InvalidEscape;
pub use message::*;
pub use slash_command::*;
