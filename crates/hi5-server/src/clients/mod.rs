mod publisher;
mod search;

pub use publisher::Publisher;
pub use search::{SearchClient, RESULT_LIMIT};
