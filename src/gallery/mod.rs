pub mod classify;
pub mod paginate;
pub mod source;
pub mod types;

pub use paginate::{collect_image_message_ids, collect_image_urls, collect_image_urls_capped};
pub use source::{ChannelHistory, MAX_FETCH_LIMIT};
pub use types::MessageId;
