pub mod community;
pub mod member;
pub mod search;

pub use community::extract_community_id;
pub use member::*;
pub use search::*;
