//! Response types
//!
//! Status codes and the normalized body of a recorded response.

mod body;
mod status;

pub use body::{JSON_MEDIA_TYPE, ResponseBody};
pub use status::StatusCode;
