pub mod files;
pub mod health;
pub mod stream;
pub mod upload;

pub use files::list_files;
pub use health::ping;
pub use stream::{start_stream, stop_stream, stream_status};
pub use upload::upload;
