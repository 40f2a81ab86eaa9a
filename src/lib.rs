pub mod frame_stream;
pub mod logger;
