pub mod stream_decoder;
pub mod transport;
pub mod widget;
