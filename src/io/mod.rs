//! A buffered, forward-reading byte source shared by the binary reader.

mod byte_source;

pub use byte_source::ByteSource;
