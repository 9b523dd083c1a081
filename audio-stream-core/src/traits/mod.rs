pub mod abstract_stream;
pub mod allocator;
pub mod endpoint;
pub mod transform;
