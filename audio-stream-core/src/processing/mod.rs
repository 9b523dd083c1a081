pub mod allocators;
pub mod listener_registry;
pub mod ring_cursor;
pub mod span;
pub mod stream;
