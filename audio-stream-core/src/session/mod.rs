pub mod connection;
pub mod queued_events;
pub mod route;
pub mod stream_factory;
