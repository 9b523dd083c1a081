pub mod composite;
pub mod decimator;
pub mod factory;
mod frames;
pub mod input_transcode_proxy;
pub mod interpolator;
pub mod mono_to_stereo;
pub mod null_transform;
pub mod stream_proxy;
