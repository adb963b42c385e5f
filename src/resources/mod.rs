pub mod image;
pub mod media;
pub mod misc;
pub mod scene;
