//! Data models for the application
//!
//! Media-side types (what is being uploaded and how it was classified) live
//! in `media`; the externally owned metadata record lives in `video`.

mod media;
mod video;

pub use media::*;
pub use video::*;
