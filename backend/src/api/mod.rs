pub mod frontend;
pub mod jobs;
pub mod media;
pub mod video;

pub use frontend::*;
pub use jobs::*;
pub use video::*;
