pub mod extractor;
pub mod job_store;
pub mod video_service;

pub use extractor::{Downloader, MetadataFetcher, YtDlp};
pub use job_store::JobStore;
pub use video_service::{VideoService, VideoServiceConfig};
