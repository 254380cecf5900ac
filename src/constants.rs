pub mod limits {

    pub const MAX_PHOTOS: usize = 10;

    pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

    pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

    pub const PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

    pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/quicktime"];
}

pub mod cache {
    use std::time::Duration;

    /// TTL for list-shaped responses (search pages, favorites, map pins).
    pub const LIST_TTL: Duration = Duration::from_secs(5 * 60);
}

pub mod search {

    pub const DEFAULT_PAGE_SIZE: u32 = 20;
}

pub mod upload {

    /// Chunk size for streamed file parts; progress is reported once per chunk.
    pub const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;
}
