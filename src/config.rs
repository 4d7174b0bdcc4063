/// Root element of a MediaWiki export
pub const ROOT_TAG: &str = "mediawiki";

/// Element framing one page of the dump
pub const PAGE_TAG: &str = "page";

/// Element holding one historical revision of a page
pub const REVISION_TAG: &str = "revision";

/// Tags accepted while scanning page metadata, in the order they usually appear
pub const PAGE_METADATA_TAGS: &str = "title|ns|id|redirect|restrictions|revision";

/// Read buffer for dump input (decompressed bytes)
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Write buffer for summary output
pub const WRITE_BUFFER_SIZE: usize = 128 * 1024;

/// Progress update interval (tick every N pages)
pub const PROGRESS_INTERVAL: u64 = 1000;
