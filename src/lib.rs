//! mwpages: streaming page decomposition for MediaWiki XML dumps
//!
//! A `<page>` in a full-history dump can carry thousands of revisions. This crate splits each
//! page into a metadata record and a lazy sequence of revisions without ever holding the whole
//! page in memory:
//!
//! 1. **Metadata scan** -- read `<title>`, `<ns>`, `<id>`, `<redirect>` and `<restrictions>`
//!    until the first `<revision>` shows up
//! 2. **Boundary** -- the first `<revision>` ends the metadata and becomes the first element
//!    of the revision sequence
//! 3. **Revision sequence** -- pull the remaining `<revision>` siblings on demand from the same
//!    forward-only stream
//!
//! # Architecture
//!
//! - **Single cursor** -- the page and its revisions share one element stream; the borrow
//!   checker guarantees only one of them pulls at a time
//! - **No recovery** -- unexpected tags are hard errors, and a sequence that hits one is
//!   poisoned for good
//! - **Pluggable collaborators** -- any [`element::ElementStream`] can feed a page and any
//!   [`revision::FromElement`] type can be built from its revisions
//!
//! # Key Modules
//!
//! - [`page`] -- Page decomposer and metadata record
//! - [`revisions`] -- Lazy revision sequence producer
//! - [`revision`] -- Revision record and the `FromElement` collaborator trait
//! - [`element`] -- Element value type and the `ElementStream` trait
//! - [`parser`] -- quick-xml dump reader with BZ2 decompression
//! - [`summarize`] -- Whole-dump walk producing per-page CSV/JSON summaries
//! - [`stats`] -- Counters for a dump walk
//! - [`error`] -- Error taxonomy
//! - [`config`] -- Constants
//!
//! # Example Usage
//!
//! ```no_run
//! use mwpages::parser::WikiReader;
//!
//! # fn main() -> mwpages::error::Result<()> {
//! let mut reader = WikiReader::open("enwiki-latest-pages-meta-history1.xml.bz2")?;
//! while let Some(mut page) = reader.next_page()? {
//!     println!("{:?}", page.title());
//!     for revision in page.revisions() {
//!         println!("  {}", revision?.id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod page;
pub mod parser;
pub mod revision;
pub mod revisions;
pub mod stats;
pub mod summarize;
