use crate::config::{PAGE_METADATA_TAGS, REVISION_TAG};
use crate::element::{Element, ElementStream};
use crate::error::{Malformed, Result};
use crate::revision::{FromElement, Revision};
use crate::revisions::Revisions;
use serde::Serialize;
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Page metadata captured before the first revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub namespace: Option<i32>,
    /// Title this page redirects to, if it is a redirect
    pub redirect: Option<String>,
    pub restrictions: Option<String>,
}

/// One `<page>`: its metadata plus the lazy sequence of its revisions.
///
/// The page and its revisions share a single cursor over the element stream, so revisions
/// can be iterated exactly once, in dump order. The page itself iterates its revisions.
pub struct Page<S, R = Revision> {
    info: PageInfo,
    revisions: Revisions<S, R>,
}

impl<S: ElementStream, R: FromElement> Page<S, R> {
    /// Scans page metadata from `stream`, which must be positioned at the first child of an
    /// already-opened `<page>`.
    ///
    /// Scanning stops at the first `<revision>`, which is kept as the first element of the
    /// revision sequence; nothing after it is read. A stream that ends without a revision
    /// produces a page with no revisions.
    pub fn from_stream(mut stream: S) -> Result<Self> {
        let mut info = PageInfo::default();
        let mut first_revision = None;

        // Everything before the first <revision> is metadata; the dump never interleaves
        // metadata tags with revisions. Anything out of place after that point is reported by
        // the revision sequence.
        while let Some(element) = stream.next_element()? {
            trace!(tag = element.tag(), "Page child");
            match element.tag() {
                "title" => info.title = element.into_text(),
                "ns" => info.namespace = parse_namespace(&element)?,
                "id" => info.id = Some(parse_id(&element)?),
                "redirect" => info.redirect = element.attr("title").map(str::to_string),
                "restrictions" => info.restrictions = element.into_text(),
                REVISION_TAG => {
                    first_revision = Some(element);
                    break;
                }
                other => {
                    return Err(Malformed::UnexpectedTag {
                        tag: other.to_string(),
                        expected: PAGE_METADATA_TAGS,
                        context: "a <page>",
                    }
                    .into())
                }
            }
        }

        debug!(
            id = info.id,
            title = info.title.as_deref(),
            namespace = info.namespace,
            has_revisions = first_revision.is_some(),
            "Decomposed page metadata"
        );

        Ok(Self {
            info,
            revisions: Revisions::new(stream, first_revision),
        })
    }
}

impl<S, R> Page<S, R> {
    pub fn info(&self) -> &PageInfo {
        &self.info
    }

    pub fn id(&self) -> Option<u64> {
        self.info.id
    }

    pub fn title(&self) -> Option<&str> {
        self.info.title.as_deref()
    }

    pub fn namespace(&self) -> Option<i32> {
        self.info.namespace
    }

    pub fn redirect(&self) -> Option<&str> {
        self.info.redirect.as_deref()
    }

    pub fn is_redirect(&self) -> bool {
        self.info.redirect.is_some()
    }

    pub fn restrictions(&self) -> Option<&str> {
        self.info.restrictions.as_deref()
    }

    pub fn revisions(&mut self) -> &mut Revisions<S, R> {
        &mut self.revisions
    }

    pub fn into_parts(self) -> (PageInfo, Revisions<S, R>) {
        (self.info, self.revisions)
    }
}

impl<S: ElementStream, R: FromElement> Iterator for Page<S, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.revisions.next()
    }
}

impl<S: ElementStream, R: FromElement> FusedIterator for Page<S, R> {}

fn parse_id(element: &Element) -> Result<u64> {
    let raw = element.text().unwrap_or_default();
    raw.trim().parse().map_err(|_| {
        Malformed::InvalidInteger {
            field: "id",
            value: raw.to_string(),
        }
        .into()
    })
}

/// An empty `<ns>` leaves the namespace absent; anything else must be an integer.
fn parse_namespace(element: &Element) -> Result<Option<i32>> {
    let raw = match element.text() {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };
    raw.trim().parse().map(Some).map_err(|_| {
        Malformed::InvalidInteger {
            field: "ns",
            value: raw.to_string(),
        }
        .into()
    })
}
