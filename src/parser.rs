use crate::config::{PAGE_TAG, READ_BUFFER_SIZE, ROOT_TAG};
use crate::element::{Element, ElementStream};
use crate::error::{Malformed, Result};
use crate::page::Page;
use crate::revision::{FromElement, Revision};
use bzip2::read::BzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::{debug, trace};

/// Streaming reader over the `<page>` elements of a MediaWiki XML dump.
///
/// Pages are handed out one at a time and each borrows the reader, so a page (and its
/// revisions) must be dropped before the next one is requested. A page that failed or was
/// abandoned part way through is skipped up to its `</page>` before the next one is read.
pub struct WikiReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Number of currently open elements in the document
    depth: usize,
    /// Depth just inside the current `<page>`, while its end tag is still unread
    page_depth: Option<usize>,
    finished: bool,
    pages_read: u64,
}

impl WikiReader<Box<dyn BufRead>> {
    /// Opens a dump file, decompressing it on the fly when the path ends in `.bz2`.
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        let source: Box<dyn BufRead> = if path.ends_with(".bz2") {
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, BzDecoder::new(file)))
        } else {
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file))
        };
        debug!(path, "Opened dump");
        Ok(Self::from_reader(source))
    }
}

impl<R: BufRead> WikiReader<R> {
    pub fn from_reader(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            depth: 0,
            page_depth: None,
            finished: false,
            pages_read: 0,
        }
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Byte offset of the reader in the (decompressed) input.
    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    pub fn next_page(&mut self) -> Result<Option<Page<PageElements<'_, R>, Revision>>> {
        self.next_page_with()
    }

    /// Like [`next_page`](Self::next_page) but builds revisions with a caller-chosen type.
    pub fn next_page_with<T: FromElement>(
        &mut self,
    ) -> Result<Option<Page<PageElements<'_, R>, T>>> {
        if let Some(page_depth) = self.page_depth {
            trace!(depth = self.depth, page_depth, "Skipping rest of unfinished page");
            skip_to_depth(&mut self.reader, &mut self.depth, page_depth - 1)?;
            self.page_depth = None;
        }
        if !self.seek_page()? {
            return Ok(None);
        }
        self.pages_read += 1;
        Page::from_stream(PageElements { reader: self }).map(Some)
    }

    /// Moves to just after the next `<page>` start tag. Returns false at end of document.
    fn seek_page(&mut self) -> Result<bool> {
        while !self.finished {
            self.buf.clear();
            match read_tracked(&mut self.reader, &mut self.depth, &mut self.buf)? {
                Event::Start(e) if e.local_name().as_ref() == PAGE_TAG.as_bytes() => {
                    self.page_depth = Some(self.depth);
                    return Ok(true);
                }
                // <page/> has no children, so its stream starts out exhausted
                Event::Empty(e) if e.local_name().as_ref() == PAGE_TAG.as_bytes() => {
                    return Ok(true);
                }
                Event::Start(e) if e.local_name().as_ref() == ROOT_TAG.as_bytes() => {}
                Event::Start(e) => {
                    trace!(
                        tag = %String::from_utf8_lossy(e.local_name().as_ref()),
                        "Skipping element"
                    );
                    let target = self.depth - 1;
                    skip_to_depth(&mut self.reader, &mut self.depth, target)?;
                }
                // only the root closing (or the input running out) ends the document
                Event::End(_) if self.depth == 0 => self.finished = true,
                Event::Eof => self.finished = true,
                _ => {}
            }
        }
        Ok(false)
    }
}

/// The children of the `<page>` the reader is currently inside.
pub struct PageElements<'a, R: BufRead> {
    reader: &'a mut WikiReader<R>,
}

impl<R: BufRead> ElementStream for PageElements<'_, R> {
    fn next_element(&mut self) -> Result<Option<Element>> {
        let wiki = &mut *self.reader;
        if wiki.page_depth.is_none() {
            return Ok(None);
        }
        loop {
            wiki.buf.clear();
            match read_tracked(&mut wiki.reader, &mut wiki.depth, &mut wiki.buf)? {
                Event::Start(e) => {
                    let start = e.into_owned();
                    return read_element(&mut wiki.reader, &mut wiki.depth, &start).map(Some);
                }
                Event::Empty(e) => return start_element(&e).map(Some),
                Event::End(_) => {
                    wiki.page_depth = None;
                    return Ok(None);
                }
                Event::Eof => return Err(Malformed::UnexpectedEof { context: "a <page>" }.into()),
                // whitespace, comments and processing instructions between siblings
                _ => {}
            }
        }
    }
}

/// Reads one event, keeping `depth` in step with the start and end tags seen.
fn read_tracked<'b, R: BufRead>(
    reader: &mut Reader<R>,
    depth: &mut usize,
    buf: &'b mut Vec<u8>,
) -> Result<Event<'b>> {
    let event = reader.read_event_into(buf)?;
    match &event {
        Event::Start(_) => *depth += 1,
        Event::End(_) => *depth = depth.saturating_sub(1),
        _ => {}
    }
    Ok(event)
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element = element.with_attr(name, value);
    }
    Ok(element)
}

/// Reads the subtree opened by `start`, consuming its end tag.
fn read_element<R: BufRead>(
    reader: &mut Reader<R>,
    depth: &mut usize,
    start: &BytesStart<'_>,
) -> Result<Element> {
    let mut element = start_element(start)?;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match read_tracked(reader, depth, &mut buf)? {
            Event::Start(e) => {
                let child = e.into_owned();
                element = element.with_child(read_element(reader, depth, &child)?);
            }
            Event::Empty(e) => element = element.with_child(start_element(&e)?),
            Event::Text(t) => element.push_text(&t.unescape()?),
            Event::CData(c) => element.push_text(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => return Ok(element),
            Event::Eof => {
                return Err(Malformed::UnexpectedEof {
                    context: "an element",
                }
                .into())
            }
            _ => {}
        }
    }
}

/// Consumes events until only `target` elements remain open.
fn skip_to_depth<R: BufRead>(
    reader: &mut Reader<R>,
    depth: &mut usize,
    target: usize,
) -> Result<()> {
    let mut buf = Vec::new();
    while *depth > target {
        buf.clear();
        if let Event::Eof = read_tracked(reader, depth, &mut buf)? {
            return Err(Malformed::UnexpectedEof {
                context: "an element",
            }
            .into());
        }
    }
    Ok(())
}
