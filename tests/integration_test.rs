//! Integration tests for streaming page decomposition.
//!
//! Tests are organized into sections:
//!
//! - **Reader Tests** -- BZ2 decompression, page framing, metadata and revision order
//! - **Decomposer Tests** -- boundary detection and malformed input over in-memory streams
//! - **Summary Tests** -- whole-dump walks producing CSV and JSON lines output
//!
//! All file-based tests share the `sample_xml()` fixture: a small full-history dump with a
//! multi-revision article, a redirect, a page with no revisions and a category page.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use mwpages::element::{Element, IterStream};
use mwpages::error::{Error, Malformed};
use mwpages::page::Page;
use mwpages::parser::WikiReader;
use mwpages::revision::Revision;
use mwpages::summarize::{summarize_dump, OutputFormat, SummaryOptions};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Helper: create a BZ2-compressed XML file from a string and return the temp file handle.
///
/// The name ends in `.bz2` so the reader picks the decompressing path.
fn create_bz2_xml(xml: &str) -> NamedTempFile {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(xml.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut tmp = tempfile::Builder::new().suffix(".xml.bz2").tempfile().unwrap();
    tmp.write_all(&compressed).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn create_plain_xml(xml: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    tmp.write_all(xml.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn sample_xml() -> &'static str {
    r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/" version="0.10">
        <siteinfo>
            <sitename>Wikipedia</sitename>
            <namespaces>
                <namespace key="0" case="first-letter" />
                <namespace key="14" case="first-letter">Category</namespace>
            </namespaces>
        </siteinfo>
        <page>
            <title>Rust (programming language)</title>
            <ns>0</ns>
            <id>1</id>
            <restrictions>move=sysop</restrictions>
            <revision>
                <id>100</id>
                <timestamp>2010-07-07T00:00:00Z</timestamp>
                <contributor><username>Graydon</username><id>11</id></contributor>
                <comment>created page</comment>
                <model>wikitext</model>
                <format>text/x-wiki</format>
                <text xml:space="preserve">Rust is a language.</text>
                <sha1>aaa</sha1>
            </revision>
            <revision>
                <id>101</id>
                <parentid>100</parentid>
                <timestamp>2015-05-15T00:00:00Z</timestamp>
                <contributor><ip>192.0.2.7</ip></contributor>
                <minor />
                <text xml:space="preserve">Rust is a systems programming language.</text>
            </revision>
            <revision>
                <id>102</id>
                <parentid>101</parentid>
                <timestamp>2024-01-15T10:30:00Z</timestamp>
                <text xml:space="preserve">Rust is a general-purpose language &amp; more.</text>
            </revision>
        </page>
        <page>
            <title>Rust</title>
            <ns>0</ns>
            <id>3</id>
            <redirect title="Rust (programming language)" />
            <revision>
                <id>300</id>
                <text xml:space="preserve">#REDIRECT [[Rust (programming language)]]</text>
            </revision>
        </page>
        <page>
            <title>Empty history</title>
            <ns>0</ns>
            <id>4</id>
        </page>
        <page>
            <title>Category:Programming languages</title>
            <ns>14</ns>
            <id>5</id>
            <revision>
                <id>500</id>
                <text xml:space="preserve">Category page</text>
            </revision>
        </page>
    </mediawiki>"#
}

fn text_el(tag: &str, text: &str) -> Element {
    Element::new(tag).with_text(text)
}

fn rev(id: u64) -> Element {
    Element::new("revision").with_child(text_el("id", &id.to_string()))
}

// ---------------------------------------------------------------------------
// Reader integration tests
// ---------------------------------------------------------------------------

#[test]
fn reader_reads_all_pages_from_bz2() {
    let tmp = create_bz2_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();

    let mut titles = Vec::new();
    while let Some(page) = reader.next_page().unwrap() {
        titles.push(page.title().unwrap().to_string());
    }

    assert_eq!(
        titles,
        vec![
            "Rust (programming language)",
            "Rust",
            "Empty history",
            "Category:Programming languages"
        ]
    );
    assert_eq!(reader.pages_read(), 4);
}

#[test]
fn reader_reads_plain_xml() {
    let tmp = create_plain_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();
    let page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.id(), Some(1));
}

#[test]
fn reader_yields_revisions_in_dump_order() {
    let tmp = create_bz2_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();
    let page = reader.next_page().unwrap().unwrap();

    assert_eq!(page.namespace(), Some(0));
    assert_eq!(page.restrictions(), Some("move=sysop"));

    let revisions: Vec<Revision> = page.map(|r| r.unwrap()).collect();
    let ids: Vec<u64> = revisions.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);

    assert_eq!(
        revisions[0].contributor.as_ref().unwrap().username.as_deref(),
        Some("Graydon")
    );
    assert_eq!(revisions[0].model.as_deref(), Some("wikitext"));
    assert_eq!(
        revisions[1].contributor.as_ref().unwrap().ip.as_deref(),
        Some("192.0.2.7")
    );
    assert!(revisions[1].minor);
    assert_eq!(revisions[2].parent_id, Some(101));
    assert_eq!(
        revisions[2].text.as_deref(),
        Some("Rust is a general-purpose language & more.")
    );
}

#[test]
fn reader_reports_redirect_target() {
    let tmp = create_bz2_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();
    drop(reader.next_page().unwrap());

    let page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.title(), Some("Rust"));
    assert_eq!(page.redirect(), Some("Rust (programming language)"));
    assert_eq!(page.count(), 1);
}

#[test]
fn reader_handles_page_without_revisions() {
    let tmp = create_bz2_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();
    drop(reader.next_page().unwrap());
    drop(reader.next_page().unwrap());

    let mut page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.title(), Some("Empty history"));
    assert!(page.next().is_none());
    assert!(page.next().is_none());
    drop(page);

    let page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.namespace(), Some(14));
}

#[test]
fn reader_resumes_after_partial_consumption() {
    let tmp = create_bz2_xml(sample_xml());
    let mut reader = WikiReader::open(tmp.path().to_str().unwrap()).unwrap();

    let mut page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.next().unwrap().unwrap().id, 100);
    assert_eq!(page.revisions().yielded(), 1);
    drop(page);

    let page = reader.next_page().unwrap().unwrap();
    assert_eq!(page.id(), Some(3));
}

#[test]
fn reader_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.xml.bz2");
    let err = WikiReader::open(path.to_str().unwrap()).err().unwrap();
    assert!(matches!(err, Error::Io(_)));
}

// ---------------------------------------------------------------------------
// Decomposer tests over in-memory streams
// ---------------------------------------------------------------------------

#[test]
fn decomposes_example_page() {
    let page: Page<_> = Page::from_stream(IterStream::new(vec![
        text_el("title", "Example"),
        text_el("ns", "0"),
        text_el("id", "42"),
        rev(1),
        rev(2),
    ]))
    .unwrap();

    assert_eq!(page.id(), Some(42));
    assert_eq!(page.title(), Some("Example"));
    assert_eq!(page.namespace(), Some(0));
    assert_eq!(page.redirect(), None);

    let ids: Vec<u64> = page.map(|r| r.unwrap().id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn decomposes_redirect_page() {
    let page: Page<_> = Page::from_stream(IterStream::new(vec![
        text_el("title", "X"),
        Element::new("redirect").with_attr("title", "Y"),
        text_el("id", "7"),
        rev(9),
    ]))
    .unwrap();

    assert_eq!(page.redirect(), Some("Y"));
    assert_eq!(page.id(), Some(7));
    let ids: Vec<u64> = page.map(|r| r.unwrap().id).collect();
    assert_eq!(ids, vec![9]);
}

#[test]
fn rejects_unknown_metadata_tag() {
    let result: Result<Page<_>, _> = Page::from_stream(IterStream::new(vec![
        text_el("title", "X"),
        Element::new("unknown_tag"),
        text_el("id", "1"),
    ]));

    match result.err().unwrap() {
        Error::MalformedInput(Malformed::UnexpectedTag { tag, .. }) => {
            assert_eq!(tag, "unknown_tag")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn long_history_is_streamed() {
    let elements = std::iter::once(text_el("id", "1")).chain((1..=10_000).map(rev));
    let page: Page<_> = Page::from_stream(IterStream::new(elements)).unwrap();

    let mut expected = 1;
    for revision in page {
        assert_eq!(revision.unwrap().id, expected);
        expected += 1;
    }
    assert_eq!(expected, 10_001);
}

// ---------------------------------------------------------------------------
// Summary tests
// ---------------------------------------------------------------------------

#[test]
fn summary_writes_csv_rows() {
    let tmp = create_bz2_xml(sample_xml());
    let output_dir = TempDir::new().unwrap();
    let out_path = output_dir.path().join("pages.csv");

    let stats = summarize_dump(&SummaryOptions {
        input: tmp.path().to_str().unwrap(),
        output: Some(out_path.to_str().unwrap()),
        format: OutputFormat::Csv,
        limit: None,
    })
    .unwrap();

    assert_eq!(stats.pages(), 4);
    assert_eq!(stats.revisions(), 5);
    assert_eq!(stats.redirects(), 1);
    assert_eq!(stats.pages_without_revisions(), 1);
    assert_eq!(stats.namespaces(), vec![(0, 3), (14, 1)]);

    let content = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = content.trim().lines().collect();
    assert_eq!(lines.len(), 5); // header + 4 pages
    assert_eq!(
        lines[0],
        "id,title,namespace,redirect,restrictions,revisions,first_revision_id,last_revision_id"
    );
    assert_eq!(
        lines[1],
        "1,Rust (programming language),0,,move=sysop,3,100,102"
    );
    assert_eq!(lines[3], "4,Empty history,0,,,0,,");
}

#[test]
fn summary_writes_json_lines() {
    let tmp = create_bz2_xml(sample_xml());
    let output_dir = TempDir::new().unwrap();
    let out_path = output_dir.path().join("pages.jsonl");

    summarize_dump(&SummaryOptions {
        input: tmp.path().to_str().unwrap(),
        output: Some(out_path.to_str().unwrap()),
        format: OutputFormat::Json,
        limit: Some(2),
    })
    .unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    let rows: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["title"], "Rust");
    assert_eq!(rows[1]["redirect"], "Rust (programming language)");
    assert_eq!(rows[1]["revisions"], 1);
    assert!(rows[0]["redirect"].is_null());
}

#[test]
fn summary_fails_on_corrupt_dump() {
    let tmp = create_bz2_xml(
        "<mediawiki><page><title>A</title><bogus/>\
         <revision><id>1</id></revision></page></mediawiki>",
    );

    let err = summarize_dump(&SummaryOptions {
        input: tmp.path().to_str().unwrap(),
        output: None,
        format: OutputFormat::Csv,
        limit: None,
    })
    .unwrap_err();

    assert!(format!("{:#}", err).contains("'bogus'"));
}
