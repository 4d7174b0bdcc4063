use crate::config::{PROGRESS_INTERVAL, WRITE_BUFFER_SIZE};
use crate::page::PageInfo;
use crate::parser::WikiReader;
use crate::stats::DumpStats;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

pub struct SummaryOptions<'a> {
    pub input: &'a str,
    /// Where to write one row per page; `None` only collects stats
    pub output: Option<&'a str>,
    pub format: OutputFormat,
    pub limit: Option<u64>,
}

/// One output row: page metadata plus what was seen while draining its revisions.
#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub namespace: Option<i32>,
    pub redirect: Option<String>,
    pub restrictions: Option<String>,
    pub revisions: u64,
    pub first_revision_id: Option<u64>,
    pub last_revision_id: Option<u64>,
}

impl PageSummary {
    fn new(info: PageInfo) -> Self {
        Self {
            id: info.id,
            title: info.title,
            namespace: info.namespace,
            redirect: info.redirect,
            restrictions: info.restrictions,
            revisions: 0,
            first_revision_id: None,
            last_revision_id: None,
        }
    }

    fn push_revision(&mut self, id: u64) {
        self.revisions += 1;
        self.first_revision_id.get_or_insert(id);
        self.last_revision_id = Some(id);
    }
}

enum SummaryWriter {
    Csv(csv::Writer<BufWriter<File>>),
    Json(BufWriter<File>),
}

impl SummaryWriter {
    fn create(path: &str, format: OutputFormat) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
        let out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        Ok(match format {
            OutputFormat::Csv => SummaryWriter::Csv(csv::Writer::from_writer(out)),
            OutputFormat::Json => SummaryWriter::Json(out),
        })
    }

    fn write(&mut self, summary: &PageSummary) -> Result<()> {
        match self {
            SummaryWriter::Csv(w) => w.serialize(summary)?,
            SummaryWriter::Json(w) => {
                serde_json::to_writer(&mut *w, summary)?;
                w.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        match self {
            SummaryWriter::Csv(mut w) => w.flush()?,
            SummaryWriter::Json(mut w) => w.flush()?,
        }
        Ok(())
    }
}

/// Walks every page of the dump at `options.input`, draining each page's revisions.
pub fn summarize_dump(options: &SummaryOptions) -> Result<DumpStats> {
    let reader = WikiReader::open(options.input)
        .with_context(|| format!("Failed to open wiki dump at: {}", options.input))?;
    let writer = options
        .output
        .map(|path| SummaryWriter::create(path, options.format))
        .transpose()?;

    info!("Summarizing dump: {}", options.input);
    summarize_pages(reader, writer, options.limit)
}

fn summarize_pages<R: BufRead>(
    mut reader: WikiReader<R>,
    mut writer: Option<SummaryWriter>,
    limit: Option<u64>,
) -> Result<DumpStats> {
    let mut stats = DumpStats::new();
    let pb = ProgressBar::new_spinner();

    while limit.map_or(true, |max| stats.pages() < max) {
        let position = reader.position();
        let Some(page) = reader
            .next_page()
            .with_context(|| format!("Failed to read page near byte {}", position))?
        else {
            break;
        };

        let (info, revisions) = page.into_parts();
        let mut summary = PageSummary::new(info.clone());
        for revision in revisions {
            let revision = revision.with_context(|| {
                format!(
                    "Failed to read revision {} of page {:?}",
                    summary.revisions + 1,
                    info.title.as_deref().unwrap_or("<untitled>")
                )
            })?;
            summary.push_revision(revision.id);
        }

        debug!(id = info.id, revisions = summary.revisions, "Page summarized");
        stats.record_page(&info, summary.revisions);

        if let Some(w) = writer.as_mut() {
            w.write(&summary)?;
        }
        if stats.pages() % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }

    pb.finish_and_clear();
    if let Some(w) = writer {
        w.finish()?;
    }

    info!(
        pages = stats.pages(),
        revisions = stats.revisions(),
        redirects = stats.redirects(),
        "Dump summarized"
    );
    Ok(stats)
}
