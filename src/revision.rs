use crate::config::REVISION_TAG;
use crate::element::Element;
use crate::error::{Malformed, Result};
use serde::Serialize;

/// Builds a record from one sub-element, failing if the element has the wrong shape.
pub trait FromElement: Sized {
    fn from_element(element: Element) -> Result<Self>;
}

/// Raw access: hand the element through untouched.
impl FromElement for Element {
    fn from_element(element: Element) -> Result<Self> {
        Ok(element)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub id: Option<u64>,
    pub username: Option<String>,
    pub ip: Option<String>,
}

/// One historical revision of a page, parsed from a `<revision>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub timestamp: Option<String>,
    pub contributor: Option<Contributor>,
    pub minor: bool,
    pub comment: Option<String>,
    pub text: Option<String>,
    pub sha1: Option<String>,
    pub model: Option<String>,
    pub format: Option<String>,
}

impl FromElement for Revision {
    fn from_element(element: Element) -> Result<Self> {
        if element.tag() != REVISION_TAG {
            return Err(Malformed::UnexpectedTag {
                tag: element.tag().to_string(),
                expected: "revision",
                context: "a <revision>",
            }
            .into());
        }

        let mut id = None;
        let mut revision = Revision {
            id: 0,
            parent_id: None,
            timestamp: None,
            contributor: None,
            minor: false,
            comment: None,
            text: None,
            sha1: None,
            model: None,
            format: None,
        };

        // Children we don't model (e.g. <origin>) are ignored.
        for child in element.into_children() {
            match child.tag() {
                "id" => id = Some(parse_u64("revision.id", child.text())?),
                "parentid" => {
                    revision.parent_id = Some(parse_u64("revision.parentid", child.text())?)
                }
                "timestamp" => revision.timestamp = child.into_text(),
                "contributor" => revision.contributor = Some(Contributor::from_element(child)?),
                "minor" => revision.minor = true,
                "comment" => revision.comment = child.into_text(),
                "text" => revision.text = child.into_text(),
                "sha1" => revision.sha1 = child.into_text(),
                "model" => revision.model = child.into_text(),
                "format" => revision.format = child.into_text(),
                _ => {}
            }
        }

        revision.id = id.ok_or(Malformed::MissingField {
            field: "id",
            context: "a <revision>",
        })?;
        Ok(revision)
    }
}

impl FromElement for Contributor {
    fn from_element(element: Element) -> Result<Self> {
        let mut contributor = Contributor::default();
        for child in element.into_children() {
            match child.tag() {
                "id" => contributor.id = Some(parse_u64("contributor.id", child.text())?),
                "username" => contributor.username = child.into_text(),
                "ip" => contributor.ip = child.into_text(),
                _ => {}
            }
        }
        Ok(contributor)
    }
}

fn parse_u64(field: &'static str, text: Option<&str>) -> Result<u64> {
    let raw = text.unwrap_or_default();
    raw.trim().parse().map_err(|_| {
        Malformed::InvalidInteger {
            field,
            value: raw.to_string(),
        }
        .into()
    })
}
