use crate::error::Result;

/// One tokenized XML sub-element: a tag plus its text, attributes and children.
///
/// Elements are produced whole by an [`ElementStream`]; re-reading fields of an element
/// already in hand is free and never touches the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn into_text(self) -> Option<String> {
        self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute lookup falling back to `default` when the attribute is absent.
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Element> {
        self.children
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(Element::text)
    }
}

/// Forward-only producer of the sibling elements under one open parent element.
///
/// `Ok(None)` means the parent has no further children. Implementations never revisit an
/// element once it has been handed out.
pub trait ElementStream {
    fn next_element(&mut self) -> Result<Option<Element>>;
}

impl<S: ElementStream + ?Sized> ElementStream for &mut S {
    fn next_element(&mut self) -> Result<Option<Element>> {
        (**self).next_element()
    }
}

/// [`ElementStream`] over elements that are already in memory.
pub struct IterStream<I> {
    inner: I,
}

impl<I: Iterator<Item = Element>> IterStream<I> {
    pub fn new(elements: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: elements.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Element>> ElementStream for IterStream<I> {
    fn next_element(&mut self) -> Result<Option<Element>> {
        Ok(self.inner.next())
    }
}
