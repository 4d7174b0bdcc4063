use crate::config::REVISION_TAG;
use crate::element::{Element, ElementStream};
use crate::error::{Error, Malformed, Result};
use crate::revision::{FromElement, Revision};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use tracing::{debug, trace};

enum State {
    Active,
    Finished,
    Failed(String),
}

/// Lazy, single-pass sequence of the revisions of one page.
///
/// Every pull advances the element stream shared with the page that created it. After
/// the stream is exhausted every pull returns `None`. After a structural fault (an unexpected
/// tag or a stream failure) every pull returns [`Error::Poisoned`].
pub struct Revisions<S, R = Revision> {
    stream: S,
    first: Option<Element>,
    state: State,
    yielded: u64,
    _record: PhantomData<fn() -> R>,
}

impl<S: ElementStream, R: FromElement> Revisions<S, R> {
    /// `first` is the element that ended the metadata scan, if there was one. Without it the
    /// sequence is empty and the stream is left untouched.
    pub(crate) fn new(stream: S, first: Option<Element>) -> Self {
        let state = if first.is_some() {
            State::Active
        } else {
            State::Finished
        };
        Self {
            stream,
            first,
            state,
            yielded: 0,
            _record: PhantomData,
        }
    }

    /// Number of revisions handed out so far.
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Gives the underlying stream back, positioned after the last element pulled.
    pub fn into_stream(self) -> S {
        self.stream
    }

    fn poison(&mut self, err: Error) -> Error {
        debug!(error = %err, yielded = self.yielded, "Revision sequence poisoned");
        self.state = State::Failed(err.to_string());
        err
    }

    fn pull(&mut self) -> Result<Option<Element>> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }
        match self.stream.next_element() {
            Ok(Some(element)) if element.tag() == REVISION_TAG => Ok(Some(element)),
            Ok(Some(element)) => Err(self.poison(
                Malformed::UnexpectedTag {
                    tag: element.tag().to_string(),
                    expected: "'revision'",
                    context: "the revisions of a <page>",
                }
                .into(),
            )),
            Ok(None) => {
                trace!(yielded = self.yielded, "Revision sequence exhausted");
                self.state = State::Finished;
                Ok(None)
            }
            Err(err) => Err(self.poison(err)),
        }
    }
}

impl<S: ElementStream, R: FromElement> Iterator for Revisions<S, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.state {
            State::Active => {}
            State::Finished => return None,
            State::Failed(cause) => {
                return Some(Err(Error::Poisoned {
                    cause: cause.clone(),
                }))
            }
        }

        let element = match self.pull() {
            Ok(Some(element)) => element,
            Ok(None) => return None,
            Err(err) => return Some(Err(err)),
        };

        // A bad revision body only fails this pull; the stream is still on an element boundary.
        let record = R::from_element(element);
        if record.is_ok() {
            self.yielded += 1;
        }
        Some(record)
    }
}

impl<S: ElementStream, R: FromElement> FusedIterator for Revisions<S, R> {}
