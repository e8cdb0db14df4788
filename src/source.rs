//! Where landmark sequences come from.
//!
//! The production sequence service is external; [`SequenceSource`] is the seam it plugs into.
//! Two local sources ship with the crate, plus [`InputDebounce`] which coalesces keystrokes into
//! fetch requests.

use crate::foundation::error::{SignplayError, SignplayResult};
use crate::model::landmark::{Sequence, SignSequenceSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Turns input text into a landmark sequence set.
pub trait SequenceSource {
    /// Fetch the sequences for `text`. Failures are [`SignplayError::SequenceFetch`].
    fn fetch(&mut self, text: &str) -> SignplayResult<SignSequenceSet>;
}

impl<S: SequenceSource + ?Sized> SequenceSource for Box<S> {
    fn fetch(&mut self, text: &str) -> SignplayResult<SignSequenceSet> {
        (**self).fetch(text)
    }
}

/// Serves one `{ "sequences": [...] }` file for every input.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source reading `path` on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SequenceSource for JsonFileSource {
    fn fetch(&mut self, _text: &str) -> SignplayResult<SignSequenceSet> {
        SignSequenceSet::from_path(&self.path)
            .map_err(|e| SignplayError::sequence_fetch(e.to_string()))
    }
}

/// A directory holding one clip per word, `<dir>/<word>.json`, each a bare array of frames.
///
/// A text maps to the clips of its words in order. Words are lowercased and stripped of
/// surrounding punctuation.
#[derive(Clone, Debug)]
pub struct ClipLibrary {
    dir: PathBuf,
}

impl ClipLibrary {
    /// Library rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the clip for `word`, which must already be normalized.
    pub fn clip_path(&self, word: &str) -> PathBuf {
        self.dir.join(format!("{word}.json"))
    }
}

/// Split `text` into lowercase clip names.
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl SequenceSource for ClipLibrary {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn fetch(&mut self, text: &str) -> SignplayResult<SignSequenceSet> {
        let words = words(text);
        if words.is_empty() {
            return Err(SignplayError::sequence_fetch("input has no words to sign"));
        }

        let mut sequences = Vec::with_capacity(words.len());
        for word in &words {
            let path = self.clip_path(word);
            if !path.is_file() {
                return Err(SignplayError::sequence_fetch(format!("no clip for word '{word}'")));
            }
            let clip = Sequence::from_path(&path)
                .map_err(|e| SignplayError::sequence_fetch(format!("clip '{word}': {e}")))?;
            sequences.push(clip);
        }
        tracing::debug!(clips = sequences.len(), "clips resolved");
        Ok(SignSequenceSet::new(sequences))
    }
}

/// Coalesces rapid input edits into one fetch request.
///
/// Each edit re-arms the timer; the text becomes due once it has been stable for `delay`, and is
/// emitted exactly as typed. Blank input cancels the pending request and is reported once as
/// `Some("")` so the caller can clear playback.
#[derive(Clone, Debug)]
pub struct InputDebounce {
    delay: Duration,
    pending: Option<(String, Duration)>,
    last_emitted: Option<String>,
}

impl Default for InputDebounce {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl InputDebounce {
    /// Delay used by the player UI.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    /// Debouncer firing `delay` after the last edit.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_emitted: None,
        }
    }

    /// Record an edit at `now`.
    pub fn edit(&mut self, text: &str, now: Duration) {
        let blank = text.trim().is_empty();
        let text = if blank { "" } else { text };
        if self.last_emitted.as_deref() == Some(text) {
            self.pending = None;
            return;
        }
        let due = if blank { now } else { now + self.delay };
        self.pending = Some((text.to_owned(), due));
    }

    /// When the pending request becomes due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Take the request due at `now`, if any.
    pub fn poll(&mut self, now: Duration) -> Option<String> {
        let (text, _) = self.pending.take_if(|(_, due)| *due <= now)?;
        self.last_emitted = Some(text.clone());
        Some(text)
    }
}

#[cfg(test)]
#[path = "../tests/unit/source/mod.rs"]
mod tests;
