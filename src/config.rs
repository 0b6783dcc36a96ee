/*
 * This modules contains the `BilouConfig` struct and its builder. The config is shared by the
 * record reader (inline comment marker) and the corpus driver (parallel processing). It implements
 * the default trait, which matches the layout of the annotated corpus.
*/
use std::fmt::{Debug, Display};

/// Marker starting an inline comment in the annotation records.
pub const DEFAULT_COMMENT_MARKER: &str = " # ";

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// Config struct used to simplify the inputs of parameters to the reader and to the corpus
/// functions of this crate. It implements the default trait.
pub struct BilouConfig {
    /// Can we use multiple cores to process the documents? Each document is processed by a
    /// single task, the documents are independent.
    pub(crate) parallel: bool,
    /// Everything following this marker on a record line is ignored. An empty marker disables
    /// comment stripping.
    pub(crate) comment_marker: String,
}

impl BilouConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn comment_marker(&self) -> &str {
        &self.comment_marker
    }
}

impl Default for BilouConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            comment_marker: String::from(DEFAULT_COMMENT_MARKER),
        }
    }
}

impl From<BilouConfigBuilder> for BilouConfig {
    fn from(value: BilouConfigBuilder) -> Self {
        Self {
            parallel: value.parallel,
            comment_marker: value.comment_marker,
        }
    }
}

impl From<BilouConfig> for (bool, String) {
    fn from(value: BilouConfig) -> Self {
        (value.parallel, value.comment_marker)
    }
}

impl Display for BilouConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Using parallel computations: {}\n Inline comment marker: {:?}",
            self.parallel, self.comment_marker
        )
    }
}

/// This builder can be used to build and customize a `BilouConfig` stucture.
#[derive(Clone, Debug)]
pub struct BilouConfigBuilder {
    parallel: bool,
    comment_marker: String,
}

impl Default for BilouConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BilouConfigBuilder {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn comment_marker<S: Into<String>>(mut self, comment_marker: S) -> Self {
        self.comment_marker = comment_marker.into();
        self
    }
    pub fn new() -> Self {
        Self {
            parallel: false,
            comment_marker: String::from(DEFAULT_COMMENT_MARKER),
        }
    }
    pub fn build(self) -> BilouConfig {
        BilouConfig::from(self)
    }
}
