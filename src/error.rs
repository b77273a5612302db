use thiserror::Error;

#[derive(Error, Debug)]
pub enum TablewalkError {
    /// A navigation asked for a position outside `[0, len[`.
    #[error("Index {index} out of the limits [0, {len}[")]
    IndexOutOfBounds { index: isize, len: usize },
    /// A view factory could not bind a view to its element. This is never a
    /// data problem: it means a navigation was wired with the wrong factory.
    #[error(
        "There is an exception '{cause}'\n\t in the instantiation of the element {view_type}\n\t on {element_type} with {signature}.\n It is normally impossible.\n That means there is a mistake in the use of the \"position\" in the navigation code.\n Please report this as a bug if you meet this problem."
    )]
    Instantiation {
        signature: String,
        view_type: &'static str,
        element_type: &'static str,
        cause: String,
    },
    #[error("{kind} {name} does not exist")]
    NotFound { kind: &'static str, name: String },
    #[error("[{description}] {message}")]
    Assertion { description: String, message: String },
    #[error("Config error: {0}")]
    Config(String),
}

impl TablewalkError {
    pub(crate) fn out_of_bounds(index: isize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
    pub fn is_index_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }
    pub fn is_instantiation(&self) -> bool {
        matches!(self, Self::Instantiation { .. })
    }
}

pub type Result<T> = std::result::Result<T, TablewalkError>;

impl From<config::ConfigError> for TablewalkError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
