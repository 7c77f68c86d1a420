use thiserror::Error;

// Unified error type for fesolve

#[derive(Error, Debug)]
pub enum KError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("numerical error: {0}")]
    Numerical(String),
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("{method}: {source}")]
    Inner {
        method: &'static str,
        #[source]
        source: Box<KError>,
    },
}

impl KError {
    /// Wrap an error raised by a nested solve with the name of the enclosing method.
    pub fn within(self, method: &'static str) -> Self {
        KError::Inner { method, source: Box::new(self) }
    }

    /// True for numerical breakdowns, at any nesting depth.
    pub fn is_numerical(&self) -> bool {
        match self {
            KError::Numerical(_) => true,
            KError::Inner { source, .. } => source.is_numerical(),
            _ => false,
        }
    }

    /// True for errors caused by caller configuration, at any nesting depth.
    pub fn is_configuration(&self) -> bool {
        match self {
            KError::Configuration(_) => true,
            KError::Inner { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}
