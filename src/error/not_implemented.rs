use std::{error::Error, fmt};

/// The requested operation is not implemented.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NotImplemented {
    /// Name of the missing operation.
    pub operation: &'static str,
}

impl NotImplemented {
    pub(crate) const fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

impl fmt::Display for NotImplemented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not implemented", self.operation)
    }
}

impl Error for NotImplemented {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
