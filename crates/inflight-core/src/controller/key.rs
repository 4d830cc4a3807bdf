use std::{fmt, sync::Arc};

/// Identity of a tracked operation.
///
/// Assigned by the controller on `track`, unique per controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl OperationId {
    pub(crate) fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Raw sequence value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{:x}", self.0)
    }
}

/// Human-readable label attached to a tracked operation.
///
/// Used for logs and metric tags only. Labels are not unique and never used for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey(Arc<str>);

impl OperationKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationKey {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for OperationKey {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for OperationKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
