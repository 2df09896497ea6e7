use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(Arc<str>);

impl FormId {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Channel every mounted field of this form listens on for submit attempts.
    pub fn submission_channel(&self) -> ChannelKey {
        ChannelKey::new(format!("FORM_{}_SUBMISSION_ATTEMPT", self.0))
    }

    pub fn change_channel(&self) -> ChannelKey {
        ChannelKey::new(format!("FORM_{}_VALUES_CHANGED", self.0))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FormId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelKey(Arc<str>);

impl ChannelKey {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChannelKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChannelKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&ChannelKey> for ChannelKey {
    fn from(value: &ChannelKey) -> Self {
        value.clone()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriberHandle(pub u64);
