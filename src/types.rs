use std::fmt;

use crate::error::{LoadError, Result};

/// Identifier of one instance of the split deployment.
///
/// The trailing decimal digits are the instance number, which picks its
/// port: `base_port + number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn number(&self) -> Result<u32> {
        let digits = self.0.len() - self.0.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        self.0[self.0.len() - digits..]
            .parse()
            .map_err(|_| LoadError::InvalidInstanceId(self.0.clone()))
    }

    pub fn port(&self, base: u16) -> Result<u16> {
        let overflow = || LoadError::PortOverflow {
            id: self.0.clone(),
            base,
        };
        let offset = u16::try_from(self.number()?).map_err(|_| overflow())?;
        base.checked_add(offset).ok_or_else(overflow)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Ordered snapshot of known instances. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSet {
    ids: Vec<InstanceId>,
}

impl InstanceSet {
    /// Ids are ordered by instance number, then text; duplicates are dropped.
    pub fn new(mut ids: Vec<InstanceId>) -> Self {
        ids.sort_by(|a, b| {
            a.number()
                .ok()
                .cmp(&b.number().ok())
                .then_with(|| a.cmp(b))
        });
        ids.dedup();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&InstanceId> {
        self.ids.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceId> {
        self.ids.iter()
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.ids.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Write,
    Read,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Write => "SET",
            OpKind::Read => "GET",
        }
    }
}

/// One generated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Write { key: String },
    Read { key: String },
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Write { .. } => OpKind::Write,
            Operation::Read { .. } => OpKind::Read,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Operation::Write { key } | Operation::Read { key } => key,
        }
    }
}
