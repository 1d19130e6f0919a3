use std::fmt;

/// The two record kinds this resolver caches. Everything else is forwarded
/// upstream without touching the caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Address,
    NameServer,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Address => "A",
            CacheKind::NameServer => "NS",
        }
    }

    /// Classify a question by its wire record-type code.
    pub fn from_type_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(CacheKind::Address),
            2 => Some(CacheKind::NameServer),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
