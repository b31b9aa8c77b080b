use std::collections::BTreeMap;

/// Built-in mask name for card numbers.
pub const MASK_CREDITCARD: &str = "CREDITCARD";
/// Built-in mask name for US social security numbers.
pub const MASK_SSN: &str = "SSN";
/// Built-in mask name for IPv4 addresses.
pub const MASK_IP: &str = "IP";

fn builtin_pattern(value: &str) -> Option<&'static str> {
    match value {
        MASK_CREDITCARD => Some(r"\b(?:\d[ -]*?){13,16}\b"),
        MASK_SSN => Some(r"\b\d{3}-\d{2}-\d{4}\b"),
        MASK_IP => Some(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b"),
        _ => None,
    }
}

/// Registry of masking patterns, assembled once at appender startup and
/// handed to the delivery backend, which owns the actual masking of
/// outbound payloads. Nothing here runs on the per-event path.
///
/// A mask is added by built-in name ([`MASK_CREDITCARD`], [`MASK_SSN`],
/// [`MASK_IP`]) or by a raw regex string; removal uses the same value the
/// mask was added with.
#[derive(Debug, Clone, Default)]
pub struct Masker {
    patterns: BTreeMap<String, String>,
}

impl Masker {
    pub fn new() -> Self {
        Masker::default()
    }

    pub fn add_mask(&mut self, value: &str) {
        let pattern = builtin_pattern(value).unwrap_or(value);
        self.patterns.insert(value.to_string(), pattern.to_string());
    }

    pub fn remove_mask(&mut self, value: &str) {
        self.patterns.remove(value);
    }

    pub fn has_mask(&self, value: &str) -> bool {
        self.patterns.contains_key(value)
    }

    /// The registered regex patterns, for the backend to compile.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One named mask toggle from configuration: enables a built-in or custom
/// pattern, or disables one that would otherwise be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskOverride {
    pub value: String,
    pub enabled: bool,
}

impl MaskOverride {
    pub fn enabled(value: impl Into<String>) -> Self {
        MaskOverride {
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(value: impl Into<String>) -> Self {
        MaskOverride {
            value: value.into(),
            enabled: false,
        }
    }
}
