use std::collections::HashSet;

/// Classes of the standard library, always valid as type names.
pub const BUILTIN_TYPES: [&str; 8] = [
    "Math", "String", "Array", "Output", "Screen", "Keyboard", "Memory", "Sys",
];

/// Set of identifiers that may appear in `className` positions.
///
/// Filled by the batch pre-pass, then only read while parsing.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    names: HashSet<String>,
}

impl TypeRegistry {
    /// A registry holding the built-in library types.
    pub fn new() -> Self {
        TypeRegistry {
            names: BUILTIN_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns false if the name was already present.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
