//! Descriptions of user-supplied callables.

use serde::{Deserialize, Serialize};

/// Text used for closures when the caller gave no description.
pub const DEFAULT_FUNCTION_DESCRIPTION: &str = "Function";

/// Whether a callable runs to completion or may suspend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timing {
    Synchronous,
    Asynchronous,
}

/// Describes an action, guard or selector for diagnostics and tooling.
///
/// The method name is taken from the callable's type name. Closures get a
/// compiler-generated name, so for those the description falls back to the
/// default text captured when the value was built.
///
/// # Example
///
/// ```rust
/// use hierarch::core::{InvocationInfo, Timing};
///
/// fn record_entry() {}
///
/// let named = InvocationInfo::of(&record_entry, None, Timing::Synchronous, "Function");
/// assert!(named.description().ends_with("record_entry"));
///
/// let closure = || {};
/// let anonymous = InvocationInfo::of(&closure, None, Timing::Synchronous, "Function");
/// assert_eq!(anonymous.description(), "Function");
///
/// let described = InvocationInfo::of(&closure, Some("unlock bolt"), Timing::Asynchronous, "Function");
/// assert_eq!(described.description(), "unlock bolt");
/// assert!(described.is_async());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationInfo {
    method_name: Option<String>,
    user_description: Option<String>,
    timing: Timing,
    default_description: String,
}

impl InvocationInfo {
    /// Describe the callable `f`.
    pub fn of<F: ?Sized>(
        _f: &F,
        description: Option<&str>,
        timing: Timing,
        default_description: &str,
    ) -> Self {
        Self::new(
            Some(std::any::type_name::<F>().to_string()),
            description,
            timing,
            default_description,
        )
    }

    /// Build from explicit parts.
    pub fn new(
        method_name: Option<String>,
        description: Option<&str>,
        timing: Timing,
        default_description: &str,
    ) -> Self {
        Self {
            method_name,
            user_description: description.map(str::to_string),
            timing,
            default_description: default_description.to_string(),
        }
    }

    /// Replace the fallback text if it is still the crate-wide default.
    pub fn with_default_description(mut self, default_description: &str) -> Self {
        if self.default_description == DEFAULT_FUNCTION_DESCRIPTION {
            self.default_description = default_description.to_string();
        }
        self
    }

    /// Name of the callable's type; compiler-generated for closures.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// The description the caller supplied, if any.
    pub fn user_description(&self) -> Option<&str> {
        self.user_description.as_deref()
    }

    /// Resolved description: user text, else the default text for
    /// compiler-generated names, else the method name.
    pub fn description(&self) -> &str {
        if let Some(description) = &self.user_description {
            return description;
        }

        match &self.method_name {
            Some(name) if !is_compiler_generated(name) => name,
            _ => &self.default_description,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn is_async(&self) -> bool {
        self.timing == Timing::Asynchronous
    }
}

fn is_compiler_generated(name: &str) -> bool {
    name.contains("{{closure}}") || name.contains('<') || name.contains('`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_valve() {}

    #[test]
    fn named_function_uses_its_path() {
        let info = InvocationInfo::of(&open_valve, None, Timing::Synchronous, "Function");

        assert!(info.method_name().is_some());
        assert!(info.description().ends_with("open_valve"));
        assert!(!info.is_async());
    }

    #[test]
    fn closure_falls_back_to_default() {
        let closure = |_: u8| {};
        let info = InvocationInfo::of(&closure, None, Timing::Synchronous, "Lambda");

        assert_eq!(info.description(), "Lambda");
    }

    #[test]
    fn user_description_wins() {
        let closure = || {};
        let info = InvocationInfo::of(&closure, Some("ring bell"), Timing::Synchronous, "Function");

        assert_eq!(info.description(), "ring bell");
        assert_eq!(info.user_description(), Some("ring bell"));
    }

    #[test]
    fn missing_method_name_uses_default() {
        let info = InvocationInfo::new(None, None, Timing::Asynchronous, DEFAULT_FUNCTION_DESCRIPTION);

        assert_eq!(info.description(), "Function");
        assert!(info.is_async());
    }

    #[test]
    fn generic_names_count_as_generated() {
        assert!(is_compiler_generated("core::option::Option<u8>"));
        assert!(is_compiler_generated("app::main::{{closure}}"));
        assert!(!is_compiler_generated("app::handlers::unlock"));
    }

    #[test]
    fn serializes_for_tooling() {
        let info = InvocationInfo::new(
            Some("app::unlock".to_string()),
            Some("unlock"),
            Timing::Asynchronous,
            "Function",
        );

        let json = serde_json::to_string(&info).unwrap();
        let restored: InvocationInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, restored);
    }
}
