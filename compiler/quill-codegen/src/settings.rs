//! Settings that affect how symbols are produced.

use quill_target::{Target, version::RuntimeVersion};

/// All settings that are related to code generation.
#[derive(Debug, Clone)]
pub struct CodeGenSettings {
    /// The target that code is being generated for.
    pub target: Target,

    /// An explicitly specified minimum runtime version that the emitted code
    /// must be compatible with. If this is [`None`], the version is derived
    /// from the deployment target, see
    /// [`CodeGenSettings::runtime_compatibility_version`].
    pub runtime_compatibility_version: Option<RuntimeVersion>,

    /// Don't use the standard substitutions when mangling types for
    /// reflection metadata. This allows reflection metadata to be read by
    /// tools that don't know about them.
    pub disable_standard_substitutions_in_reflection_mangling: bool,
}

impl CodeGenSettings {
    /// Create settings for a particular target, with everything else
    /// defaulted.
    pub fn for_target(target: Target) -> Self {
        Self { target, ..Default::default() }
    }

    /// The oldest runtime that the emitted code may run against. [`None`]
    /// means that there is no back-deployment constraint, the runtime is
    /// always the one the compiler ships with.
    pub fn runtime_compatibility_version(&self) -> Option<RuntimeVersion> {
        self.runtime_compatibility_version.or_else(|| self.target.runtime_compatibility_version())
    }

    /// Whether the runtime understands the standard substitutions of the
    /// concurrency library.
    pub fn allow_concurrency_standard_substitutions(&self) -> bool {
        self.runtime_compatibility_version().is_none_or(|version| version >= RuntimeVersion::CONCURRENCY)
    }
}

impl Default for CodeGenSettings {
    fn default() -> Self {
        Self {
            target: Target::default(),
            runtime_compatibility_version: None,
            disable_standard_substitutions_in_reflection_mangling: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_for(triple: &str) -> CodeGenSettings {
        CodeGenSettings::for_target(Target::from_triple(triple).unwrap())
    }

    #[test]
    fn test_runtime_compatibility_version() {
        assert_eq!(
            settings_for("x86_64-apple-macosx10.15").runtime_compatibility_version(),
            Some(RuntimeVersion::new(5, 1))
        );
        assert_eq!(settings_for("aarch64-unknown-linux-gnu").runtime_compatibility_version(), None);

        // An explicit version wins over the deployment target.
        let settings = CodeGenSettings {
            runtime_compatibility_version: Some(RuntimeVersion::new(5, 7)),
            ..settings_for("x86_64-apple-macosx10.15")
        };
        assert_eq!(settings.runtime_compatibility_version(), Some(RuntimeVersion::new(5, 7)));
    }

    #[test]
    fn test_concurrency_substitutions_are_version_gated() {
        assert!(!settings_for("arm64-apple-macos11.0").allow_concurrency_standard_substitutions());
        assert!(!settings_for("arm64-apple-ios14.5").allow_concurrency_standard_substitutions());
        assert!(settings_for("arm64-apple-macos12.0").allow_concurrency_standard_substitutions());
        assert!(settings_for("arm64-apple-watchos8.0").allow_concurrency_standard_substitutions());

        // No back-deployment constraint at all.
        assert!(settings_for("x86_64-unknown-linux-gnu").allow_concurrency_standard_substitutions());
    }
}
