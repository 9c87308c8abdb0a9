//! Version gating of the optional manglings. Newer runtimes understand more
//! compact encodings than older ones, so the mangling of anything that the
//! runtime decodes must be restricted to what the oldest runtime the code may
//! run against understands.

use quill_mangle::ManglingPolicy;

use crate::settings::CodeGenSettings;

/// Restrict `policy` for mangling reflection metadata on the target
/// described by `settings`.
///
/// The result never allows something that `policy` doesn't already allow:
/// each flag is combined with the existing one.
pub fn reflection_policy(settings: &CodeGenSettings, policy: ManglingPolicy) -> ManglingPolicy {
    ManglingPolicy {
        allow_standard_substitutions: policy.allow_standard_substitutions
            && !settings.disable_standard_substitutions_in_reflection_mangling,
        allow_concurrency_standard_substitutions: policy.allow_concurrency_standard_substitutions
            && settings.allow_concurrency_standard_substitutions(),
        // Marker protocols have no runtime representation.
        allow_marker_protocols: false,
        ..policy
    }
}
