//! Tables of the "standard" substitutions: well-known types of the standard
//! library (and the concurrency library) which have a compact mangling that
//! the runtime knows how to resolve without a descriptor lookup.

use phf::phf_map;
use quill_types::{
    TyCtx,
    decl::{DeclContext, NominalId},
};

use crate::ManglingPolicy;

/// Standard library types, mangled as `S` followed by a single character.
static STANDARD_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    // structures
    "AutoreleasingUnsafeMutablePointer" => "SA",
    "Array" => "Sa",
    "Bool" => "Sb",
    "Dictionary" => "SD",
    "Double" => "Sd",
    "Float" => "Sf",
    "Set" => "Sh",
    "DefaultIndices" => "SI",
    "Int" => "Si",
    "Character" => "SJ",
    "ClosedRange" => "SN",
    "Range" => "Sn",
    "ObjectIdentifier" => "SO",
    "UnsafePointer" => "SP",
    "UnsafeMutablePointer" => "Sp",
    "UnsafeBufferPointer" => "SR",
    "UnsafeMutableBufferPointer" => "Sr",
    "String" => "SS",
    "Substring" => "Ss",
    "UInt" => "Su",
    "UnsafeRawPointer" => "SV",
    "UnsafeMutableRawPointer" => "Sv",
    "UnsafeRawBufferPointer" => "SW",
    "UnsafeMutableRawBufferPointer" => "Sw",

    // enums
    "Optional" => "Sq",

    // protocols
    "BinaryFloatingPoint" => "SB",
    "Encodable" => "SE",
    "Decodable" => "Se",
    "FloatingPoint" => "SF",
    "RandomNumberGenerator" => "SG",
    "Hashable" => "SH",
    "Numeric" => "Sj",
    "BidirectionalCollection" => "SK",
    "RandomAccessCollection" => "Sk",
    "Comparable" => "SL",
    "Collection" => "Sl",
    "MutableCollection" => "SM",
    "RangeReplaceableCollection" => "Sm",
    "Equatable" => "SQ",
    "Sequence" => "ST",
    "IteratorProtocol" => "St",
    "UnsignedInteger" => "SU",
    "RangeExpression" => "SX",
    "Strideable" => "Sx",
    "RawRepresentable" => "SY",
    "StringProtocol" => "Sy",
    "SignedInteger" => "SZ",
    "BinaryInteger" => "Sz",
};

/// Concurrency library types, mangled as `Sc` followed by a single
/// character. Older runtimes don't know about these.
static CONCURRENCY_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "Actor" => "ScA",
    "CheckedContinuation" => "ScC",
    "UnsafeContinuation" => "Scc",
    "CancellationError" => "ScE",
    "UnownedSerialExecutor" => "Sce",
    "Executor" => "ScF",
    "SerialExecutor" => "Scf",
    "TaskGroup" => "ScG",
    "ThrowingTaskGroup" => "Scg",
    "AsyncIteratorProtocol" => "ScI",
    "AsyncSequence" => "Sci",
    "UnownedJob" => "ScJ",
    "MainActor" => "ScM",
    "TaskPriority" => "ScP",
    "AsyncStream" => "ScS",
    "AsyncThrowingStream" => "Scs",
    "Task" => "ScT",
    "UnsafeCurrentTask" => "Sct",
};

/// Look up the standard substitution for a type name. Concurrency types are
/// only considered if `allow_concurrency` is set, which never affects the
/// other standard types.
pub fn standard_type_substitution(name: &str, allow_concurrency: bool) -> Option<&'static str> {
    if let Some(code) = STANDARD_TYPES.get(name).copied() {
        return Some(code);
    }

    if allow_concurrency { CONCURRENCY_TYPES.get(name).copied() } else { None }
}

/// Get the standard substitution of a nominal declaration under the given
/// policy. Only top-level declarations of modules that provide standard
/// substitutions are eligible.
pub fn standard_substitution_for(
    tcx: &TyCtx,
    policy: &ManglingPolicy,
    decl: NominalId,
) -> Option<&'static str> {
    if !policy.allow_standard_substitutions {
        return None;
    }

    let nominal = tcx.nominal(decl);
    let DeclContext::Module(module) = nominal.parent else {
        return None;
    };

    if !tcx.module(module).has_standard_substitutions() {
        return None;
    }

    standard_type_substitution(nominal.name.as_str(), policy.allow_concurrency_standard_substitutions)
}
