//! Declarations that the mangler refers to: modules, nominal types and
//! opaque result types.

use bitflags::bitflags;

use crate::{generics::GenericSignature, identifier::Identifier};

index_vec::define_index_type! {
    /// Index of a [ModuleDecl] within a [crate::ctx::TyCtx].
    pub struct ModuleId = u32;

    MAX_INDEX = i32::MAX as usize;
    DISABLE_MAX_INDEX_CHECK = cfg!(not(debug_assertions));

    DEBUG_FORMAT = "module#{}";

    DISPLAY_FORMAT = "{}";
}

index_vec::define_index_type! {
    /// Index of a [NominalDecl] within a [crate::ctx::TyCtx].
    pub struct NominalId = u32;

    MAX_INDEX = i32::MAX as usize;
    DISABLE_MAX_INDEX_CHECK = cfg!(not(debug_assertions));

    DEBUG_FORMAT = "nominal#{}";

    DISPLAY_FORMAT = "{}";
}

index_vec::define_index_type! {
    /// Index of an [OpaqueDecl] within a [crate::ctx::TyCtx].
    pub struct OpaqueId = u32;

    MAX_INDEX = i32::MAX as usize;
    DISABLE_MAX_INDEX_CHECK = cfg!(not(debug_assertions));

    DEBUG_FORMAT = "opaque#{}";

    DISPLAY_FORMAT = "{}";
}

bitflags! {
    /// Properties of a module that affect how declarations within it are
    /// mangled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModuleFlags: u8 {
        /// Some types of this module have compact "standard" manglings.
        const STANDARD_SUBSTITUTIONS = 1 << 0;

        /// This is the standard library, which has a single letter mangling.
        const STDLIB = 1 << 1;
    }
}

/// A module declaration.
#[derive(Debug, Clone)]
pub struct ModuleDecl {
    pub name: Identifier,
    pub flags: ModuleFlags,
}

impl ModuleDecl {
    pub fn has_standard_substitutions(&self) -> bool {
        self.flags.contains(ModuleFlags::STANDARD_SUBSTITUTIONS)
    }

    pub fn is_stdlib(&self) -> bool {
        self.flags.contains(ModuleFlags::STDLIB)
    }
}

/// The context in which a declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
pub enum DeclContext {
    Module(ModuleId),
    Nominal(NominalId),
}

/// Where the class was originally declared, classes that were imported from a
/// foreign object model don't always have runtime descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForeignClassKind {
    /// A class that was declared natively, or imported from the legacy object
    /// model.
    #[default]
    Normal,

    /// A reference counted foreign "CF" type.
    CfType,

    /// A class that only exists in the foreign runtime and has no metadata
    /// that could be referenced.
    RuntimeOnly,
}

bitflags! {
    /// Properties of a class declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        /// The class is known to have native runtime metadata.
        const NATIVE_METADATA = 1 << 0;

        /// The class is a foreign reference type.
        const FOREIGN_REFERENCE = 1 << 1;
    }
}

bitflags! {
    /// Properties of a protocol declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProtocolFlags: u8 {
        /// The protocol was declared in the legacy foreign object model.
        const OBJC = 1 << 0;

        /// A marker protocol, which has no runtime representation.
        const MARKER = 1 << 1;

        /// Only classes can conform to the protocol.
        const CLASS_BOUND = 1 << 2;
    }
}

/// The kind of a nominal declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Struct,
    Enum,
    Class { foreign_kind: ForeignClassKind, flags: ClassFlags },
    Protocol { flags: ProtocolFlags },
}

/// A declaration of a named type.
#[derive(Debug, Clone)]
pub struct NominalDecl {
    /// The name of the type.
    pub name: Identifier,

    /// Where the type is declared.
    pub parent: DeclContext,

    /// What kind of type this is.
    pub kind: NominalKind,

    /// If the declaration was moved from another module, the name of the
    /// module it is presented as in debug output.
    pub alternate_module_name: Option<Identifier>,
}

impl NominalDecl {
    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, NominalKind::Protocol { .. })
    }

    /// Protocol flags of the declaration, or empty flags for anything that
    /// isn't a protocol.
    pub fn protocol_flags(&self) -> ProtocolFlags {
        match self.kind {
            NominalKind::Protocol { flags } => flags,
            _ => ProtocolFlags::empty(),
        }
    }

    pub fn is_objc_protocol(&self) -> bool {
        self.protocol_flags().contains(ProtocolFlags::OBJC)
    }

    pub fn is_marker_protocol(&self) -> bool {
        self.protocol_flags().contains(ProtocolFlags::MARKER)
    }

    /// Whether the declaration is a protocol that only classes may conform
    /// to. Legacy object model protocols are always class bound.
    pub fn is_class_bound_protocol(&self) -> bool {
        self.protocol_flags().intersects(ProtocolFlags::CLASS_BOUND | ProtocolFlags::OBJC)
    }

    /// The class flags of the declaration, or empty flags for anything that
    /// isn't a class.
    pub fn class_flags(&self) -> ClassFlags {
        match self.kind {
            NominalKind::Class { flags, .. } => flags,
            _ => ClassFlags::empty(),
        }
    }

    pub fn has_native_metadata(&self) -> bool {
        self.class_flags().contains(ClassFlags::NATIVE_METADATA)
    }

    pub fn is_foreign_reference_type(&self) -> bool {
        self.class_flags().contains(ClassFlags::FOREIGN_REFERENCE)
    }
}

/// An opaque result type declaration, i.e. the hidden type returned by a
/// function or property that is only known by the interface it satisfies.
#[derive(Debug, Clone)]
pub struct OpaqueDecl {
    /// The context of the declaration that names the opaque type.
    pub parent: DeclContext,

    /// The name of the function or property that returns the opaque type.
    pub naming_decl: Identifier,

    /// The generic signature of the opaque type.
    pub generic_signature: Option<GenericSignature>,
}
