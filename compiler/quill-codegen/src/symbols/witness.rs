//! The value witnesses of a type.

use derive_more::Display;

/// An entry of a value witness table. Most entries are functions that
/// operate on values of the type, the remaining ones describe the layout of
/// the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValueWitness {
    InitializeBufferWithCopyOfBuffer,
    Destroy,
    InitializeWithCopy,
    AssignWithCopy,
    InitializeWithTake,
    AssignWithTake,
    GetEnumTagSinglePayload,
    StoreEnumTagSinglePayload,

    Size,
    Flags,
    ExtraInhabitantCount,
    Stride,

    GetEnumTag,
    DestructiveProjectEnumData,
    DestructiveInjectEnumTag,
}

impl ValueWitness {
    /// Whether the witness is a function, rather than a layout field.
    pub fn is_function(&self) -> bool {
        !matches!(self, Self::Size | Self::Flags | Self::ExtraInhabitantCount | Self::Stride)
    }

    /// The code that follows the `w` operator in the symbol of the witness.
    ///
    /// Panics if the witness isn't a function, layout fields don't have
    /// symbols.
    pub fn mangling(&self) -> &'static str {
        match self {
            Self::InitializeBufferWithCopyOfBuffer => "CP",
            Self::Destroy => "xx",
            Self::InitializeWithCopy => "cp",
            Self::AssignWithCopy => "ca",
            Self::InitializeWithTake => "tk",
            Self::AssignWithTake => "ta",
            Self::GetEnumTagSinglePayload => "et",
            Self::StoreEnumTagSinglePayload => "st",
            Self::GetEnumTag => "ug",
            Self::DestructiveProjectEnumData => "up",
            Self::DestructiveInjectEnumTag => "ui",
            Self::Size | Self::Flags | Self::ExtraInhabitantCount | Self::Stride => {
                unreachable!("`{self}` is not a function witness")
            }
        }
    }
}
