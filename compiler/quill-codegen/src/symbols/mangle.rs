//! This module contains the entry points for creating the symbol names of
//! everything that the backend emits. Each kind of symbol has its own entry
//! point, which opens a mangling session, appends the entities that the
//! symbol is made of, and closes it with the operator of the kind.
//!
//! The operators are consumed by the runtime and the linker, so they are
//! fixed:
//!
//! ```text
//! value witness                  <type> w <witness>
//! partial apply forwarder        <function>? TA
//! conformance descriptor         <conformance> Mc | <protocol> MS
//! conformance descriptor record  <conformance> Hc
//! conformance cache              <conformance descriptor> MK
//! extended existential shape     <signatures> <type>? (Xg|Xh|XG|XH) (m|c|o) Mq?
//! ```
//!
//! The debug strings are produced in [super::debug], and the existential
//! shapes in [super::shape].

use quill_mangle::{MANGLING_PREFIX, Mangler};
use quill_types::{
    TyCtx,
    conformance::RootConformance,
    generics::GenericSignature,
    ty::{ExistentialTy, Ty},
};
use quill_utils::log;

use super::{SymbolicMangling, policy::reflection_policy, symbolic::with_symbolic_references, witness::ValueWitness};
use crate::settings::CodeGenSettings;

/// Produces symbol names. A [SymbolMangler] can be re-used for any number of
/// symbols, each entry point starts a fresh session.
pub struct SymbolMangler<'a> {
    pub(super) mangler: Mangler<'a>,
    pub(super) settings: &'a CodeGenSettings,
}

impl<'a> SymbolMangler<'a> {
    pub fn new(tcx: &'a TyCtx, settings: &'a CodeGenSettings) -> Self {
        Self { mangler: Mangler::new(tcx), settings }
    }

    pub fn tcx(&self) -> &'a TyCtx {
        self.mangler.tcx()
    }

    /// Finish the current session.
    pub(super) fn finish(&mut self) -> String {
        let symbol = self.mangler.finalize();
        log::debug!("mangled symbol `{}`", symbol.escape_debug());
        symbol
    }

    /// The symbol of a value witness function of `ty`.
    ///
    /// Panics if the witness is not a function.
    pub fn mangle_value_witness(&mut self, ty: &Ty, witness: ValueWitness) -> String {
        self.mangler.begin_mangling();
        self.mangler.append_type(ty, None);
        self.mangler.append_operator_param("w", witness.mangling());
        self.finish()
    }

    /// The symbol of the forwarder that a partial application of the function
    /// `name` is lowered to. The name may either be the symbol of the function
    /// or a plain identifier, or empty if the function has no name.
    pub fn mangle_partial_apply_forwarder(&mut self, name: &str) -> String {
        if name.is_empty() {
            self.mangler.begin_mangling();
        } else if name.starts_with(MANGLING_PREFIX) {
            self.mangler.begin_mangling_without_prefix();
            self.mangler.push(name);
        } else {
            self.mangler.begin_mangling();
            self.mangler.append_identifier(name);
        }

        self.mangler.append_operator("TA");
        self.finish()
    }

    /// The symbol of the descriptor of a conformance.
    pub fn mangle_protocol_conformance_descriptor(&mut self, conformance: &RootConformance) -> String {
        self.mangler.begin_mangling();
        self.append_conformance_descriptor(conformance);
        self.finish()
    }

    /// The symbol of the record that registers the descriptor of a
    /// conformance with the runtime.
    pub fn mangle_protocol_conformance_descriptor_record(&mut self, conformance: &RootConformance) -> String {
        self.mangler.begin_mangling();
        self.mangler.append_protocol_conformance(conformance);
        self.mangler.append_operator("Hc");
        self.finish()
    }

    /// The symbol of the cache that the runtime instantiates the witness
    /// tables of a conformance into.
    pub fn mangle_protocol_conformance_instantiation_cache(&mut self, conformance: &RootConformance) -> String {
        self.mangler.begin_mangling();
        self.append_conformance_descriptor(conformance);
        self.mangler.append_operator("MK");
        self.finish()
    }

    fn append_conformance_descriptor(&mut self, conformance: &RootConformance) {
        match conformance {
            RootConformance::Normal(normal) => {
                self.mangler.append_normal_conformance(normal);
                self.mangler.append_operator("Mc");
            }
            RootConformance::SelfConformance(protocol) => {
                self.mangler.append_protocol_name(*protocol, true);
                self.mangler.append_operator("MS");
            }
        }
    }

    /// The name of the LLVM struct type that represents `ty`. Type names are
    /// prefixed with a `T` so that they don't need to be quoted in the IR.
    pub fn mangle_type_for_llvm_type_name(&mut self, ty: &Ty) -> String {
        self.mangler.begin_mangling_without_prefix();
        self.mangler.push("T");

        let protocol = match ty {
            Ty::Existential(existential) => self.tcx().canonical_existential(existential).as_single_protocol(),
            Ty::Nominal(nominal) if self.tcx().nominal(nominal.decl).is_protocol() => Some(nominal.decl),
            _ => None,
        };

        if let Some(protocol) = protocol {
            self.mangler.append_protocol_name(protocol, false);
            self.mangler.append_operator("P");
        } else {
            self.mangler.append_type(ty, None);
        }

        self.finish()
    }

    /// The name of the LLVM struct type that represents an existential.
    pub fn mangle_protocol_for_llvm_type_name(&mut self, existential: &ExistentialTy) -> String {
        self.mangler.begin_mangling_without_prefix();

        if existential.is_any() {
            self.mangler.push("Any");
        } else if existential.is_any_object() {
            self.mangler.push("AnyObject");
        } else {
            self.mangler.push("T");

            let mut is_first = true;
            for protocol in self.tcx().canonical_protocols(existential) {
                self.mangler.append_protocol_name(protocol, true);
                self.mangler.append_list_separator(&mut is_first);
            }

            if let Some(superclass) = &existential.superclass {
                // Type infos are shared between all instantiations of the
                // superclass, so the name uses its unbound form.
                match &**superclass {
                    Ty::Nominal(nominal) if superclass.has_generic_params() => {
                        self.mangler.append_type(&Ty::nominal(nominal.decl), None)
                    }
                    superclass => self.mangler.append_type(superclass, None),
                }

                self.mangler.append_operator("Xc");
            } else if existential.any_object {
                self.mangler.append_operator("Xl");
            } else {
                self.mangler.append_operator("p");
            }
        }

        self.finish()
    }

    /// Mangle `ty` for reflection metadata, i.e. the type references that the
    /// runtime decodes. References to types with descriptors become symbolic
    /// references, and only the manglings that the runtime of the target
    /// understands are used.
    pub fn mangle_type_for_reflection(&mut self, signature: Option<&GenericSignature>, ty: &Ty) -> SymbolicMangling {
        let settings = self.settings;

        let mangling = self.mangler.with_policy(
            |policy| reflection_policy(settings, policy),
            |mangler| with_symbolic_references(mangler, |mangler| mangler.append_type(ty, signature)),
        );

        log::debug!(
            "mangled reflection type `{}` with {} symbolic references",
            mangling.string.escape_debug(),
            mangling.symbolic_references.len()
        );

        mangling
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_mangle::SymbolicReferent;
    use quill_target::{Target, version::RuntimeVersion};
    use quill_types::{
        conformance::NormalConformance,
        decl::{ClassFlags, ForeignClassKind, ModuleFlags, ModuleId, ProtocolFlags},
    };

    use super::*;

    struct Fixture {
        tcx: TyCtx,
        stdlib: ModuleId,
        main: ModuleId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tcx = TyCtx::new();
            let stdlib =
                tcx.add_module("Swift", ModuleFlags::STDLIB | ModuleFlags::STANDARD_SUBSTITUTIONS);
            let main = tcx.add_module("main", ModuleFlags::empty());
            Self { tcx, stdlib, main }
        }
    }

    #[test]
    fn test_value_witness() {
        let mut fx = Fixture::new();
        let foo = fx.tcx.add_struct(fx.main, "Foo");
        let array = fx.tcx.add_struct(fx.stdlib, "Array");
        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        assert_eq!(
            mangler.mangle_value_witness(&Ty::nominal(foo), ValueWitness::InitializeWithCopy),
            "$s4main3FooVwcp"
        );
        assert_eq!(
            mangler.mangle_value_witness(&Ty::bound(array, [Ty::nominal(foo)]), ValueWitness::Destroy),
            "$sSay4main3FooVGwxx"
        );
    }

    #[test]
    #[should_panic]
    fn test_value_witness_of_layout_field() {
        let mut fx = Fixture::new();
        let foo = fx.tcx.add_struct(fx.main, "Foo");
        let settings = CodeGenSettings::default();

        SymbolMangler::new(&fx.tcx, &settings).mangle_value_witness(&Ty::nominal(foo), ValueWitness::Stride);
    }

    #[test]
    fn test_partial_apply_forwarder() {
        let fx = Fixture::new();
        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        assert_eq!(mangler.mangle_partial_apply_forwarder(""), "$sTA");
        assert_eq!(mangler.mangle_partial_apply_forwarder("$s4main3fooyyF"), "$s4main3fooyyFTA");
        assert_eq!(mangler.mangle_partial_apply_forwarder("callback"), "$s8callbackTA");
    }

    #[test]
    fn test_conformance_symbols() {
        let mut fx = Fixture::new();
        let foo = fx.tcx.add_struct(fx.main, "Foo");
        let shape = fx.tcx.add_protocol(fx.main, "Shape", ProtocolFlags::empty());
        let error = fx.tcx.add_protocol(fx.stdlib, "Error", ProtocolFlags::empty());

        let normal =
            RootConformance::Normal(NormalConformance { ty: Ty::nominal(foo), protocol: shape, module: fx.main });
        let self_conformance = RootConformance::SelfConformance(error);

        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        assert_eq!(mangler.mangle_protocol_conformance_descriptor(&normal), "$s4main3FooVAA5ShapeAAMc");
        assert_eq!(mangler.mangle_protocol_conformance_descriptor(&self_conformance), "$ss5ErrorMS");
        assert_eq!(mangler.mangle_protocol_conformance_descriptor_record(&normal), "$s4main3FooVAA5ShapeAAHc");
        assert_eq!(
            mangler.mangle_protocol_conformance_instantiation_cache(&normal),
            "$s4main3FooVAA5ShapeAAMcMK"
        );
        assert_eq!(
            mangler.mangle_protocol_conformance_instantiation_cache(&self_conformance),
            "$ss5ErrorMSMK"
        );
    }

    #[test]
    fn test_llvm_type_names() {
        let mut fx = Fixture::new();
        let foo = fx.tcx.add_struct(fx.main, "Foo");
        let hashable = fx.tcx.add_protocol(fx.stdlib, "Hashable", ProtocolFlags::empty());
        let shape = fx.tcx.add_protocol(fx.main, "Shape", ProtocolFlags::empty());

        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        assert_eq!(mangler.mangle_type_for_llvm_type_name(&Ty::nominal(foo)), "T4main3FooV");
        assert_eq!(mangler.mangle_type_for_llvm_type_name(&Ty::protocol_existential(shape)), "T4main5ShapeP");

        // The compact form of protocols isn't used for type names.
        assert_eq!(mangler.mangle_type_for_llvm_type_name(&Ty::protocol_existential(hashable)), "Ts8HashableP");

        // A protocol named as a type is named like its existential.
        assert_eq!(mangler.mangle_type_for_llvm_type_name(&Ty::nominal(hashable)), "Ts8HashableP");
        assert_eq!(mangler.mangle_type_for_llvm_type_name(&Ty::nominal(shape)), "T4main5ShapeP");
        assert_eq!(
            mangler.mangle_type_for_llvm_type_name(&Ty::Existential(ExistentialTy::composition([shape, shape]))),
            "T4main5ShapeP"
        );
    }

    #[test]
    fn test_llvm_protocol_composition_names() {
        let mut fx = Fixture::new();
        let hashable = fx.tcx.add_protocol(fx.stdlib, "Hashable", ProtocolFlags::empty());
        let shape = fx.tcx.add_protocol(fx.main, "Shape", ProtocolFlags::empty());
        let base = fx.tcx.add_class(fx.main, "Base", ForeignClassKind::Normal, ClassFlags::NATIVE_METADATA);

        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        assert_eq!(mangler.mangle_protocol_for_llvm_type_name(&ExistentialTy::any()), "Any");
        assert_eq!(mangler.mangle_protocol_for_llvm_type_name(&ExistentialTy::any_object()), "AnyObject");
        assert_eq!(mangler.mangle_protocol_for_llvm_type_name(&ExistentialTy::protocol(shape)), "T4main5Shape_p");
        assert_eq!(
            mangler.mangle_protocol_for_llvm_type_name(&ExistentialTy::composition([hashable, shape])),
            "TSH_4main5Shapep"
        );
        assert_eq!(
            mangler.mangle_protocol_for_llvm_type_name(&ExistentialTy::composition([shape, hashable, shape])),
            "TSH_4main5Shapep"
        );

        let class_bound = ExistentialTy { any_object: true, ..ExistentialTy::protocol(shape) };
        assert_eq!(mangler.mangle_protocol_for_llvm_type_name(&class_bound), "T4main5Shape_Xl");

        // Generic superclasses are named by their unbound form.
        let generic_superclass = ExistentialTy::protocol(shape).with_superclass(Ty::bound(base, [Ty::param(0, 0)]));
        assert_eq!(
            mangler.mangle_protocol_for_llvm_type_name(&generic_superclass),
            "T4main5Shape_AA4BaseCXc"
        );
    }

    #[test]
    fn test_reflection_mangling() {
        let mut fx = Fixture::new();
        let concurrency = fx.tcx.add_module("_Concurrency", ModuleFlags::STANDARD_SUBSTITUTIONS);
        let task = fx.tcx.add_struct(concurrency, "Task");
        let int = fx.tcx.add_struct(fx.stdlib, "Int");
        let foo = fx.tcx.add_struct(fx.main, "Foo");

        let pair = Ty::Tuple([Ty::nominal(task), Ty::nominal(int), Ty::nominal(foo)].into_iter().collect());

        let settings = CodeGenSettings::for_target(Target::from_triple("arm64-apple-macos12.0").unwrap());
        let mangling = SymbolMangler::new(&fx.tcx, &settings).mangle_type_for_reflection(None, &pair);
        assert_eq!(mangling.string, "ScT_Si\u{1}\0\0\0\0t");
        assert_eq!(mangling.symbolic_references, vec![(SymbolicReferent::Nominal(foo), 6)]);

        // Before the concurrency runtime, `Task` has to be referenced.
        let settings = CodeGenSettings {
            runtime_compatibility_version: Some(RuntimeVersion::new(5, 4)),
            ..CodeGenSettings::default()
        };
        let mangling = SymbolMangler::new(&fx.tcx, &settings).mangle_type_for_reflection(None, &pair);
        assert_eq!(mangling.string, "\u{1}\0\0\0\0_Si\u{1}\0\0\0\0t");
        assert_eq!(
            mangling.symbolic_references,
            vec![(SymbolicReferent::Nominal(task), 0), (SymbolicReferent::Nominal(foo), 8)]
        );

        // Without standard substitutions, even `Int` is referenced.
        let settings = CodeGenSettings {
            disable_standard_substitutions_in_reflection_mangling: true,
            ..CodeGenSettings::default()
        };
        let mangling = SymbolMangler::new(&fx.tcx, &settings).mangle_type_for_reflection(None, &pair);
        assert_eq!(mangling.symbolic_references.len(), 3);
    }

    #[test]
    fn test_reflection_drops_marker_protocols() {
        let mut fx = Fixture::new();
        let sendable = fx.tcx.add_protocol(fx.stdlib, "Sendable", ProtocolFlags::MARKER);
        let shape = fx.tcx.add_protocol(fx.main, "Shape", ProtocolFlags::empty());

        let existential = Ty::Existential(ExistentialTy::composition([shape, sendable]));
        let settings = CodeGenSettings::default();
        let mut mangler = SymbolMangler::new(&fx.tcx, &settings);

        let mangling = mangler.mangle_type_for_reflection(None, &existential);
        assert_eq!(mangling.string, "4main5Shape_p");
        assert!(mangling.symbolic_references.is_empty());

        // Outside of reflection, marker protocols are kept.
        assert!(mangler.mangler.policy().allow_marker_protocols);
        assert_eq!(mangler.mangle_type_for_llvm_type_name(&existential), "Ts8Sendable_4main5Shapep");
    }
}
