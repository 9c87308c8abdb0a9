//! Tests for the symbols that the code generator emits for a small program,
//! from the declarations up to the finished symbol strings.

use pretty_assertions::assert_eq;
use quill_codegen::{
    settings::CodeGenSettings,
    symbols::{MangledTypeRefRole, mangle::SymbolMangler, witness::ValueWitness},
    target::{Target, version::RuntimeVersion},
};
use quill_mangle::{SYMBOLIC_REFERENCE_SIZE, SymbolicReferent};
use quill_types::{
    TyCtx,
    conformance::{NormalConformance, RootConformance},
    decl::{ClassFlags, ForeignClassKind, ModuleFlags, NominalId, ProtocolFlags},
    generics::{GenericSignature, Requirement},
    ty::{ExistentialTy, GenericParamTy, Ty},
};
use quill_utils::{
    log::LevelFilter,
    logging::CompilerLogger,
    stream::CompilerOutputStream,
};

/// The declarations of the program:
///
/// ```text
/// module Swift      { struct Int, struct Array<T>, protocol Hashable }
/// module _Concurrency { struct Task }
/// module main {
///     struct Foo
///     protocol Shape
///     protocol NSCopying (objc)
///     class Node
///     class NSView (objc)
///     extension Foo: Shape
/// }
/// ```
struct Program {
    tcx: TyCtx,
    int: NominalId,
    array: NominalId,
    hashable: NominalId,
    task: NominalId,
    foo: NominalId,
    shape: NominalId,
    ns_copying: NominalId,
    node: NominalId,
    ns_view: NominalId,
    foo_shape: RootConformance,
}

impl Program {
    fn new() -> Self {
        let mut tcx = TyCtx::new();
        let stdlib = tcx.add_module("Swift", ModuleFlags::STDLIB | ModuleFlags::STANDARD_SUBSTITUTIONS);
        let concurrency = tcx.add_module("_Concurrency", ModuleFlags::STANDARD_SUBSTITUTIONS);
        let main = tcx.add_module("main", ModuleFlags::empty());

        let int = tcx.add_struct(stdlib, "Int");
        let array = tcx.add_struct(stdlib, "Array");
        let hashable = tcx.add_protocol(stdlib, "Hashable", ProtocolFlags::empty());
        let task = tcx.add_struct(concurrency, "Task");

        let foo = tcx.add_struct(main, "Foo");
        let shape = tcx.add_protocol(main, "Shape", ProtocolFlags::empty());
        let ns_copying = tcx.add_protocol(main, "NSCopying", ProtocolFlags::OBJC);
        let node = tcx.add_class(main, "Node", ForeignClassKind::Normal, ClassFlags::NATIVE_METADATA);
        let ns_view = tcx.add_class(main, "NSView", ForeignClassKind::Normal, ClassFlags::empty());

        let foo_shape =
            RootConformance::Normal(NormalConformance { ty: Ty::nominal(foo), protocol: shape, module: main });

        Self { tcx, int, array, hashable, task, foo, shape, ns_copying, node, ns_view, foo_shape }
    }
}

fn macos(version: &str) -> CodeGenSettings {
    CodeGenSettings::for_target(Target::from_triple(&format!("arm64-apple-macos{version}")).unwrap())
}

#[test]
fn value_witness_of_concrete_type() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let mut mangler = SymbolMangler::new(&program.tcx, &settings);

    assert_eq!(
        mangler.mangle_value_witness(&Ty::nominal(program.foo), ValueWitness::InitializeWithCopy),
        "$s4main3FooVwcp"
    );
}

#[test]
fn symbols_are_deterministic() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let ty = Ty::bound(program.array, [Ty::nominal(program.foo), Ty::nominal(program.foo)]);

    let mut first = SymbolMangler::new(&program.tcx, &settings);
    let mut second = SymbolMangler::new(&program.tcx, &settings);

    let witness = first.mangle_value_witness(&ty, ValueWitness::AssignWithTake);
    assert_eq!(witness, "$sSay4main3FooVABGwta");
    assert_eq!(second.mangle_value_witness(&ty, ValueWitness::AssignWithTake), witness);

    // Sessions don't share substitutions.
    assert_eq!(first.mangle_value_witness(&ty, ValueWitness::AssignWithTake), witness);
    assert_eq!(first.mangle_type_for_reflection(None, &ty), second.mangle_type_for_reflection(None, &ty));
}

#[test]
fn conformance_symbols() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let mut mangler = SymbolMangler::new(&program.tcx, &settings);

    assert_eq!(
        mangler.mangle_protocol_conformance_descriptor(&program.foo_shape),
        "$s4main3FooVAA5ShapeAAMc"
    );
    assert_eq!(
        mangler.mangle_protocol_conformance_descriptor(&RootConformance::SelfConformance(program.shape)),
        "$s4main5ShapeMS"
    );
    assert_eq!(
        mangler.mangle_protocol_conformance_descriptor_record(&program.foo_shape),
        "$s4main3FooVAA5ShapeAAHc"
    );
    assert_eq!(
        mangler.mangle_protocol_conformance_instantiation_cache(&program.foo_shape),
        "$s4main3FooVAA5ShapeAAMcMK"
    );
}

#[test]
fn symbolic_reference_eligibility() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let mut mangler = SymbolMangler::new(&program.tcx, &settings);

    let referenced = |mangler: &mut SymbolMangler, ty: Ty| {
        mangler.mangle_type_for_reflection(None, &ty).symbolic_references.len() == 1
    };

    // Standard types already have a compact mangling.
    assert!(!referenced(&mut mangler, Ty::nominal(program.int)));
    assert!(referenced(&mut mangler, Ty::nominal(program.foo)));

    assert!(referenced(&mut mangler, Ty::nominal(program.shape)));
    assert!(!referenced(&mut mangler, Ty::nominal(program.ns_copying)));

    assert!(referenced(&mut mangler, Ty::nominal(program.node)));
    assert!(!referenced(&mut mangler, Ty::nominal(program.ns_view)));

    // Protocols within existentials are spelled by name.
    assert!(!referenced(&mut mangler, Ty::protocol_existential(program.shape)));
}

#[test]
fn placeholders_are_patched_into_debug_strings() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let mut mangler = SymbolMangler::new(&program.tcx, &settings);

    let ty = Ty::Tuple([Ty::nominal(program.foo), Ty::nominal(program.node)].into_iter().collect());
    let mangling = mangler.mangle_type_for_reflection(None, &ty);

    assert_eq!(
        mangling.symbolic_references,
        vec![(SymbolicReferent::Nominal(program.foo), 0), (SymbolicReferent::Nominal(program.node), 6)]
    );

    for (_, range) in mangling.placeholders() {
        assert_eq!(range.len(), SYMBOLIC_REFERENCE_SIZE);
        assert_eq!(&mangling.string.as_bytes()[range], b"\x01\0\0\0\0");
    }

    let debug = mangler.mangle_symbol_name_for_symbolic_mangling(&mangling, MangledTypeRefRole::Reflection);
    assert_eq!(debug, "symbolic ___________t 4main3FooV AA4NodeC");
    assert!(!debug.contains('\u{1}'));
    assert!(!debug.contains('\0'));
}

#[test]
fn concurrency_substitutions_follow_the_deployment_target() {
    let program = Program::new();
    let pair = Ty::Tuple([Ty::nominal(program.task), Ty::nominal(program.int)].into_iter().collect());

    let modern = macos("13.0");
    let mangling = SymbolMangler::new(&program.tcx, &modern).mangle_type_for_reflection(None, &pair);
    assert_eq!(mangling.string, "ScT_Sit");

    // `Task` loses its compact form, `Int` keeps it.
    let old = macos("11.0");
    let mangling = SymbolMangler::new(&program.tcx, &old).mangle_type_for_reflection(None, &pair);
    assert_eq!(mangling.string, "\u{1}\0\0\0\0_Sit");
    assert_eq!(mangling.symbolic_references, vec![(SymbolicReferent::Nominal(program.task), 0)]);

    // An explicit runtime version overrides the deployment target.
    let overridden = CodeGenSettings { runtime_compatibility_version: Some(RuntimeVersion::new(5, 5)), ..old.clone() };
    let mangling = SymbolMangler::new(&program.tcx, &overridden).mangle_type_for_reflection(None, &pair);
    assert_eq!(mangling.string, "ScT_Sit");

    // Symbols outside of reflection are not restricted.
    let mut mangler = SymbolMangler::new(&program.tcx, &old);
    assert_eq!(mangler.mangle_value_witness(&pair, ValueWitness::Destroy), "$sScT_Sitwxx");
}

#[test]
fn extended_existential_shapes() {
    let program = Program::new();
    let settings = CodeGenSettings::default();
    let mut mangler = SymbolMangler::new(&program.tcx, &settings);

    let shape = ExistentialTy::protocol(program.shape);
    let hashable_shape = ExistentialTy::composition([program.hashable, program.shape]);
    let generalization = GenericSignature::new(
        [GenericParamTy::new(0, 0)],
        [Requirement::Conformance { subject: Ty::param(0, 0), protocol: program.hashable }],
    );

    assert_eq!(mangler.mangle_extended_existential_type_shape(true, None, &shape, 0), "$s4main5ShapeRzlXgo");
    assert_eq!(
        mangler.mangle_extended_existential_type_shape(false, None, &hashable_shape, 0),
        "$sSHRz4main5ShapeRzlXgoMq"
    );
    assert_eq!(
        mangler.mangle_extended_existential_type_shape_for_uniquing(Some(&generalization), &shape, 1),
        "_4main5ShapeRd__lSHRzlqd__mXHm"
    );

    // The order a composition is written in doesn't change its shape.
    let shape_hashable = ExistentialTy::composition([program.shape, program.hashable]);
    assert_eq!(
        mangler.mangle_extended_existential_type_shape_for_uniquing(None, &shape_hashable, 0),
        mangler.mangle_extended_existential_type_shape_for_uniquing(None, &hashable_shape, 0),
    );
    assert_eq!(
        mangler.mangle_extended_existential_type_shape_for_uniquing(
            None,
            &ExistentialTy::composition([program.shape, program.shape]),
            0
        ),
        "4main5ShapeRzlXgo"
    );

    let class_bound = ExistentialTy::protocol(program.shape).with_superclass(Ty::nominal(program.node));
    assert!(mangler.mangle_extended_existential_type_shape(true, None, &class_bound, 0).ends_with("Xgc"));
    assert!(mangler.mangle_extended_existential_type_shape(true, None, &class_bound, 3).ends_with("Xhm"));
}

#[test]
fn produced_symbols_are_logged() {
    static LOGGER: CompilerLogger = CompilerLogger::new(LevelFilter::Debug);

    let output = CompilerOutputStream::owned();
    let _ = LOGGER.output_stream.set(output.clone());
    LOGGER.install().unwrap();

    let program = Program::new();
    let settings = CodeGenSettings::default();
    SymbolMangler::new(&program.tcx, &settings).mangle_partial_apply_forwarder("callback");

    let logged = output.captured().unwrap();
    assert!(logged.contains("mangled symbol `$s8callbackTA`"));
}
