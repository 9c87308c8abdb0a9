//! The [Mangler] is a structure that is used to build up the "mangled"
//! symbol of types and declarations.
//!
//! A mangling session starts with [Mangler::begin_mangling] (or
//! [Mangler::begin_mangling_without_prefix] for strings that aren't
//! symbols), appends entities and operators, and ends with
//! [Mangler::finalize]. Within one session, every entity that has been
//! spelled out once is referred to by a substitution afterwards.

use std::fmt::Write;

use quill_types::{
    Identifier, TyCtx,
    conformance::{ConformanceRef, NormalConformance, RootConformance},
    decl::{DeclContext, ModuleId, NominalId, NominalKind, OpaqueId},
    generics::{GenericSignature, Requirement},
    ty::{ExistentialTy, GenericParamTy, NominalTy, OpaqueTy, Ty},
};
use quill_utils::{itertools::Itertools, log, state::LightState};

use crate::{
    MANGLING_PREFIX, SYMBOLIC_REFERENCE_DIRECT, SYMBOLIC_REFERENCE_SIZE,
    policy::{ManglingPolicy, SymbolicReferent},
    standard::standard_substitution_for,
    substitution::{SubstitutionKey, SubstitutionTable, push_index, push_substitution},
};

/// Builds up symbols for the entities of a [TyCtx].
pub struct Mangler<'tcx> {
    tcx: &'tcx TyCtx,

    /// The mangled symbol value, this is built up as the mangling
    /// process occurs.
    buffer: String,

    /// Entities that have been spelled out in the current session.
    substitutions: SubstitutionTable,

    /// The symbolic references that have been emitted in the current session,
    /// alongside the offset of their placeholder within the buffer.
    symbolic_references: Vec<(SymbolicReferent, usize)>,

    /// The policy of the current mangling operation.
    policy: LightState<ManglingPolicy>,
}

impl<'tcx> Mangler<'tcx> {
    pub fn new(tcx: &'tcx TyCtx) -> Self {
        Self::with_initial_policy(tcx, ManglingPolicy::default())
    }

    pub fn with_initial_policy(tcx: &'tcx TyCtx, policy: ManglingPolicy) -> Self {
        Self {
            tcx,
            buffer: String::new(),
            substitutions: SubstitutionTable::default(),
            symbolic_references: Vec::new(),
            policy: LightState::new(policy),
        }
    }

    pub fn tcx(&self) -> &'tcx TyCtx {
        self.tcx
    }

    /// Get the policy that is currently active.
    pub fn policy(&self) -> ManglingPolicy {
        self.policy.get()
    }

    /// Run `f` with the policy computed by `update` from the current one. The
    /// previous policy is restored once `f` returns, so that nested
    /// mangling operations never leak their policy to their callers.
    pub fn with_policy<T>(
        &mut self,
        update: impl FnOnce(ManglingPolicy) -> ManglingPolicy,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.policy.update(update);
        let result = f(self);
        self.policy.set(saved);
        result
    }

    /// Start a new symbol.
    pub fn begin_mangling(&mut self) {
        self.begin_mangling_without_prefix();
        self.buffer.push_str(MANGLING_PREFIX);
    }

    /// Start a new mangled string which isn't a symbol, and so doesn't start
    /// with the mangling prefix.
    pub fn begin_mangling_without_prefix(&mut self) {
        self.buffer.clear();
        self.substitutions.clear();
        self.symbolic_references.clear();
    }

    /// Finish the current session and return the mangled string.
    pub fn finalize(&mut self) -> String {
        let result = std::mem::take(&mut self.buffer);
        self.substitutions.clear();

        log::trace!("finalized mangling {result:?}");
        result
    }

    /// Take the symbolic references that were emitted in the current session.
    pub fn take_symbolic_references(&mut self) -> Vec<(SymbolicReferent, usize)> {
        std::mem::take(&mut self.symbolic_references)
    }

    /// The length of the symbol built so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Push an additional string value into the mangled name, verbatim.
    pub fn push(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Overwrite the symbolic reference placeholder at `offset` with
    /// printable characters.
    ///
    /// Panics if there is no placeholder at `offset`, which includes the case
    /// of the placeholder already having been erased.
    pub fn erase_symbolic_reference(&mut self, offset: usize, fill: char) {
        debug_assert!(fill.is_ascii());

        let range = offset..offset + SYMBOLIC_REFERENCE_SIZE;
        match self.buffer.as_bytes().get(range.clone()) {
            Some([SYMBOLIC_REFERENCE_DIRECT, 0, 0, 0, 0]) => {}
            Some(bytes) => panic!("no symbolic reference at offset {offset}, found {bytes:?}"),
            None => panic!(
                "symbolic reference at offset {offset} is out of bounds of a {} byte buffer",
                self.buffer.len()
            ),
        }

        let replacement = fill.to_string().repeat(SYMBOLIC_REFERENCE_SIZE);
        self.buffer.replace_range(range, &replacement);
    }

    pub fn append_operator(&mut self, op: &str) {
        self.buffer.push_str(op);
    }

    /// Append an operator followed by an index.
    pub fn append_operator_with_index(&mut self, op: &str, index: u64) {
        self.buffer.push_str(op);
        push_index(index, &mut self.buffer);
    }

    /// Append an operator followed by a raw operand, e.g. a value witness
    /// code after `w`.
    pub fn append_operator_param(&mut self, op: &str, param: &str) {
        self.buffer.push_str(op);
        self.buffer.push_str(param);
    }

    pub fn append_index(&mut self, index: u64) {
        push_index(index, &mut self.buffer);
    }

    /// Append the separator that follows the first item of a list.
    pub fn append_list_separator(&mut self, is_first: &mut bool) {
        if *is_first {
            self.buffer.push('_');
            *is_first = false;
        }
    }

    pub fn append_identifier(&mut self, name: &str) {
        let _ = write!(self.buffer, "{}{name}", name.len());
    }

    fn try_substitution(&mut self, key: &SubstitutionKey) -> bool {
        match self.substitutions.get(key) {
            Some(index) => {
                push_substitution(index, &mut self.buffer);
                true
            }
            None => false,
        }
    }

    fn add_substitution(&mut self, key: SubstitutionKey) {
        self.substitutions.add(key);
    }

    /// Emit a symbolic reference to `referent` if the current policy allows
    /// it. Returns whether a reference was emitted.
    fn try_append_symbolic_reference(&mut self, referent: SymbolicReferent) -> bool {
        if !self.policy().should_symbolic_reference(self.tcx, referent) {
            return false;
        }

        let offset = self.buffer.len();
        self.symbolic_references.push((referent, offset));

        self.buffer.push(char::from(SYMBOLIC_REFERENCE_DIRECT));
        self.buffer.push_str("\0\0\0\0");

        log::trace!("symbolic reference to {referent:?} at offset {offset}");
        true
    }

    /// Append a module, optionally spelling it with an alternate name.
    pub fn append_module(&mut self, module: ModuleId, alternate_name: Option<Identifier>) {
        let decl = self.tcx.module(module);

        if alternate_name.is_none() && decl.is_stdlib() {
            self.buffer.push('s');
            return;
        }

        let name = alternate_name.unwrap_or(decl.name);
        let key = SubstitutionKey::Module(name);

        if !self.try_substitution(&key) {
            self.append_identifier(name.as_str());
            self.add_substitution(key);
        }
    }

    pub fn append_context(&mut self, context: DeclContext) {
        match context {
            DeclContext::Module(module) => self.append_module(module, None),
            DeclContext::Nominal(nominal) => self.append_any_generic_type(nominal, None),
        }
    }

    /// Append the context that a referent is declared in.
    pub fn append_context_of(&mut self, referent: SymbolicReferent) {
        let parent = match referent {
            SymbolicReferent::Nominal(nominal) => self.tcx.nominal(nominal).parent,
            SymbolicReferent::Opaque(opaque) => self.tcx.opaque(opaque).parent,
        };

        self.append_context(parent);
    }

    /// Append a nominal declaration as a context. If an alternate module name
    /// is given, the module the declaration lives in is spelled with it.
    pub fn append_nominal_context(&mut self, nominal: NominalId, alternate_module: Option<Identifier>) {
        self.append_any_generic_type(nominal, alternate_module);
    }

    fn append_any_generic_type(&mut self, nominal: NominalId, alternate_module: Option<Identifier>) {
        if let Some(code) = standard_substitution_for(self.tcx, &self.policy(), nominal) {
            self.buffer.push_str(code);
            return;
        }

        let key = SubstitutionKey::Nominal(nominal);
        if self.try_substitution(&key) {
            return;
        }

        if !self.try_append_symbolic_reference(nominal.into()) {
            let decl = self.tcx.nominal(nominal);

            match decl.parent {
                DeclContext::Module(module) => self.append_module(module, alternate_module),
                DeclContext::Nominal(parent) => self.append_any_generic_type(parent, alternate_module),
            }

            self.append_identifier(decl.name.as_str());
            self.append_operator(match decl.kind {
                NominalKind::Struct => "V",
                NominalKind::Enum => "O",
                NominalKind::Class { .. } => "C",
                NominalKind::Protocol { .. } => "P",
            });
        }

        self.add_substitution(key);
    }

    /// Append the name of a protocol. Unlike the protocol as a type, the name
    /// doesn't carry a kind operator, and is never symbolically referenced.
    pub fn append_protocol_name(&mut self, protocol: NominalId, allow_standard_substitution: bool) {
        if allow_standard_substitution {
            if let Some(code) = standard_substitution_for(self.tcx, &self.policy(), protocol) {
                self.buffer.push_str(code);
                return;
            }
        }

        let key = SubstitutionKey::ProtocolName(protocol);
        if self.try_substitution(&key) {
            return;
        }

        let decl = self.tcx.nominal(protocol);
        debug_assert!(decl.is_protocol(), "`{}` is not a protocol", decl.name);

        self.append_context(decl.parent);
        self.append_identifier(decl.name.as_str());
        self.add_substitution(key);
    }

    /// Append the name of an opaque type declaration.
    pub fn append_opaque_decl_name(&mut self, opaque: OpaqueId) {
        let key = SubstitutionKey::Opaque(opaque);
        if self.try_substitution(&key) {
            return;
        }

        if !self.try_append_symbolic_reference(opaque.into()) {
            let decl = self.tcx.opaque(opaque);
            self.append_context(decl.parent);
            self.append_identifier(decl.naming_decl.as_str());
            self.append_operator("QO");
        }

        self.add_substitution(key);
    }

    fn append_generic_param_index(&mut self, param: GenericParamTy) {
        match param {
            GenericParamTy { depth: 0, index: 0 } => self.buffer.push('x'),
            GenericParamTy { depth: 0, index } => self.append_operator_with_index("q", (index - 1).into()),
            GenericParamTy { depth, index } => {
                self.append_operator_with_index("qd", (depth - 1).into());
                self.append_index(index.into());
            }
        }
    }

    fn append_requirement_param_index(&mut self, param: GenericParamTy) {
        match param {
            GenericParamTy { depth: 0, index: 0 } => self.buffer.push('z'),
            GenericParamTy { depth: 0, index } => self.append_index((index - 1).into()),
            GenericParamTy { depth, index } => {
                self.append_operator_with_index("d", (depth - 1).into());
                self.append_index(index.into());
            }
        }
    }

    /// Whether a type is worth adding to the substitution table. Generic
    /// parameters and the empty tuple are as short as a substitution, and
    /// plain nominal types are substituted through their declaration.
    fn is_substitutable(ty: &Ty) -> bool {
        match ty {
            Ty::GenericParam(_) => false,
            Ty::Nominal(NominalTy { args, .. }) | Ty::Tuple(args) => !args.is_empty(),
            Ty::Existential(existential) => !existential.is_any(),
            Ty::DependentMember { .. } | Ty::Metatype(_) | Ty::Opaque(_) => true,
        }
    }

    /// Append a type. The generic context is the signature that any generic
    /// parameters within the type belong to.
    pub fn append_type(&mut self, ty: &Ty, generic_context: Option<&GenericSignature>) {
        let key = Self::is_substitutable(ty).then(|| SubstitutionKey::Ty(self.tcx.canonical_ty(ty)));

        if let Some(key) = &key {
            if self.try_substitution(key) {
                return;
            }
        }

        match ty {
            Ty::Nominal(NominalTy { decl, args }) => {
                self.append_any_generic_type(*decl, None);

                if !args.is_empty() {
                    self.append_operator("y");
                    for arg in args {
                        self.append_type(arg, generic_context);
                    }
                    self.append_operator("G");
                }
            }
            Ty::GenericParam(param) => {
                debug_assert!(
                    generic_context.is_none_or(|sig| sig.params.contains(param)),
                    "generic parameter {param:?} is not part of the generic context"
                );
                self.append_generic_param_index(*param);
            }
            Ty::DependentMember { base, name } => {
                self.append_type(base, generic_context);
                self.append_identifier(name.as_str());
                self.append_operator("Qa");
            }
            Ty::Metatype(instance) => {
                self.append_type(instance, generic_context);
                self.append_operator("m");
            }
            Ty::Existential(existential) => self.append_existential(existential, generic_context),
            Ty::Tuple(elements) if elements.is_empty() => self.append_operator("yt"),
            Ty::Tuple(elements) => {
                let mut is_first = true;
                for element in elements {
                    self.append_type(element, generic_context);
                    self.append_list_separator(&mut is_first);
                }
                self.append_operator("t");
            }
            Ty::Opaque(OpaqueTy { decl, ordinal, args }) => {
                self.append_opaque_decl_name(*decl);
                self.append_operator("y");
                for arg in args {
                    self.append_type(arg, generic_context);
                }
                self.append_operator_with_index("Qo", (*ordinal).into());
            }
        }

        if let Some(key) = key {
            self.add_substitution(key);
        }
    }

    fn append_existential(
        &mut self,
        existential: &ExistentialTy,
        generic_context: Option<&GenericSignature>,
    ) {
        let allow_marker_protocols = self.policy().allow_marker_protocols;
        let mut protocols = self.tcx.canonical_protocols(existential);
        if !allow_marker_protocols {
            protocols.retain(|protocol| !self.tcx.nominal(*protocol).is_marker_protocol());
        }

        if protocols.is_empty() {
            self.append_operator("y");
        }

        let mut is_first = true;
        for protocol in protocols {
            self.append_protocol_name(protocol, true);
            self.append_list_separator(&mut is_first);
        }

        if let Some(superclass) = &existential.superclass {
            self.append_type(superclass, generic_context);
            self.append_operator("Xc");
        } else if existential.any_object {
            self.append_operator("Xl");
        } else {
            self.append_operator("p");
        }
    }

    /// Append a generic signature. If a contextual signature is given, only
    /// the parameters and requirements that `signature` adds to it are
    /// spelled out.
    pub fn append_generic_signature(
        &mut self,
        signature: &GenericSignature,
        context: Option<&GenericSignature>,
    ) {
        let params = signature.params_relative_to(context).collect_vec();

        // A lone `τ_0_0` is implied.
        let is_implicit = context.is_none() && params == [GenericParamTy::new(0, 0)];

        if !is_implicit {
            let first_depth = context.and_then(GenericSignature::max_depth).map_or(0, |depth| depth + 1);
            let counts = params.iter().counts_by(|param| param.depth);

            if let Some(last_depth) = params.iter().map(|param| param.depth).max() {
                for depth in first_depth..=last_depth {
                    match counts.get(&depth).copied().unwrap_or(0) {
                        0 => self.append_operator("z"),
                        count => self.append_index((count - 1) as u64),
                    }
                }
            }
        }

        for requirement in signature.requirements_relative_to(context) {
            self.append_requirement(requirement, signature);
        }

        self.append_operator("l");
    }

    fn append_requirement(&mut self, requirement: &Requirement, signature: &GenericSignature) {
        if let Requirement::Conformance { protocol, .. } = requirement {
            if !self.policy().allow_marker_protocols && self.tcx.nominal(*protocol).is_marker_protocol() {
                return;
            }
        }

        match requirement.subject() {
            Ty::GenericParam(param) => {
                match requirement {
                    Requirement::Conformance { protocol, .. } => {
                        self.append_protocol_name(*protocol, true);
                        self.append_operator("R");
                    }
                    Requirement::Superclass { bound, .. } => {
                        self.append_type(bound, Some(signature));
                        self.append_operator("Rb");
                    }
                    Requirement::SameType { ty, .. } => {
                        self.append_type(ty, Some(signature));
                        self.append_operator("Rs");
                    }
                    Requirement::Layout { .. } => self.append_operator("Rl"),
                }

                self.append_requirement_param_index(*param);

                if matches!(requirement, Requirement::Layout { .. }) {
                    self.append_operator("C");
                }
            }
            subject => {
                self.append_type(subject, Some(signature));

                match requirement {
                    Requirement::Conformance { protocol, .. } => {
                        self.append_protocol_name(*protocol, true);
                        self.append_operator("RQ");
                    }
                    Requirement::Superclass { bound, .. } => {
                        self.append_type(bound, Some(signature));
                        self.append_operator("RB");
                    }
                    Requirement::SameType { ty, .. } => {
                        self.append_type(ty, Some(signature));
                        self.append_operator("RS");
                    }
                    Requirement::Layout { .. } => self.append_operator("RLC"),
                }
            }
        }
    }

    /// Append a root protocol conformance: the conforming type, the protocol
    /// and the module that declares the conformance.
    pub fn append_protocol_conformance(&mut self, conformance: &RootConformance) {
        match conformance {
            RootConformance::Normal(normal) => self.append_normal_conformance(normal),
            RootConformance::SelfConformance(protocol) => {
                let module = self.tcx.module_of(DeclContext::Nominal(*protocol));

                self.append_type(&Ty::protocol_existential(*protocol), None);
                self.append_protocol_name(*protocol, true);
                self.append_module(module, None);
            }
        }
    }

    pub fn append_normal_conformance(&mut self, conformance: &NormalConformance) {
        self.append_type(&conformance.ty, None);
        self.append_protocol_name(conformance.protocol, true);
        self.append_module(conformance.module, None);
    }

    /// Append any conformance of `ty`, which is either a concrete conformance
    /// or an abstract one that is known through the generic signature.
    pub fn append_any_protocol_conformance(
        &mut self,
        signature: Option<&GenericSignature>,
        ty: &Ty,
        conformance: &ConformanceRef,
    ) {
        match conformance {
            ConformanceRef::Concrete(root) => {
                self.append_protocol_conformance(root);
                self.append_operator("HC");
            }
            ConformanceRef::Abstract(protocol) => {
                self.append_type(ty, signature);
                self.append_protocol_name(*protocol, true);
                self.append_operator("HD");
            }
        }
    }

    /// Append the names of the associated types that lead from a generic
    /// parameter to `ty`, e.g. `Element` and `Iterator` for
    /// `τ_0_0.Element.Iterator`.
    pub fn append_associated_type_path(&mut self, ty: &Ty, is_first: &mut bool) {
        match ty {
            Ty::DependentMember { base, name } => {
                self.append_associated_type_path(base, is_first);
                self.append_identifier(name.as_str());
                self.append_list_separator(is_first);
            }
            Ty::GenericParam(_) => {}
            other => panic!("associated type path must be rooted in a generic parameter, got {other:?}"),
        }
    }
}
