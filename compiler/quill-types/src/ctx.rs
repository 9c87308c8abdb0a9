//! The [TyCtx] owns every declaration that types can refer to, and answers
//! the questions about them that symbol mangling needs.

use std::cmp::Ordering;

use index_vec::IndexVec;
use quill_utils::{log, smallvec::SmallVec};
use thin_vec::ThinVec;

use crate::{
    decl::{
        ClassFlags, DeclContext, ForeignClassKind, ModuleDecl, ModuleFlags, ModuleId, NominalDecl,
        NominalId, NominalKind, OpaqueDecl, OpaqueId, ProtocolFlags,
    },
    generics::{GenericSignature, Requirement},
    identifier::Identifier,
    ty::{ExistentialTy, GenericParamTy, NominalTy, OpaqueTy, Ty},
};

/// Storage for all declarations.
#[derive(Debug, Default)]
pub struct TyCtx {
    modules: IndexVec<ModuleId, ModuleDecl>,
    nominals: IndexVec<NominalId, NominalDecl>,
    opaques: IndexVec<OpaqueId, OpaqueDecl>,
}

impl TyCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&self, id: ModuleId) -> &ModuleDecl {
        &self.modules[id]
    }

    pub fn nominal(&self, id: NominalId) -> &NominalDecl {
        &self.nominals[id]
    }

    pub fn opaque(&self, id: OpaqueId) -> &OpaqueDecl {
        &self.opaques[id]
    }

    pub fn add_module(&mut self, name: impl Into<Identifier>, flags: ModuleFlags) -> ModuleId {
        self.modules.push(ModuleDecl { name: name.into(), flags })
    }

    pub fn add_nominal(&mut self, decl: NominalDecl) -> NominalId {
        self.nominals.push(decl)
    }

    pub fn add_opaque(&mut self, decl: OpaqueDecl) -> OpaqueId {
        self.opaques.push(decl)
    }

    fn add_nominal_of_kind(
        &mut self,
        parent: impl Into<DeclContext>,
        name: impl Into<Identifier>,
        kind: NominalKind,
    ) -> NominalId {
        self.add_nominal(NominalDecl {
            name: name.into(),
            parent: parent.into(),
            kind,
            alternate_module_name: None,
        })
    }

    pub fn add_struct(
        &mut self,
        parent: impl Into<DeclContext>,
        name: impl Into<Identifier>,
    ) -> NominalId {
        self.add_nominal_of_kind(parent, name, NominalKind::Struct)
    }

    pub fn add_enum(&mut self, parent: impl Into<DeclContext>, name: impl Into<Identifier>) -> NominalId {
        self.add_nominal_of_kind(parent, name, NominalKind::Enum)
    }

    pub fn add_class(
        &mut self,
        parent: impl Into<DeclContext>,
        name: impl Into<Identifier>,
        foreign_kind: ForeignClassKind,
        flags: ClassFlags,
    ) -> NominalId {
        self.add_nominal_of_kind(parent, name, NominalKind::Class { foreign_kind, flags })
    }

    pub fn add_protocol(
        &mut self,
        parent: impl Into<DeclContext>,
        name: impl Into<Identifier>,
        flags: ProtocolFlags,
    ) -> NominalId {
        self.add_nominal_of_kind(parent, name, NominalKind::Protocol { flags })
    }

    /// Get the module that the given context is (transitively) declared in.
    pub fn module_of(&self, context: DeclContext) -> ModuleId {
        let mut context = context;

        loop {
            match context {
                DeclContext::Module(module) => return module,
                DeclContext::Nominal(nominal) => context = self.nominal(nominal).parent,
            }
        }
    }

    /// The fully qualified, dot separated, name of a nominal declaration. This
    /// is only used for diagnostics and logging.
    pub fn qualified_name(&self, id: NominalId) -> String {
        let decl = self.nominal(id);

        let parent = match decl.parent {
            DeclContext::Module(module) => self.module(module).name.to_string(),
            DeclContext::Nominal(parent) => self.qualified_name(parent),
        };

        format!("{parent}.{}", decl.name)
    }

    /// Order two protocols by the name of the module they are declared in,
    /// and then by their own name.
    pub fn compare_protocols(&self, a: NominalId, b: NominalId) -> Ordering {
        let module_name = |id| self.module(self.module_of(DeclContext::Nominal(id))).name.as_str();

        module_name(a)
            .cmp(module_name(b))
            .then_with(|| self.nominal(a).name.as_str().cmp(self.nominal(b).name.as_str()))
            .then_with(|| a.cmp(&b))
    }

    /// The protocols of an existential in canonical order, each listed once.
    /// Compositions that only differ in how their protocols were written
    /// down have the same canonical protocols.
    pub fn canonical_protocols(&self, existential: &ExistentialTy) -> SmallVec<[NominalId; 4]> {
        let mut protocols: SmallVec<[NominalId; 4]> = existential.protocols.iter().copied().collect();
        protocols.sort_by(|a, b| self.compare_protocols(*a, *b));
        protocols.dedup();
        protocols
    }

    /// The existential with its protocols in canonical order.
    pub fn canonical_existential(&self, existential: &ExistentialTy) -> ExistentialTy {
        ExistentialTy {
            protocols: self.canonical_protocols(existential).into_iter().collect(),
            superclass: existential.superclass.as_deref().map(|ty| Box::new(self.canonical_ty(ty))),
            any_object: existential.any_object,
        }
    }

    /// The type with every existential within it in canonical order, so that
    /// two spellings of the same type compare equal.
    pub fn canonical_ty(&self, ty: &Ty) -> Ty {
        let canonical_args =
            |args: &ThinVec<Ty>| args.iter().map(|arg| self.canonical_ty(arg)).collect::<ThinVec<_>>();

        match ty {
            Ty::Nominal(NominalTy { decl, args }) => {
                Ty::Nominal(NominalTy { decl: *decl, args: canonical_args(args) })
            }
            Ty::GenericParam(_) => ty.clone(),
            Ty::DependentMember { base, name } => Ty::member(self.canonical_ty(base), *name),
            Ty::Metatype(instance) => Ty::metatype(self.canonical_ty(instance)),
            Ty::Existential(existential) => Ty::Existential(self.canonical_existential(existential)),
            Ty::Tuple(elements) => Ty::Tuple(canonical_args(elements)),
            Ty::Opaque(OpaqueTy { decl, ordinal, args }) => {
                Ty::Opaque(OpaqueTy { decl: *decl, ordinal: *ordinal, args: canonical_args(args) })
            }
        }
    }

    /// Whether values of the existential must be class instances.
    pub fn requires_class(&self, existential: &ExistentialTy) -> bool {
        existential.any_object
            || existential.superclass.is_some()
            || existential
                .protocols
                .iter()
                .any(|protocol| self.nominal(*protocol).is_class_bound_protocol())
    }

    /// Compute the signature of an existential when it is "opened": a single
    /// fresh generic parameter constrained by everything the existential
    /// requires, added on top of the `generalization` signature (if any).
    ///
    /// The fresh parameter is at depth zero when there is no generalization
    /// signature, otherwise one level deeper than its deepest parameter.
    pub fn opened_existential_signature(
        &self,
        existential: &ExistentialTy,
        generalization: Option<&GenericSignature>,
    ) -> GenericSignature {
        let depth = generalization.and_then(GenericSignature::max_depth).map_or(0, |depth| depth + 1);
        let param = GenericParamTy::new(depth, 0);
        let subject = Ty::GenericParam(param);

        let mut requirements: Vec<_> = self
            .canonical_protocols(existential)
            .into_iter()
            .map(|protocol| Requirement::Conformance { subject: subject.clone(), protocol })
            .collect();

        if let Some(superclass) = &existential.superclass {
            requirements
                .push(Requirement::Superclass { subject: subject.clone(), bound: (**superclass).clone() });
        } else if existential.any_object {
            requirements.push(Requirement::Layout { subject: subject.clone() });
        }

        let (params, inherited) = match generalization {
            Some(signature) => (signature.params.to_vec(), signature.requirements.to_vec()),
            None => (vec![], vec![]),
        };

        log::trace!("opened existential at depth {depth} with {} requirements", requirements.len());

        GenericSignature::new(
            params.into_iter().chain([param]),
            inherited.into_iter().chain(requirements),
        )
    }
}
