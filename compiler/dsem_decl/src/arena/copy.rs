//! Copying declarations for template instantiation.

use super::DeclArena;
use crate::decl::{AliasDecl, DeclKind, Declaration, FuncDecl, OverDecl, TupleElement, VarDecl};
use crate::ids::DeclId;
use crate::infer::AttrSet;
use crate::stack::ensure_sufficient_stack;

impl DeclArena {
    /// Copy `id` into a fresh, independent declaration.
    ///
    /// Parameters, initializers, tuple elements and effect summaries are
    /// deep-copied; names, spans and collaborator handles are shared. All
    /// analysis state (overload links, closure sets, vtable slot, inferred
    /// attributes) starts over, and a variable gets a new sequence number.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn syntax_copy(&mut self, id: DeclId) -> DeclId {
        let source = self.get(id);
        let kind = match &source.kind {
            DeclKind::Var(var) => DeclKind::Var(VarDecl {
                role: var.role,
                init: var.init.clone(),
                alignment: var.alignment,
                ..VarDecl::default()
            }),
            DeclKind::Func(func) => DeclKind::Func(Box::new(FuncDecl {
                kind: func.kind,
                params: func.params.clone(),
                variadic: func.variadic,
                body: func.body.clone(),
                frequire: func.frequire,
                fensure: func.fensure,
                return_label: func.return_label,
                flags: func.flags,
                ..FuncDecl::default()
            })),
            DeclKind::Alias(alias) => DeclKind::Alias(AliasDecl {
                overnext: None,
                ..alias.clone()
            }),
            DeclKind::Over(over) => DeclKind::Over(OverDecl {
                overnext: None,
                ..over.clone()
            }),
            DeclKind::Tuple(tuple) => DeclKind::Tuple(tuple.clone()),
        };
        let inferred = source.as_func().map_or(AttrSet::empty(), |func| func.inferred);
        let copy = Declaration {
            name: source.name,
            span: source.span,
            ty: source.original_ty.or(source.ty),
            original_ty: source.original_ty,
            stc: source.stc - inferred.stc(),
            visibility: source.visibility,
            linkage: source.linkage,
            inuse: 0,
            mangle_override: source.mangle_override,
            parent: source.parent,
            kind,
        };
        let new_id = self.alloc(copy);

        // Tuple members are declarations of their own and get copied too.
        let members: Vec<(usize, DeclId)> = self
            .get(new_id)
            .as_tuple()
            .map(|tuple| {
                tuple
                    .elements()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, elem)| match elem {
                        TupleElement::Decl(member) => Some((i, *member)),
                        TupleElement::Type(_) | TupleElement::Expr(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        for (index, member) in members {
            let member_copy = ensure_sufficient_stack(|| self.syntax_copy(member));
            if let DeclKind::Tuple(tuple) = &mut self.get_mut(new_id).kind {
                tuple.elements_mut()[index] = TupleElement::Decl(member_copy);
            }
        }
        new_id
    }
}
