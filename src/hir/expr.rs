//! Expression typing and body resolution.
//!
//! [`ExprResolver`] walks routine bodies, initializers and unit blocks after
//! every scope and declaration exists, binding each name reference and
//! computing expression types on the way. It only reads the
//! [`SymbolTable`]; what it learns is collected into a [`UnitResolution`]
//! that the builder merges back, which is what allows units to be resolved
//! in parallel.
//!
//! A name that cannot be found stays unbound and yields the unknown type,
//! which every later query absorbs without further diagnostics.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use super::decl::{DeclKind, MethodKind, Section};
use super::diagnostics::DiagnosticCollector;
use super::enumerable;
use super::ids::{DeclId, Location, ScopeId, TypeId, UnitId};
use super::operator::{Invocable, Operator, OperatorInvocableCollector};
use super::overload::{Candidate, OverloadResolver, Resolution};
use super::search::{NameOccurrence, Qualifier, Search};
use super::table::SymbolTable;
use super::ty::{IntrinsicType, StringKind, TypeKind, TypeTable};
use crate::ast::{
    BinaryOperator, Block, DeclItem, Expr, ForVar, Ident, Literal, MemberKind, RoutineDecl, SourceUnit, Stmt,
    TypeDecl, TypeExpr, UnaryOperator,
};
use crate::base::{LineCol, Name};

/// What an expression denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    /// A value of a type.
    Typed(TypeId),
    /// A type name (`TFoo` in `TFoo.Create`).
    Type(TypeId),
    /// A unit name (`SysUtils` in `SysUtils.Format`).
    Unit(UnitId),
}

impl Value {
    pub fn ty(self, types: &TypeTable) -> TypeId {
        match self {
            Value::Typed(ty) | Value::Type(ty) => ty,
            Value::Unit(_) => types.unknown(),
        }
    }
}

/// Everything learnt while resolving one unit's bodies.
#[derive(Debug)]
pub(crate) struct UnitResolution {
    pub(crate) unit: UnitId,
    pub(crate) references: Vec<(Location, DeclId)>,
    pub(crate) dependencies: Vec<(UnitId, Section)>,
    /// Types of variables and constants declared without one.
    pub(crate) inferred: Vec<(DeclId, TypeId)>,
    pub(crate) diagnostics: DiagnosticCollector,
}

/// Resolves bodies and expressions of one unit against a finished table.
pub struct ExprResolver<'a> {
    table: &'a SymbolTable,
    unit: UnitId,
    section: Section,
    inferred: FxHashMap<DeclId, TypeId>,
    out: UnitResolution,
}

impl<'a> ExprResolver<'a> {
    pub fn new(table: &'a SymbolTable, unit: UnitId) -> Self {
        Self {
            table,
            unit,
            section: Section::Implementation,
            inferred: FxHashMap::default(),
            out: UnitResolution {
                unit,
                references: Vec::new(),
                dependencies: Vec::new(),
                inferred: Vec::new(),
                diagnostics: DiagnosticCollector::new(),
            },
        }
    }

    /// The section references are attributed to (for dependencies).
    pub fn with_section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }

    /// Bindings made so far, in resolution order.
    pub fn references(&self) -> &[(Location, DeclId)] {
        &self.out.references
    }

    pub(crate) fn finish(self) -> UnitResolution {
        self.out
    }

    fn location(&self, pos: LineCol) -> Location {
        Location::new(self.unit, pos)
    }

    fn types(&self) -> &'a TypeTable {
        self.table.types()
    }

    fn unknown(&self) -> Value {
        Value::Typed(self.types().unknown())
    }

    // ========================================================================
    // UNITS AND DECLARATIONS
    // ========================================================================

    /// Resolve every body and initializer of `source`.
    pub(crate) fn resolve_unit(mut self, source: &SourceUnit) -> UnitResolution {
        let scope = self.table.unit(self.unit).scope;

        self.section = Section::Interface;
        self.resolve_items(&source.interface.decls, scope);

        self.section = Section::Implementation;
        self.resolve_items(&source.implementation.decls, scope);
        for block in [&source.initialization, &source.finalization].into_iter().flatten() {
            self.resolve_block(block, scope);
        }

        tracing::trace!(
            unit = %self.table.unit(self.unit).name,
            references = self.out.references.len(),
            "resolved unit bodies"
        );
        self.finish()
    }

    fn resolve_items(&mut self, items: &[DeclItem], scope: ScopeId) {
        for item in items {
            match item {
                DeclItem::Types(decls) => {
                    for decl in decls {
                        self.resolve_type_decl(decl);
                    }
                }
                DeclItem::Vars(vars) => {
                    for var in vars {
                        if let Some(value) = &var.value {
                            let ty = self.type_of(value, scope);
                            for name in &var.names {
                                self.infer(name.pos, ty);
                            }
                        }
                    }
                }
                DeclItem::Consts(consts) => {
                    for constant in consts {
                        let ty = self.type_of(&constant.value, scope);
                        self.infer(constant.name.pos, ty);
                    }
                }
                DeclItem::Routine(routine) => self.resolve_routine(routine, scope),
            }
        }
    }

    /// Constant values and parameter defaults inside a struct body.
    fn resolve_type_decl(&mut self, decl: &TypeDecl) {
        let TypeExpr::Struct(body) = &decl.ty else {
            return;
        };
        let Some(scope) = self
            .table
            .declared_at(self.location(decl.name.pos))
            .and_then(|id| self.table.declaration(id).declared_type())
            .and_then(|ty| self.types().type_scope(ty))
        else {
            return;
        };
        for member in &body.members {
            match &member.kind {
                MemberKind::Consts(consts) => {
                    for constant in consts {
                        let ty = self.type_of(&constant.value, scope);
                        self.infer(constant.name.pos, ty);
                    }
                }
                MemberKind::Types(nested) => {
                    for decl in nested {
                        self.resolve_type_decl(decl);
                    }
                }
                MemberKind::Method(heading) => {
                    for default in heading.params.iter().filter_map(|group| group.default.as_ref()) {
                        self.type_of(default, scope);
                    }
                }
                MemberKind::Fields(_) | MemberKind::Property(_) => {}
            }
        }
    }

    fn resolve_routine(&mut self, routine: &RoutineDecl, scope: ScopeId) {
        for default in routine.heading.params.iter().filter_map(|group| group.default.as_ref()) {
            self.type_of(default, scope);
        }
        let Some(body) = &routine.body else {
            return;
        };
        let Some(method_scope) = self.table.node_scope(self.location(routine.heading.name.last().pos)) else {
            return;
        };
        self.resolve_items(&body.decls, method_scope);
        self.resolve_block(&body.block, method_scope);
    }

    /// Record the type of an untyped variable or constant declared at `pos`.
    fn infer(&mut self, pos: LineCol, ty: TypeId) {
        let Some(decl) = self.table.declared_at(self.location(pos)) else {
            return;
        };
        let types = self.types();
        if types.is_unknown(ty) || !types.is_unknown(self.decl_type(decl)) {
            return;
        }
        if matches!(self.table.declaration(decl).kind, DeclKind::Variable { .. }) {
            self.inferred.insert(decl, ty);
            self.out.inferred.push((decl, ty));
        }
    }

    fn decl_type(&self, decl: DeclId) -> TypeId {
        self.inferred
            .get(&decl)
            .copied()
            .or_else(|| self.table.declaration(decl).value_type())
            .unwrap_or_else(|| self.types().unknown())
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    pub fn resolve_block(&mut self, block: &Block, scope: ScopeId) {
        let scope = self.table.node_scope(self.location(block.begin)).unwrap_or(scope);
        for stmt in &block.stmts {
            self.resolve_stmt(stmt, scope);
        }
    }

    pub fn resolve_stmt(&mut self, stmt: &Stmt, scope: ScopeId) {
        match stmt {
            Stmt::Compound(block) => self.resolve_block(block, scope),
            Stmt::Assign { target, value } => {
                self.type_of(target, scope);
                self.type_of(value, scope);
            }
            Stmt::Call(expr) => {
                self.type_of(expr, scope);
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.type_of(cond, scope);
                self.resolve_stmt(then_branch, scope);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch, scope);
                }
            }
            Stmt::While { cond, body } => {
                self.type_of(cond, scope);
                self.resolve_stmt(body, scope);
            }
            Stmt::Repeat { body, cond } => {
                for stmt in body {
                    self.resolve_stmt(stmt, scope);
                }
                self.type_of(cond, scope);
            }
            Stmt::ForTo { var, start, end, body, .. } => {
                let start = self.type_of(start, scope);
                self.type_of(end, scope);
                let body_scope = self.loop_variable(var, scope, start);
                self.resolve_stmt(body, body_scope);
            }
            Stmt::ForIn { var, collection, body } => {
                let collection = self.type_of(collection, scope);
                let element = self.enumerated_type(collection);
                let body_scope = self.loop_variable(var, scope, element);
                self.resolve_stmt(body, body_scope);
            }
            Stmt::Var { names, ty, value } => {
                if let Some(value) = value {
                    let value = self.type_of(value, scope);
                    if ty.is_none() {
                        for name in names {
                            self.infer(name.pos, value);
                        }
                    }
                }
            }
            Stmt::Raise(expr) => {
                if let Some(expr) = expr {
                    self.type_of(expr, scope);
                }
            }
        }
    }

    /// Bind or type a loop variable and return the scope of the loop body.
    fn loop_variable(&mut self, var: &ForVar, scope: ScopeId, ty: TypeId) -> ScopeId {
        match var {
            ForVar::Reference(ident) => {
                self.resolve_name(ident, scope, None);
                scope
            }
            ForVar::Declaration { name, ty: declared } => {
                if declared.is_none() {
                    self.infer(name.pos, ty);
                }
                self.table.node_scope(self.location(name.pos)).unwrap_or(scope)
            }
        }
    }

    /// Element type of a `for ... in` collection.
    fn enumerated_type(&mut self, collection: TypeId) -> TypeId {
        let types = self.types();
        if let Some(element) = types.element_type(collection) {
            return element;
        }
        if let TypeKind::String(kind) = types.kind(collection) {
            return self.string_element(*kind);
        }

        let get_enumerator = enumerable::get_enumerator(self.table, collection)
            .or_else(|| self.find_method(collection, "GetEnumerator"));
        let Some(get_enumerator) = get_enumerator else {
            return types.unknown();
        };
        self.depend_on(get_enumerator);
        let enumerator = types.substitute(self.decl_type(get_enumerator), collection);

        let current = enumerable::current_property(self.table, enumerator).or_else(|| {
            self.table
                .find_member(enumerator, "Current")
                .into_iter()
                .find(|&id| self.table.declaration(id).property().is_some())
        });
        match current {
            Some(current) => {
                self.depend_on(current);
                types.substitute(self.decl_type(current), enumerator)
            }
            None => types.unknown(),
        }
    }

    fn find_method(&self, ty: TypeId, name: &str) -> Option<DeclId> {
        self.table.find_member(ty, name).into_iter().find(|&id| {
            self.table
                .declaration(id)
                .method()
                .is_some_and(|method| method.required_params() == 0)
        })
    }

    fn string_element(&self, kind: StringKind) -> TypeId {
        let element = match kind {
            StringKind::Ansi | StringKind::Short => IntrinsicType::AnsiChar,
            StringKind::Unicode | StringKind::Wide => IntrinsicType::Char,
        };
        self.types().intrinsic(element)
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// The type of `expr` evaluated in `scope`.
    pub fn type_of(&mut self, expr: &Expr, scope: ScopeId) -> TypeId {
        self.value_of(expr, scope).ty(self.types())
    }

    /// What `expr` denotes in `scope`, binding every name on the way.
    pub fn value_of(&mut self, expr: &Expr, scope: ScopeId) -> Value {
        match expr {
            Expr::Literal(literal, _) => Value::Typed(self.literal_type(literal)),
            Expr::Name(ident) => self.resolve_name(ident, scope, None),
            Expr::Member { base, member } => self.resolve_member(expr, base, member, scope, None),
            Expr::Call { callee, args } => self.resolve_call(callee, args, scope),
            Expr::Index { base, indices } => {
                let base = self.type_of(base, scope);
                for index in indices {
                    self.type_of(index, scope);
                }
                Value::Typed(self.indexed_type(base, indices.len()))
            }
            Expr::Binary { op, left, right } => self.resolve_binary(*op, left, right, scope),
            Expr::Unary { op, operand } => {
                let operand = self.type_of(operand, scope);
                if *op == UnaryOperator::Address {
                    return Value::Typed(self.types().intrinsic(IntrinsicType::Pointer));
                }
                Value::Typed(self.operator_result(Operator::Unary(*op), &[operand]))
            }
            Expr::Paren(inner) => self.value_of(inner, scope),
            Expr::Range { low, high } => {
                let low = self.type_of(low, scope);
                let high = self.type_of(high, scope);
                Value::Typed(self.types().wider(low, high))
            }
            Expr::Set(elements, _) => {
                for element in elements {
                    self.type_of(element, scope);
                }
                Value::Typed(self.types().empty_set())
            }
            Expr::Inherited { pos, name } => self.resolve_inherited(*pos, name.as_ref(), scope, None),
        }
    }

    fn literal_type(&self, literal: &Literal) -> TypeId {
        let types = self.types();
        match literal {
            Literal::Integer(value) => {
                if i32::try_from(*value).is_ok() {
                    types.intrinsic(IntrinsicType::Integer)
                } else {
                    types.intrinsic(IntrinsicType::Int64)
                }
            }
            Literal::Real(_) => types.intrinsic(IntrinsicType::Extended),
            Literal::String(text) => {
                if text.chars().count() == 1 {
                    types.intrinsic(IntrinsicType::Char)
                } else {
                    types.intrinsic(IntrinsicType::UnicodeString)
                }
            }
            Literal::Nil => types.nil(),
        }
    }

    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    /// Resolve a bare identifier. `args` are the argument types when the
    /// name is being called.
    fn resolve_name(&mut self, ident: &Ident, scope: ScopeId, args: Option<&[TypeId]>) -> Value {
        let occurrence = NameOccurrence::new(ident.name.clone()).at(self.location(ident.pos));
        let found = Search::new(self.table).execute(&occurrence, scope);
        self.bind_found(ident, &occurrence, scope, &found, args, None)
    }

    /// Bind `ident` to what a search found. Methods go through overload
    /// resolution; `owner` is the type a member was looked up in.
    fn bind_found(
        &mut self,
        ident: &Ident,
        occurrence: &NameOccurrence,
        scope: ScopeId,
        found: &[DeclId],
        args: Option<&[TypeId]>,
        owner: Option<TypeId>,
    ) -> Value {
        let Some(&first) = found.first() else {
            let location = self.location(ident.pos);
            self.out.diagnostics.unresolved_name(location, ident.name.as_str());
            return self.unknown();
        };
        if self.table.declaration(first).is_method() {
            let candidates = Search::new(self.table).search_overloads(occurrence, scope);
            return self.call_method(ident, &candidates, args.unwrap_or(&[]), owner);
        }
        self.bind(ident.pos, first);
        self.value_of_decl(first, owner)
    }

    fn value_of_decl(&self, decl: DeclId, owner: Option<TypeId>) -> Value {
        match &self.table.declaration(decl).kind {
            DeclKind::Unit(unit) | DeclKind::UnitImport(Some(unit)) => Value::Unit(*unit),
            DeclKind::UnitImport(None) => self.unknown(),
            DeclKind::Type(ty) | DeclKind::TypeParameter(ty) => Value::Type(*ty),
            _ => Value::Typed(self.substitute(self.decl_type(decl), owner)),
        }
    }

    fn substitute(&self, ty: TypeId, owner: Option<TypeId>) -> TypeId {
        owner.map_or(ty, |owner| self.types().substitute(ty, owner))
    }

    fn call_method(&mut self, ident: &Ident, candidates: &[(DeclId, u32)], args: &[TypeId], owner: Option<TypeId>) -> Value {
        let list: Vec<Candidate> = candidates
            .iter()
            .map(|&(id, distance)| Candidate::new(Invocable::Method(id), distance))
            .collect();
        let resolution = OverloadResolver::new(self.table).resolve(&list, args);

        if let Resolution::Ambiguous { chosen, tied } = &resolution {
            let related: Vec<(Location, String)> = tied
                .iter()
                .filter_map(|invocable| {
                    let id = invocable.method()?;
                    Some((self.table.declaration(id).location, invocable.image(self.table)))
                })
                .collect();
            let location = self.location(ident.pos);
            let chosen = chosen.image(self.table);
            self.out
                .diagnostics
                .ambiguous_call(location, ident.name.as_str(), &chosen, &related);
        }

        let chosen = resolution.chosen().and_then(Invocable::method).or_else(|| {
            // Nothing accepts the arguments; bind to the closest plausible candidate.
            candidates
                .iter()
                .map(|&(id, _)| id)
                .find(|&id| {
                    self.table
                        .declaration(id)
                        .method()
                        .is_some_and(|m| args.len() >= m.required_params() && args.len() <= m.params.len())
                })
                .or_else(|| candidates.first().map(|&(id, _)| id))
        });
        let Some(method) = chosen else {
            return self.unknown();
        };
        self.bind(ident.pos, method);

        let data = self.table.declaration(method).method();
        if let (Some(data), Some(owner)) = (data, owner) {
            if data.kind == MethodKind::Constructor && self.types().is_struct(owner) {
                return Value::Typed(owner);
            }
        }
        Value::Typed(self.substitute(self.decl_type(method), owner))
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    fn resolve_member(&mut self, expr: &Expr, base: &Expr, member: &Ident, scope: ScopeId, args: Option<&[TypeId]>) -> Value {
        if let Some(path) = expr.dotted_path() {
            if let Some(value) = self.resolve_namespace(&path, scope, args) {
                return value;
            }
        }
        let base = self.value_of(base, scope);
        self.member_of(base, member, scope, args)
    }

    /// Resolve `A.B.C` whose longest dotted prefix names a unit.
    fn resolve_namespace(&mut self, path: &[&Ident], scope: ScopeId, args: Option<&[TypeId]>) -> Option<Value> {
        for len in (2..path.len()).rev() {
            let text: Vec<&str> = path[..len].iter().map(|ident| ident.name.as_str()).collect();
            let Some(unit) = self.table.unit_named(self.unit, &Name::new(text.join("."))) else {
                continue;
            };
            self.bind(path[0].pos, self.table.unit(unit).declaration);

            let mut value = Value::Unit(unit);
            let rest = &path[len..];
            for (index, ident) in rest.iter().enumerate() {
                let member_args = if index + 1 == rest.len() { args } else { None };
                value = self.member_of(value, ident, scope, member_args);
            }
            return Some(value);
        }
        None
    }

    fn member_of(&mut self, base: Value, member: &Ident, scope: ScopeId, args: Option<&[TypeId]>) -> Value {
        let occurrence = NameOccurrence::new(member.name.clone()).at(self.location(member.pos));
        match base {
            Value::Unit(unit) => {
                let occurrence = occurrence.qualified(Qualifier::Unit(unit));
                let found = Search::new(self.table).execute(&occurrence, scope);
                self.bind_found(member, &occurrence, scope, &found, args, None)
            }
            Value::Type(ty) | Value::Typed(ty) => {
                let host = self.member_host(ty);
                if self.types().type_scope(host).is_none() {
                    return self.unknown();
                }
                let occurrence = occurrence.qualified(Qualifier::Type(host));
                let found = Search::new(self.table).execute(&occurrence, scope);
                self.bind_found(member, &occurrence, scope, &found, args, Some(host))
            }
        }
    }

    /// The type whose members `value.Member` looks at: pointers to records
    /// are dereferenced implicitly, class references stand for their class.
    fn member_host(&self, ty: TypeId) -> TypeId {
        match self.types().kind(ty) {
            TypeKind::Pointer { target: Some(target), .. } => *target,
            TypeKind::ClassReference { class } => *class,
            _ => ty,
        }
    }

    fn resolve_inherited(&mut self, pos: LineCol, name: Option<&Ident>, scope: ScopeId, args: Option<&[TypeId]>) -> Value {
        let table = self.table;
        let Some(method_scope) = table.enclosing_method_scope(scope) else {
            return self.unknown();
        };
        let data = table.scope(method_scope);
        let owner = data
            .enclosing_type
            .and_then(|type_scope| table.scope(type_scope).owner_type);
        let Some(parent) = owner.and_then(|owner| self.types().ancestors(owner).first().copied()) else {
            return self.unknown();
        };
        let current = data.owner_method.map(|id| table.declaration(id));

        let ident = match (name, current) {
            (Some(ident), _) => ident.clone(),
            (None, Some(current)) => Ident {
                name: current.name.clone(),
                pos,
            },
            (None, None) => return self.unknown(),
        };
        // A bare `inherited` passes the current method's parameters on.
        let own_args: Vec<TypeId> = current
            .and_then(|decl| decl.method())
            .map(|method| method.params.iter().map(|p| p.ty).collect())
            .unwrap_or_default();
        let args = match (name, args) {
            (_, Some(args)) => Some(args),
            (None, None) => Some(own_args.as_slice()),
            (Some(_), None) => None,
        };

        let occurrence = NameOccurrence::new(ident.name.clone())
            .at(self.location(ident.pos))
            .qualified(Qualifier::Type(parent));
        let found = Search::new(table).execute(&occurrence, scope);
        self.bind_found(&ident, &occurrence, scope, &found, args, Some(parent))
    }

    // ------------------------------------------------------------------------
    // Calls and indexing
    // ------------------------------------------------------------------------

    fn resolve_call(&mut self, callee: &Expr, args: &[Expr], scope: ScopeId) -> Value {
        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.type_of(arg, scope)).collect();
        let value = match callee {
            Expr::Name(ident) => self.resolve_name(ident, scope, Some(&arg_types)),
            Expr::Member { base, member } => self.resolve_member(callee, base, member, scope, Some(&arg_types)),
            Expr::Inherited { pos, name } => self.resolve_inherited(*pos, name.as_ref(), scope, Some(&arg_types)),
            other => self.value_of(other, scope),
        };
        match value {
            // `TFoo(X)` is a cast.
            Value::Type(ty) => Value::Typed(ty),
            Value::Typed(ty) => match self.types().kind(ty) {
                TypeKind::Procedural { ret, .. } => Value::Typed(*ret),
                _ => value,
            },
            Value::Unit(_) => self.unknown(),
        }
    }

    /// Type of `base[...]` with `count` indices.
    fn indexed_type(&mut self, base: TypeId, count: usize) -> TypeId {
        let types = self.types();
        match types.kind(base) {
            TypeKind::Array { .. } => {
                let mut ty = base;
                for _ in 0..count.max(1) {
                    ty = types.element_type(ty).unwrap_or_else(|| types.unknown());
                }
                ty
            }
            TypeKind::String(kind) => self.string_element(*kind),
            TypeKind::Pointer {
                target: Some(target),
                pointer_math: true,
            } => *target,
            TypeKind::Variant => base,
            _ if types.is_struct(base) => match self.default_property(base) {
                Some(property) => {
                    self.depend_on(property);
                    types.substitute(self.decl_type(property), base)
                }
                None => types.unknown(),
            },
            _ => types.unknown(),
        }
    }

    /// The `default` array property of a struct or its nearest ancestor.
    fn default_property(&self, ty: TypeId) -> Option<DeclId> {
        let mut current = self.types().type_scope(ty);
        while let Some(scope) = current {
            let data = self.table.scope(scope);
            let found = data
                .declarations()
                .find(|&id| self.table.declaration(id).property().is_some_and(|p| p.is_default));
            if found.is_some() {
                return found;
            }
            current = data.supertype;
        }
        None
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn resolve_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr, scope: ScopeId) -> Value {
        let left = self.type_of(left, scope);
        match op {
            BinaryOperator::Is => {
                self.value_of(right, scope);
                Value::Typed(self.types().intrinsic(IntrinsicType::Boolean))
            }
            BinaryOperator::As => match self.value_of(right, scope) {
                Value::Type(ty) | Value::Typed(ty) => Value::Typed(ty),
                Value::Unit(_) => self.unknown(),
            },
            _ => {
                let right = self.type_of(right, scope);
                Value::Typed(self.operator_result(Operator::Binary(op), &[left, right]))
            }
        }
    }

    /// Result type of applying `operator` to operands of the given types.
    fn operator_result(&mut self, operator: Operator, operands: &[TypeId]) -> TypeId {
        let types = self.types();
        let collector = OperatorInvocableCollector::new(self.table);
        let mut invocables = IndexSet::new();
        for &operand in operands {
            invocables.extend(collector.collect(operand, operator));
        }
        let candidates: Vec<Candidate> = invocables.into_iter().map(|i| Candidate::new(i, 0)).collect();

        let resolution = OverloadResolver::new(self.table).resolve(&candidates, operands);
        let Some(chosen) = resolution.chosen() else {
            return types.unknown();
        };
        if let Some(method) = chosen.method() {
            self.depend_on(method);
        }
        let result = chosen.return_type(self.table);
        if result == types.empty_set() {
            // Set algebra yields the type of the set operand.
            return operands.iter().copied().find(|&ty| types.is_set(ty)).unwrap_or(result);
        }
        result
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    fn bind(&mut self, pos: LineCol, decl: DeclId) {
        self.out.references.push((self.location(pos), decl));
        self.depend_on(decl);
    }

    fn depend_on(&mut self, decl: DeclId) {
        let unit = self.table.declaration(decl).unit();
        self.out.dependencies.push((unit, self.section));
    }
}
