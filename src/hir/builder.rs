//! Symbol table construction.
//!
//! [`SymbolTableBuilder`] runs two passes over the syntax trees it is given:
//!
//! 1. **Declaration.** The System unit is seeded with the intrinsic types and
//!    routines. Units are then visited in interface-`uses` order, interface
//!    sections first and implementation sections after, creating every scope,
//!    declaration and type. Type references are resolved as they are met.
//! 2. **Resolution.** Bodies and initializers are resolved by
//!    [`ExprResolver`] against the finished, now read-only table, one unit per
//!    rayon task. The results are merged back in unit order, so the outcome
//!    does not depend on scheduling.
//!
//! A cyclic ancestry aborts the build; everything else (unknown units,
//! unresolved names, circular interface uses) becomes a diagnostic.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::decl::{DeclKind, Declaration, MethodDecl, MethodKind, Parameter, PropertyDecl, Section, VariableKind};
use super::expr::{ExprResolver, UnitResolution};
use super::ids::{DeclId, Location, ScopeId, TypeId, UnitId};
use super::scope::{Import, Scope, ScopeKind};
use super::search::{NameOccurrence, Qualifier, Search};
use super::table::{Declared, SymbolTable};
use super::ty::{ArrayKind, IntrinsicType};
use crate::ast::{
    self, Block, ConstDecl, DeclItem, Expr, ForVar, Ident, Literal, MemberKind, ParamGroup, QualifiedIdent,
    RoutineDecl, RoutineHeading, RoutineKind, SourceUnit, Stmt, StructDecl, StructKind, TypeDecl, TypeExpr, TypeRef,
    UnaryOperator, UnitKind, VarDecl, Visibility,
};
use crate::base::{LineCol, Name};
use crate::config::AnalysisConfig;
use crate::error::{Result, SemaError};

const SYSTEM: &str = "System";

/// Builds a [`SymbolTable`] from parsed units.
///
/// ```ignore
/// let table = SymbolTableBuilder::new(AnalysisConfig::default())
///     .add_unit(unit1)
///     .add_unit(program)
///     .build()?;
/// ```
pub struct SymbolTableBuilder {
    config: AnalysisConfig,
    sources: Vec<SourceUnit>,
}

impl SymbolTableBuilder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// Add a unit. A unit named `System` is merged into the built-in System unit.
    pub fn add_unit(mut self, unit: SourceUnit) -> Self {
        self.sources.push(unit);
        self
    }

    pub fn add_units(mut self, units: impl IntoIterator<Item = SourceUnit>) -> Self {
        self.sources.extend(units);
        self
    }

    /// Declare and resolve every unit.
    ///
    /// Fails on duplicate unit names and on cyclic ancestry.
    pub fn build(self) -> Result<SymbolTable> {
        let mut declarer = Declarer::new(&self.config);
        let system = declarer.seed_system();
        let ids = declarer.register_units(&self.sources, system)?;
        let order = declarer.interface_order(&self.sources, &ids, system);
        debug!(units = self.sources.len(), "declaring units");

        for &index in &order {
            declarer.declare_interface(ids[index], &self.sources[index])?;
        }
        for &index in &order {
            declarer.declare_implementation(ids[index], &self.sources[index])?;
        }

        let mut table = declarer.table;
        let results = resolve_bodies(&table, &self.sources, &ids, self.config.parallel());
        for result in results {
            merge(&mut table, result);
        }

        debug!(
            declarations = table.declarations().count(),
            diagnostics = table.diagnostics().len(),
            "symbol table built"
        );
        Ok(table)
    }
}

fn resolve_bodies(table: &SymbolTable, sources: &[SourceUnit], ids: &[UnitId], parallel: bool) -> Vec<UnitResolution> {
    let resolve = |(source, &unit): (&SourceUnit, &UnitId)| ExprResolver::new(table, unit).resolve_unit(source);
    if parallel {
        sources.par_iter().zip(ids).map(resolve).collect()
    } else {
        sources.iter().zip(ids).map(resolve).collect()
    }
}

fn merge(table: &mut SymbolTable, result: UnitResolution) {
    for (location, decl) in result.references {
        table.add_reference(location, decl);
    }
    for (target, section) in result.dependencies {
        table.add_dependency(result.unit, target, section);
    }
    for (decl, inferred) in result.inferred {
        if let DeclKind::Variable { ty, .. } = &mut table.declaration_mut(decl).kind {
            *ty = inferred;
        }
    }
    table.diagnostics.extend(result.diagnostics);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

// ============================================================================
// DECLARATION PASS
// ============================================================================

struct Declarer<'c> {
    table: SymbolTable,
    config: &'c AnalysisConfig,
    unit: UnitId,
    section: Section,
    /// Values of integer constants and enum elements, for subrange bounds.
    ordinals: FxHashMap<DeclId, i64>,
}

impl<'c> Declarer<'c> {
    fn new(config: &'c AnalysisConfig) -> Self {
        Self {
            table: SymbolTable::new(),
            config,
            unit: UnitId::new(0),
            section: Section::Interface,
            ordinals: FxHashMap::default(),
        }
    }

    fn location(&self, pos: LineCol) -> Location {
        Location::new(self.unit, pos)
    }

    fn unknown(&self) -> TypeId {
        self.table.types().unknown()
    }

    fn intrinsic(&self, ty: IntrinsicType) -> TypeId {
        self.table.types().intrinsic(ty)
    }

    /// Insert a declaration made in the current unit and section.
    fn declare(&mut self, scope: ScopeId, name: Name, kind: DeclKind, pos: LineCol, visibility: Visibility) -> Declared {
        let declared = self.table.declare(Declaration {
            name,
            kind,
            scope,
            location: self.location(pos),
            visibility,
            section: self.section,
        });
        if let Declared::Existing(existing) = declared {
            let previous = self.table.declaration(existing);
            let system = Some(self.unit) == self.table.system_unit();
            if !previous.is_method() && !system {
                let name = previous.name.clone();
                let previous = previous.location;
                let location = self.location(pos);
                self.table
                    .diagnostics
                    .duplicate_declaration(location, name.as_str(), previous);
            }
        }
        declared
    }

    /// Bind a name in a declaration to `decl` and record the dependency.
    fn bind(&mut self, pos: LineCol, decl: DeclId) {
        self.table.add_reference(self.location(pos), decl);
        let target = self.table.declaration(decl).unit();
        self.table.add_dependency(self.unit, target, self.section);
    }

    // ------------------------------------------------------------------------
    // System
    // ------------------------------------------------------------------------

    fn seed_system(&mut self) -> UnitId {
        let system = self.table.add_unit(Name::new(SYSTEM), UnitKind::Unit, LineCol::default());
        self.table.mark_system(system);
        self.unit = system;
        self.section = Section::Interface;
        let scope = self.table.unit(system).scope;
        let pos = LineCol::default();

        for intrinsic in IntrinsicType::ALL {
            let ty = self.intrinsic(intrinsic);
            for name in std::iter::once(intrinsic.image()).chain(intrinsic.aliases().iter().copied()) {
                self.declare(scope, Name::new(name), DeclKind::Type(ty), pos, Visibility::Public);
            }
        }

        let boolean = self.intrinsic(IntrinsicType::Boolean);
        for (ordinal, name) in ["False", "True"].into_iter().enumerate() {
            let kind = DeclKind::Variable {
                ty: boolean,
                kind: VariableKind::Constant,
            };
            let id = self.declare(scope, Name::new(name), kind, pos, Visibility::Public).id();
            self.ordinals.insert(id, ordinal as i64);
        }

        let untyped = self.table.types().untyped();
        let integer = self.intrinsic(IntrinsicType::Integer);
        let void = self.table.types().void();
        let routines: [(&str, &[(TypeId, bool)], TypeId); 10] = [
            ("Length", &[(untyped, false)], integer),
            ("High", &[(untyped, false)], integer),
            ("Low", &[(untyped, false)], integer),
            ("Assigned", &[(untyped, false)], boolean),
            ("Inc", &[(untyped, false), (integer, true)], void),
            ("Dec", &[(untyped, false), (integer, true)], void),
            ("SizeOf", &[(untyped, false)], integer),
            ("Ord", &[(untyped, false)], integer),
            ("Chr", &[(integer, false)], self.intrinsic(IntrinsicType::Char)),
            ("Exit", &[(untyped, true)], void),
        ];
        for (name, params, return_type) in routines {
            let params = params
                .iter()
                .enumerate()
                .map(|(index, &(ty, has_default))| Parameter {
                    name: Name::new(format!("Arg{}", index + 1)),
                    ty,
                    modifier: ast::ParamModifier::Value,
                    has_default,
                })
                .collect();
            let method = MethodDecl {
                kind: MethodKind::Intrinsic,
                params,
                return_type,
                is_class_method: false,
                is_overload: false,
                owner: None,
                implemented: true,
            };
            self.declare(scope, Name::new(name), DeclKind::Method(method), pos, Visibility::Public);
        }
        system
    }

    /// A type declared in the interface of System, if any.
    fn system_type(&self, name: &str) -> Option<TypeId> {
        let system = self.table.system_unit()?;
        self.table
            .find_in_unit_interface(system, &Name::new(name))
            .into_iter()
            .find_map(|id| self.table.declaration(id).declared_type())
    }

    // ------------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------------

    fn register_units(&mut self, sources: &[SourceUnit], system: UnitId) -> Result<Vec<UnitId>> {
        let mut seen = FxHashSet::default();
        let mut ids = Vec::with_capacity(sources.len());
        for source in sources {
            let name = source.name.name();
            if !seen.insert(name.clone()) {
                return Err(SemaError::DuplicateUnit(SmolStr::new(name.as_str())));
            }
            let id = if name.eq_ignore_case(SYSTEM) {
                system
            } else {
                self.table.add_unit(name, source.kind, source.name.pos())
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn resolve_unit_name(&self, name: &Name) -> Option<UnitId> {
        self.config
            .unit_name_candidates(name)
            .iter()
            .find_map(|candidate| self.table.unit_by_name(candidate.as_str()))
    }

    /// Source indices with every unit after the units its interface uses.
    ///
    /// A unit supplying System comes first. Circular interface uses are
    /// reported and the closing edge is ignored.
    fn interface_order(&mut self, sources: &[SourceUnit], ids: &[UnitId], system: UnitId) -> Vec<usize> {
        let index_of: FxHashMap<UnitId, usize> = ids.iter().enumerate().map(|(index, &id)| (id, index)).collect();
        let mut marks = vec![Mark::New; sources.len()];
        let mut order = Vec::with_capacity(sources.len());
        let mut starts: Vec<usize> = (0..sources.len()).collect();
        starts.sort_by_key(|&index| ids[index] != system);

        for start in starts {
            let mut path = Vec::new();
            self.visit_unit(start, sources, ids, &index_of, &mut marks, &mut path, &mut order);
        }
        debug!(order = ?order.iter().map(|&i| sources[i].name.name()).collect::<Vec<_>>(), "unit order");
        order
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_unit(
        &mut self,
        index: usize,
        sources: &[SourceUnit],
        ids: &[UnitId],
        index_of: &FxHashMap<UnitId, usize>,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) {
        if marks[index] != Mark::New {
            return;
        }
        marks[index] = Mark::Active;
        path.push(index);

        for entry in &sources[index].interface.uses {
            let Some(next) = self.resolve_unit_name(&entry.name()).and_then(|unit| index_of.get(&unit).copied()) else {
                continue;
            };
            match marks[next] {
                Mark::New => self.visit_unit(next, sources, ids, index_of, marks, path, order),
                Mark::Active => {
                    let start = path.iter().position(|&i| i == next).unwrap_or(0);
                    let cycle: Vec<String> = path[start..]
                        .iter()
                        .chain(std::iter::once(&next))
                        .map(|&i| sources[i].name.name().as_str().to_string())
                        .collect();
                    let unit = sources[index].name.name();
                    warn!(unit = %unit, cycle = ?cycle, "circular interface uses");
                    self.table.diagnostics.circular_unit_reference(
                        Location::new(ids[index], entry.pos()),
                        unit.as_str(),
                        &cycle,
                    );
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[index] = Mark::Done;
        order.push(index);
    }

    fn declare_interface(&mut self, unit: UnitId, source: &SourceUnit) -> Result<()> {
        self.unit = unit;
        self.section = Section::Interface;
        let scope = self.table.unit(unit).scope;
        self.declare_uses(scope, &source.interface.uses);
        self.declare_items(&source.interface.decls, scope)
    }

    fn declare_implementation(&mut self, unit: UnitId, source: &SourceUnit) -> Result<()> {
        self.unit = unit;
        self.section = Section::Implementation;
        let scope = self.table.unit(unit).scope;
        self.declare_uses(scope, &source.implementation.uses);
        self.declare_items(&source.implementation.decls, scope)?;
        for block in [&source.initialization, &source.finalization].into_iter().flatten() {
            self.declare_block(block, scope, true)?;
        }
        Ok(())
    }

    fn declare_uses(&mut self, scope: ScopeId, uses: &[QualifiedIdent]) {
        for entry in uses {
            let name = entry.name();
            let target = self.resolve_unit_name(&name).filter(|&target| target != self.unit);
            if target.is_none() {
                let location = self.location(entry.pos());
                self.table.diagnostics.unknown_unit(location, name.as_str());
            }
            self.declare(scope, name, DeclKind::UnitImport(target), entry.pos(), Visibility::Public);

            if let Some(target) = target {
                let declaration = self.table.unit(target).declaration;
                self.table.add_reference(self.location(entry.pos()), declaration);
                let imports = &mut self.table.scope_mut(scope).imports;
                if !imports.iter().any(|import| import.unit == target) {
                    imports.push(Import {
                        unit: target,
                        section: self.section,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Declaration sections
    // ------------------------------------------------------------------------

    fn declare_items(&mut self, items: &[DeclItem], scope: ScopeId) -> Result<()> {
        for item in items {
            match item {
                DeclItem::Types(decls) => self.declare_type_group(decls, scope, Visibility::Public)?,
                DeclItem::Vars(vars) => {
                    let kind = self.variable_kind(scope);
                    for var in vars {
                        self.declare_vars(var, scope, kind, Visibility::Public)?;
                    }
                }
                DeclItem::Consts(consts) => {
                    for constant in consts {
                        self.declare_const(constant, scope, Visibility::Public)?;
                    }
                }
                DeclItem::Routine(routine) => self.declare_routine(routine, scope)?,
            }
        }
        Ok(())
    }

    fn variable_kind(&self, scope: ScopeId) -> VariableKind {
        match self.table.scope(scope).kind {
            ScopeKind::Unit => VariableKind::Global,
            ScopeKind::Type => VariableKind::Field,
            ScopeKind::Method | ScopeKind::Block => VariableKind::Local,
        }
    }

    /// Declare `A, B: T`; returns the storage the names take up.
    fn declare_vars(&mut self, var: &VarDecl, scope: ScopeId, kind: VariableKind, visibility: Visibility) -> Result<u32> {
        let ty = self.resolve_type(&var.ty, scope)?;
        for name in &var.names {
            self.declare(scope, name.name.clone(), DeclKind::Variable { ty, kind }, name.pos, visibility);
        }
        let count = u32::try_from(var.names.len()).unwrap_or(u32::MAX);
        Ok(self.table.types().size(ty).saturating_mul(count))
    }

    fn declare_const(&mut self, constant: &ConstDecl, scope: ScopeId, visibility: Visibility) -> Result<()> {
        let ty = match &constant.ty {
            Some(ty) => self.resolve_type(ty, scope)?,
            None => self.constant_type(&constant.value, scope),
        };
        let kind = DeclKind::Variable {
            ty,
            kind: VariableKind::Constant,
        };
        let declared = self.declare(scope, constant.name.name.clone(), kind, constant.name.pos, visibility);
        if let Declared::New(id) = declared {
            if let Some(value) = self.constant_value(&constant.value, scope) {
                self.ordinals.insert(id, value);
            }
        }
        Ok(())
    }

    /// Type of a constant initializer that can be told without resolving it;
    /// anything else is inferred by the resolution pass.
    fn constant_type(&self, expr: &Expr, scope: ScopeId) -> TypeId {
        match expr.skip_parentheses() {
            Expr::Literal(Literal::Integer(value), _) => {
                if i32::try_from(*value).is_ok() {
                    self.intrinsic(IntrinsicType::Integer)
                } else {
                    self.intrinsic(IntrinsicType::Int64)
                }
            }
            Expr::Literal(Literal::Real(_), _) => self.intrinsic(IntrinsicType::Extended),
            Expr::Literal(Literal::String(text), _) if text.chars().count() == 1 => self.intrinsic(IntrinsicType::Char),
            Expr::Literal(Literal::String(_), _) => self.intrinsic(IntrinsicType::UnicodeString),
            Expr::Unary {
                op: UnaryOperator::Negate | UnaryOperator::Plus,
                operand,
            } => self.constant_type(operand, scope),
            Expr::Name(ident) => self
                .lookup(ident, scope)
                .and_then(|id| self.table.declaration(id).value_type())
                .unwrap_or_else(|| self.unknown()),
            _ => self.unknown(),
        }
    }

    /// Integer value of a constant expression, where it can be computed.
    fn constant_value(&self, expr: &Expr, scope: ScopeId) -> Option<i64> {
        match expr.skip_parentheses() {
            Expr::Literal(Literal::Integer(value), _) => Some(*value),
            Expr::Literal(Literal::String(text), _) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(i64::from(u32::from(c))),
                    _ => None,
                }
            }
            Expr::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => self.constant_value(operand, scope).map(i64::wrapping_neg),
            Expr::Unary {
                op: UnaryOperator::Plus,
                operand,
            } => self.constant_value(operand, scope),
            Expr::Binary { op, left, right } => {
                let (left, right) = (self.constant_value(left, scope)?, self.constant_value(right, scope)?);
                match op {
                    ast::BinaryOperator::Add => left.checked_add(right),
                    ast::BinaryOperator::Subtract => left.checked_sub(right),
                    ast::BinaryOperator::Multiply => left.checked_mul(right),
                    ast::BinaryOperator::Div => left.checked_div(right),
                    _ => None,
                }
            }
            Expr::Name(ident) => self
                .lookup(ident, scope)
                .and_then(|id| self.ordinals.get(&id).copied()),
            _ => None,
        }
    }

    /// The first declaration a bare name finds from `scope`, without binding.
    fn lookup(&self, ident: &Ident, scope: ScopeId) -> Option<DeclId> {
        let occurrence = NameOccurrence::new(ident.name.clone());
        Search::new(&self.table).execute(&occurrence, scope).first().copied()
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn declare_type_group(&mut self, decls: &[TypeDecl], scope: ScopeId, visibility: Visibility) -> Result<()> {
        // Structs first, so the group's types can refer to each other.
        let mut structs = Vec::with_capacity(decls.len());
        for decl in decls {
            structs.push(match &decl.ty {
                TypeExpr::Struct(body) => Some(self.struct_placeholder(decl, body, scope, visibility)),
                _ => None,
            });
        }

        for (decl, placeholder) in decls.iter().zip(structs) {
            match (&decl.ty, placeholder) {
                (TypeExpr::Struct(body), Some(ty)) => {
                    if !body.forward {
                        self.fill_struct(ty, body, &decl.type_params)?;
                    }
                }
                (TypeExpr::Named(reference), _) => {
                    let ty = self.resolve_type_ref(reference, scope)?;
                    self.declare(scope, decl.name.name.clone(), DeclKind::Type(ty), decl.name.pos, visibility);
                }
                (other, _) => {
                    let ty = self.resolve_type(other, scope)?;
                    let image = self.qualified_image(scope, &decl.name.name, &[]);
                    self.table.types.rename(ty, image);
                    self.declare(scope, decl.name.name.clone(), DeclKind::Type(ty), decl.name.pos, visibility);
                }
            }
        }
        Ok(())
    }

    /// The struct type declared as `decl`, completing an earlier forward
    /// declaration of the same name when there is one.
    fn struct_placeholder(&mut self, decl: &TypeDecl, body: &StructDecl, scope: ScopeId, visibility: Visibility) -> TypeId {
        if let Some((id, ty)) = self.forward_struct(scope, &decl.name.name) {
            if !body.forward {
                self.table.add_declaration_site(self.location(decl.name.pos), id);
            }
            return ty;
        }
        let image = self.qualified_image(scope, &decl.name.name, &decl.type_params);
        self.new_struct(image, body, scope, Some((&decl.name, visibility)))
    }

    fn forward_struct(&self, scope: ScopeId, name: &Name) -> Option<(DeclId, TypeId)> {
        self.table.scope(scope).find_direct(name).iter().find_map(|&id| {
            let ty = self.table.declaration(id).declared_type()?;
            self.table
                .types()
                .struct_type(ty)
                .filter(|data| data.forward)
                .map(|_| (id, ty))
        })
    }

    /// Allocate a struct type with its member scope, declaring its name in
    /// `scope` when it has one.
    fn new_struct(&mut self, image: SmolStr, body: &StructDecl, scope: ScopeId, name: Option<(&Ident, Visibility)>) -> TypeId {
        let type_scope = self.table.add_scope(Scope::new(ScopeKind::Type, self.unit, Some(scope)));
        let ty = self.table.types.add_struct(image, body.kind, type_scope, body.forward);
        self.table.scope_mut(type_scope).owner_type = Some(ty);
        if let Some((ident, visibility)) = name {
            self.declare(scope, ident.name.clone(), DeclKind::Type(ty), ident.pos, visibility);
        }
        ty
    }

    /// `Unit.TOuter.TName<T>`
    fn qualified_image(&self, scope: ScopeId, name: &Name, type_params: &[Ident]) -> SmolStr {
        let data = self.table.scope(scope);
        let prefix = match (data.kind, data.owner_type) {
            (ScopeKind::Type, Some(owner)) => self.table.types().image(owner).split('<').next().unwrap_or_default(),
            _ => self.table.unit(self.unit).name.as_str(),
        };
        if type_params.is_empty() {
            smol_str::format_smolstr!("{}.{}", prefix, name)
        } else {
            let params: Vec<&str> = type_params.iter().map(|p| p.name.as_str()).collect();
            smol_str::format_smolstr!("{}.{}<{}>", prefix, name, params.join(","))
        }
    }

    fn fill_struct(&mut self, ty: TypeId, body: &StructDecl, type_params: &[Ident]) -> Result<()> {
        let Some(type_scope) = self.table.types().struct_type(ty).map(|data| data.scope) else {
            return Ok(());
        };

        if !type_params.is_empty() {
            let mut params = Vec::with_capacity(type_params.len());
            for param in type_params {
                let param_ty = self.table.types.generic_parameter(param.name.as_str());
                self.declare(
                    type_scope,
                    param.name.clone(),
                    DeclKind::TypeParameter(param_ty),
                    param.pos,
                    Visibility::Public,
                );
                params.push(param_ty);
            }
            self.table.types.set_type_params(ty, params);
        }

        let mut ancestors = Vec::with_capacity(body.ancestors.len() + 1);
        for reference in &body.ancestors {
            let ancestor = self.resolve_type_ref(reference, type_scope)?;
            if !self.table.types().is_unknown(ancestor) {
                ancestors.push(ancestor);
            }
        }
        match body.kind {
            StructKind::Class => {
                let needs_parent = ancestors
                    .first()
                    .is_none_or(|&first| self.table.types().is_interface(first));
                if needs_parent {
                    if let Some(object) = self.system_type("TObject").filter(|&object| object != ty) {
                        ancestors.insert(0, object);
                    }
                }
            }
            StructKind::Interface => {
                if ancestors.is_empty() {
                    if let Some(base) = self.system_type("IInterface").filter(|&base| base != ty) {
                        ancestors.push(base);
                    }
                }
            }
            StructKind::Record | StructKind::Object => {}
        }

        let supertype = ancestors
            .first()
            .and_then(|&ancestor| self.table.types().struct_type(ancestor).map(|data| data.scope));
        self.table.types.complete_struct(ty, ancestors)?;
        self.table.scope_mut(type_scope).supertype = supertype;

        let mut size = 0u32;
        for member in &body.members {
            let visibility = member.visibility;
            match &member.kind {
                MemberKind::Fields(var) => {
                    size = size.saturating_add(self.declare_vars(var, type_scope, VariableKind::Field, visibility)?);
                }
                MemberKind::Method(heading) => {
                    self.declare_heading(heading, type_scope, Some(ty), visibility)?;
                }
                MemberKind::Property(property) => self.declare_property(property, ty, type_scope, visibility)?,
                MemberKind::Types(decls) => self.declare_type_group(decls, type_scope, visibility)?,
                MemberKind::Consts(consts) => {
                    for constant in consts {
                        self.declare_const(constant, type_scope, visibility)?;
                    }
                }
            }
        }
        if matches!(body.kind, StructKind::Record | StructKind::Object) {
            self.table.types.set_record_size(ty, size);
        }
        Ok(())
    }

    fn declare_property(&mut self, property: &ast::PropertyDecl, owner: TypeId, scope: ScopeId, visibility: Visibility) -> Result<()> {
        let ty = match &property.ty {
            Some(ty) => self.resolve_type(ty, scope)?,
            // A redeclaration only changes visibility; keep the inherited type.
            None => self
                .table
                .types()
                .ancestors(owner)
                .first()
                .and_then(|&parent| {
                    self.table
                        .find_member(parent, property.name.name.as_str())
                        .into_iter()
                        .find_map(|id| self.table.declaration(id).property().map(|p| p.ty))
                })
                .unwrap_or_else(|| self.unknown()),
        };
        let params = self.parameters(&property.params, scope)?;
        let read = property.read.as_ref().and_then(|accessor| self.accessor(accessor, owner));
        let write = property.write.as_ref().and_then(|accessor| self.accessor(accessor, owner));

        let kind = DeclKind::Property(PropertyDecl {
            ty,
            params,
            is_default: property.is_default,
            read,
            write,
        });
        self.declare(scope, property.name.name.clone(), kind, property.name.pos, visibility);
        Ok(())
    }

    /// Bind a `read`/`write` accessor to the field or method it names.
    fn accessor(&mut self, accessor: &QualifiedIdent, owner: TypeId) -> Option<DeclId> {
        let ident = accessor.last();
        let decl = self.table.find_member(owner, ident.name.as_str()).first().copied()?;
        self.bind(ident.pos, decl);
        Some(decl)
    }

    /// Resolve a type as written in a declaration.
    fn resolve_type(&mut self, ty: &TypeExpr, scope: ScopeId) -> Result<TypeId> {
        Ok(match ty {
            TypeExpr::Named(reference) => self.resolve_type_ref(reference, scope)?,
            TypeExpr::Subrange { low, high } => {
                let host = self.subrange_host(low, scope);
                self.bind_constant(low, scope);
                self.bind_constant(high, scope);
                let (low, high) = (self.constant_value(low, scope), self.constant_value(high, scope));
                self.table.types.subrange(host, low, high)
            }
            TypeExpr::Enum { elements, scoped } => self.declare_enum(elements, *scoped, scope),
            TypeExpr::Set(element) => {
                let element = self.resolve_type(element, scope)?;
                self.table.types.set_of(element)
            }
            TypeExpr::Array { dims, element } => {
                let mut ty = self.resolve_type(element, scope)?;
                if dims.is_empty() {
                    ty = self.table.types.array_of(ty, ArrayKind::Dynamic);
                }
                for dim in dims.iter().rev() {
                    let index = self.resolve_type(dim, scope)?;
                    let length = self.table.types().ordinal_count(index).unwrap_or(0);
                    ty = self.table.types.array_of(ty, ArrayKind::Static { length });
                }
                ty
            }
            TypeExpr::Pointer { target, pointer_math } => {
                let target = self.resolve_type(target, scope)?;
                self.table.types.pointer_to(Some(target), *pointer_math)
            }
            TypeExpr::Procedural { params, ret, of_object } => {
                let params: Vec<TypeId> = self.parameters(params, scope)?.into_iter().map(|p| p.ty).collect();
                let ret = match ret {
                    Some(ret) => self.resolve_type(ret, scope)?,
                    None => self.table.types().void(),
                };
                self.table.types.procedural(params, ret, *of_object)
            }
            TypeExpr::ClassOf(reference) => {
                let class = self.resolve_type_ref(reference, scope)?;
                self.table.types.class_reference(class)
            }
            TypeExpr::Struct(body) => {
                let kind = match body.kind {
                    StructKind::Record => "<record>",
                    StructKind::Object => "<object>",
                    StructKind::Class => "<class>",
                    StructKind::Interface => "<interface>",
                };
                let ty = self.new_struct(SmolStr::new_static(kind), body, scope, None);
                self.fill_struct(ty, body, &[])?;
                ty
            }
        })
    }

    /// Resolve `Unit.TOuter.TInner<Args>`.
    fn resolve_type_ref(&mut self, reference: &TypeRef, scope: ScopeId) -> Result<TypeId> {
        let parts: Vec<&Ident> = reference.path.parts().collect();
        let mut start = 0;
        let mut qualifier = None;
        for len in (1..parts.len()).rev() {
            let text: Vec<&str> = parts[..len].iter().map(|part| part.name.as_str()).collect();
            if let Some(unit) = self.table.unit_named(self.unit, &Name::new(text.join("."))) {
                let declaration = self.table.unit(unit).declaration;
                self.bind(parts[0].pos, declaration);
                qualifier = Some(Qualifier::Unit(unit));
                start = len;
                break;
            }
        }

        let mut ty = self.unknown();
        for part in &parts[start..] {
            let mut occurrence = NameOccurrence::new(part.name.clone()).at(self.location(part.pos));
            if let Some(qualifier) = qualifier {
                occurrence = occurrence.qualified(qualifier);
            }
            let found = Search::new(&self.table).execute(&occurrence, scope);
            let Some(decl) = found
                .into_iter()
                .find(|&id| self.table.declaration(id).declared_type().is_some())
            else {
                let location = self.location(part.pos);
                self.table.diagnostics.unresolved_name(location, part.name.as_str());
                return Ok(self.unknown());
            };
            self.bind(part.pos, decl);
            ty = self.table.declaration(decl).declared_type().unwrap_or(ty);
            qualifier = Some(Qualifier::Type(ty));
        }

        if !reference.args.is_empty() {
            let mut args = Vec::with_capacity(reference.args.len());
            for arg in &reference.args {
                args.push(self.resolve_type(arg, scope)?);
            }
            let generic = self
                .table
                .types()
                .struct_type(ty)
                .is_some_and(|data| !data.type_params.is_empty());
            if generic {
                ty = self.table.types.specialize(ty, args);
            }
        }
        Ok(ty)
    }

    fn subrange_host(&self, low: &Expr, scope: ScopeId) -> TypeId {
        let ty = self.constant_type(low, scope);
        if self.table.types().is_unknown(ty) {
            self.intrinsic(IntrinsicType::Integer)
        } else {
            ty
        }
    }

    /// Bind a plain name used as a constant inside a type (a subrange bound).
    fn bind_constant(&mut self, expr: &Expr, scope: ScopeId) {
        if let Expr::Name(ident) = expr.skip_parentheses() {
            if let Some(decl) = self.lookup(ident, scope) {
                self.bind(ident.pos, decl);
            }
        }
    }

    fn declare_enum(&mut self, elements: &[Ident], scoped: bool, scope: ScopeId) -> TypeId {
        let enum_scope = self.table.add_scope(Scope::new(ScopeKind::Type, self.unit, Some(scope)));
        let count = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        let ty = self.table.types.enumeration("<enum>", enum_scope, count);
        self.table.scope_mut(enum_scope).owner_type = Some(ty);

        for (ordinal, element) in elements.iter().enumerate() {
            let ordinal = i64::try_from(ordinal).unwrap_or(i64::MAX);
            let kind = DeclKind::EnumElement(ty);
            let id = self
                .declare(enum_scope, element.name.clone(), kind.clone(), element.pos, Visibility::Public)
                .id();
            self.ordinals.insert(id, ordinal);
            if !scoped {
                let id = self.declare(scope, element.name.clone(), kind, element.pos, Visibility::Public).id();
                self.ordinals.insert(id, ordinal);
            }
        }
        ty
    }

    // ------------------------------------------------------------------------
    // Routines
    // ------------------------------------------------------------------------

    fn param_type(&mut self, group: &ParamGroup, scope: ScopeId) -> Result<TypeId> {
        match &group.ty {
            None => Ok(self.table.types().untyped()),
            Some(TypeExpr::Array { dims, element }) if dims.is_empty() => {
                let element = self.resolve_type(element, scope)?;
                Ok(self.table.types.array_of(element, ArrayKind::Open))
            }
            Some(ty) => self.resolve_type(ty, scope),
        }
    }

    fn parameters(&mut self, groups: &[ParamGroup], scope: ScopeId) -> Result<Vec<Parameter>> {
        let mut params = Vec::new();
        for group in groups {
            let ty = self.param_type(group, scope)?;
            params.extend(group.names.iter().map(|name| Parameter {
                name: name.name.clone(),
                ty,
                modifier: group.modifier,
                has_default: group.default.is_some(),
            }));
        }
        Ok(params)
    }

    /// Declare a routine heading in `scope`; `owner` is the type for methods.
    fn declare_heading(
        &mut self,
        heading: &RoutineHeading,
        scope: ScopeId,
        owner: Option<TypeId>,
        visibility: Visibility,
    ) -> Result<Declared> {
        let params = self.parameters(&heading.params, scope)?;
        let return_type = match heading.kind {
            RoutineKind::Function | RoutineKind::Operator => match &heading.ret {
                Some(ret) => self.resolve_type(ret, scope)?,
                None => self.unknown(),
            },
            RoutineKind::Constructor => owner.unwrap_or_else(|| self.unknown()),
            RoutineKind::Procedure | RoutineKind::Destructor => self.table.types().void(),
        };
        let kind = match heading.kind {
            RoutineKind::Procedure | RoutineKind::Function => MethodKind::Normal,
            RoutineKind::Constructor => MethodKind::Constructor,
            RoutineKind::Destructor => MethodKind::Destructor,
            RoutineKind::Operator => MethodKind::Operator,
        };
        let method = MethodDecl {
            kind,
            params,
            return_type,
            is_class_method: heading.is_class || kind == MethodKind::Operator,
            is_overload: heading.is_overload,
            owner,
            implemented: false,
        };
        let name = heading.name.last();
        Ok(self.declare(scope, name.name.clone(), DeclKind::Method(method), name.pos, visibility))
    }

    fn declare_routine(&mut self, routine: &RoutineDecl, scope: ScopeId) -> Result<()> {
        if let Some(owner) = routine.heading.name.qualifier_path() {
            return self.declare_method_body(routine, owner, scope);
        }
        let declared = self.declare_heading(&routine.heading, scope, None, Visibility::Public)?;
        let Some(body) = &routine.body else {
            return Ok(());
        };
        let id = declared.id();
        self.mark_implemented(id);
        if let Declared::Existing(_) = declared {
            self.table.add_declaration_site(self.location(routine.heading.name.last().pos), id);
        }
        self.declare_body(Some(id), &routine.heading, body, scope, None)
    }

    /// `procedure TFoo.Bar(...)`: find the method it implements and declare its body.
    fn declare_method_body(&mut self, routine: &RoutineDecl, owner: QualifiedIdent, scope: ScopeId) -> Result<()> {
        let heading = &routine.heading;
        let owner = self.resolve_type_ref(
            &TypeRef {
                path: owner,
                args: Vec::new(),
            },
            scope,
        )?;
        let name = heading.name.last();
        let type_scope = self.table.types().struct_type(owner).map(|data| data.scope);

        let method = match type_scope {
            Some(type_scope) => self.matching_method(heading, type_scope)?,
            None => None,
        };
        match method {
            Some(id) => {
                self.mark_implemented(id);
                self.table.add_declaration_site(self.location(name.pos), id);
            }
            None => {
                let location = self.location(name.pos);
                self.table
                    .diagnostics
                    .unmatched_implementation(location, heading.name.name().as_str());
            }
        }

        let owner = type_scope.map(|_| owner);
        match &routine.body {
            Some(body) => self.declare_body(method, heading, body, scope, owner),
            None => Ok(()),
        }
    }

    /// The method of a type scope an implementation heading belongs to:
    /// same parameter types, or the only method of that name.
    fn matching_method(&mut self, heading: &RoutineHeading, type_scope: ScopeId) -> Result<Option<DeclId>> {
        let params = self.parameters(&heading.params, type_scope)?;
        let images: Vec<SmolStr> = params
            .iter()
            .map(|p| SmolStr::new(self.table.types().image(p.ty)))
            .collect();
        let candidates: Vec<DeclId> = self
            .table
            .scope(type_scope)
            .find_direct(&heading.name.last().name)
            .iter()
            .copied()
            .filter(|&id| self.table.declaration(id).is_method())
            .collect();

        let types = self.table.types();
        let exact = candidates.iter().copied().find(|&id| {
            self.table.declaration(id).method().is_some_and(|method| {
                method.params.len() == images.len()
                    && method.params.iter().zip(&images).all(|(p, image)| types.image(p.ty) == image.as_str())
            })
        });
        Ok(exact.or_else(|| (candidates.len() == 1).then(|| candidates[0])))
    }

    fn mark_implemented(&mut self, id: DeclId) {
        if let DeclKind::Method(method) = &mut self.table.declaration_mut(id).kind {
            method.implemented = true;
        }
    }

    /// Open the method scope of a routine body and declare its parameters,
    /// `Result`, `Self`, locals and block-local variables.
    fn declare_body(
        &mut self,
        method: Option<DeclId>,
        heading: &RoutineHeading,
        body: &ast::RoutineBody,
        parent: ScopeId,
        owner: Option<TypeId>,
    ) -> Result<()> {
        let name = heading.name.last();
        let mut data = Scope::new(ScopeKind::Method, self.unit, Some(parent));
        data.enclosing_type = owner.and_then(|owner| self.table.types().type_scope(owner));
        data.owner_method = method;
        let scope = self.table.add_scope(data);
        self.table.set_node_scope(self.location(name.pos), scope);

        let declared = method.and_then(|id| self.table.declaration(id).method().cloned());
        if heading.params.is_empty() {
            // `procedure TFoo.Bar;` may omit the parameter list.
            for param in declared.iter().flat_map(|m| m.params.iter()) {
                let kind = DeclKind::Variable {
                    ty: param.ty,
                    kind: VariableKind::Parameter(param.modifier),
                };
                self.declare(scope, param.name.clone(), kind, name.pos, Visibility::Public);
            }
        }
        for group in &heading.params {
            let ty = self.param_type(group, scope)?;
            for ident in &group.names {
                let kind = DeclKind::Variable {
                    ty,
                    kind: VariableKind::Parameter(group.modifier),
                };
                self.declare(scope, ident.name.clone(), kind, ident.pos, Visibility::Public);
            }
        }

        let returns = matches!(heading.kind, RoutineKind::Function | RoutineKind::Operator)
            || declared.as_ref().is_some_and(|m| m.kind == MethodKind::Normal && !self.table.types().is_void(m.return_type));
        if returns {
            let ty = match (&declared, &heading.ret) {
                (Some(method), _) => method.return_type,
                (None, Some(ret)) => self.resolve_type(ret, scope)?,
                (None, None) => self.unknown(),
            };
            let kind = DeclKind::Variable {
                ty,
                kind: VariableKind::Result,
            };
            self.declare(scope, Name::new("Result"), kind, name.pos, Visibility::Public);
        }
        if let Some(owner) = owner {
            let is_class = heading.is_class || declared.as_ref().is_some_and(|m| m.is_class_method);
            let ty = if is_class {
                self.table.types.class_reference(owner)
            } else {
                owner
            };
            let kind = DeclKind::Variable {
                ty,
                kind: VariableKind::SelfValue,
            };
            self.declare(scope, Name::new("Self"), kind, name.pos, Visibility::Public);
        }

        self.declare_items(&body.decls, scope)?;
        self.declare_block(&body.block, scope, false)
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    /// Declare the inline variables of a block. A routine's outermost block
    /// shares the routine's scope; every other block opens its own.
    fn declare_block(&mut self, block: &Block, scope: ScopeId, opens_scope: bool) -> Result<()> {
        let scope = if opens_scope {
            self.table.add_scope(Scope::new(ScopeKind::Block, self.unit, Some(scope)))
        } else {
            scope
        };
        self.table.set_node_scope(self.location(block.begin), scope);
        for stmt in &block.stmts {
            self.declare_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn declare_stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<()> {
        match stmt {
            Stmt::Compound(block) => self.declare_block(block, scope, true),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.declare_stmt(then_branch, scope)?;
                match else_branch {
                    Some(else_branch) => self.declare_stmt(else_branch, scope),
                    None => Ok(()),
                }
            }
            Stmt::While { body, .. } => self.declare_stmt(body, scope),
            Stmt::Repeat { body, .. } => {
                for stmt in body {
                    self.declare_stmt(stmt, scope)?;
                }
                Ok(())
            }
            Stmt::ForTo { var, body, .. } | Stmt::ForIn { var, body, .. } => {
                let body_scope = self.declare_loop_variable(var, scope)?;
                self.declare_stmt(body, body_scope)
            }
            Stmt::Var { names, ty, .. } => {
                let ty = match ty {
                    Some(ty) => self.resolve_type(ty, scope)?,
                    None => self.unknown(),
                };
                for name in names {
                    let kind = DeclKind::Variable {
                        ty,
                        kind: VariableKind::Local,
                    };
                    self.declare(scope, name.name.clone(), kind, name.pos, Visibility::Public);
                }
                Ok(())
            }
            Stmt::Assign { .. } | Stmt::Call(_) | Stmt::Raise(_) => Ok(()),
        }
    }

    /// `for var I := ...` opens a scope holding `I`.
    fn declare_loop_variable(&mut self, var: &ForVar, scope: ScopeId) -> Result<ScopeId> {
        let ForVar::Declaration { name, ty } = var else {
            return Ok(scope);
        };
        let loop_scope = self.table.add_scope(Scope::new(ScopeKind::Block, self.unit, Some(scope)));
        self.table.set_node_scope(self.location(name.pos), loop_scope);
        let ty = match ty {
            Some(ty) => self.resolve_type(ty, loop_scope)?,
            None => self.unknown(),
        };
        let kind = DeclKind::Variable {
            ty,
            kind: VariableKind::Local,
        };
        self.declare(loop_scope, name.name.clone(), kind, name.pos, Visibility::Public);
        Ok(loop_scope)
    }
}
