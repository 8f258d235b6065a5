//! Lowers tree-sitter parse trees into the arena model.
//!
//! A workspace is lowered in three passes. Registration interns every
//! declared class under its canonical dotted name, so cross-file
//! references agree on ids before any body is visited. A second pass
//! attaches supertype edges once all names are known. Lowering then
//! walks each tree and builds the per-unit arenas; anything without a
//! modeled shape becomes an opaque node rather than being dropped.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use tree_sitter::Node;

use crate::ast::{
    ClassDecl, ClassId, Expr, ExprId, Import, MethodDecl, MethodId, SourceUnit, Span, Stmt, StmtId,
    UnitBuilder, UnitId, VarDecl, VarId,
};
use crate::java::parser::ParsedSource;
use crate::types::{Provenance, TypeGraph, TypeId};

/// Import surface of one unit, consulted whenever a source-level type
/// name must become a canonical one.
#[derive(Debug, Default, Clone)]
pub(crate) struct UnitNames {
    pub package: Option<String>,
    /// Simple name to canonical name, from single-type imports.
    pub explicit: FxHashMap<String, String>,
    /// Package prefixes from on-demand imports.
    pub wildcards: Vec<String>,
}

/// A class whose declared supertypes still need resolving.
#[derive(Debug)]
pub(crate) struct PendingSupers {
    pub ty: TypeId,
    pub supers: Vec<String>,
}

/// Output of the registration pass over one unit.
#[derive(Debug)]
pub(crate) struct Registration {
    pub names: UnitNames,
    pub pending: Vec<PendingSupers>,
}

/// Interns every class declared by the unit and collects its import
/// surface. Must run for all units before any supertype resolution or
/// lowering.
pub(crate) fn register_unit(parsed: &ParsedSource, graph: &mut TypeGraph) -> Registration {
    let source = parsed.text.as_bytes();
    let root = parsed.tree.root_node();
    let mut names = UnitNames::default();
    let mut pending = Vec::new();

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => names.package = package_name(&child, source),
            "import_declaration" => collect_import(&child, source, &mut names),
            _ => {}
        }
    }
    register_types(
        &root,
        source,
        names.package.as_deref(),
        &mut Vec::new(),
        graph,
        &mut pending,
    );
    Registration { names, pending }
}

fn register_types(
    node: &Node,
    source: &[u8],
    package: Option<&str>,
    nesting: &mut Vec<String>,
    graph: &mut TypeGraph,
    pending: &mut Vec<PendingSupers>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if !is_type_declaration(child.kind()) {
            register_types(&child, source, package, nesting, graph, pending);
            continue;
        }
        let Some(simple) = child
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())
        else {
            continue;
        };
        nesting.push(simple.to_string());
        let canonical = qualified_name(package, nesting);
        let ty = graph.intern(&canonical, Provenance::Project);
        let supers = declared_super_names(&child, source);
        if !supers.is_empty() {
            pending.push(PendingSupers { ty, supers });
        }
        if let Some(body) = child.child_by_field_name("body") {
            register_types(&body, source, package, nesting, graph, pending);
        }
        nesting.pop();
    }
}

fn declared_super_names(node: &Node, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "superclass" => {
                let mut inner = child.walk();
                for ty in child.named_children(&mut inner) {
                    if let Ok(text) = ty.utf8_text(source) {
                        out.push(text.to_string());
                    }
                }
            }
            "super_interfaces" | "extends_interfaces" => {
                let mut inner = child.walk();
                for list in child.named_children(&mut inner) {
                    let mut types = list.walk();
                    for ty in list.named_children(&mut types) {
                        if let Ok(text) = ty.utf8_text(source) {
                            out.push(text.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn package_name(node: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"))
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_string);
    name
}

fn collect_import(node: &Node, source: &[u8], names: &mut UnitNames) {
    let Some(import) = import_of(node, source) else {
        return;
    };
    if import.wildcard {
        names.wildcards.push(import.path);
    } else {
        let simple = import.path.rsplit('.').next().unwrap_or_default().to_string();
        names.explicit.insert(simple, import.path);
    }
}

/// Reads one import declaration. Static imports bring members in, not
/// types, and are skipped.
fn import_of(node: &Node, source: &[u8]) -> Option<Import> {
    let mut cursor = node.walk();
    if node.children(&mut cursor).any(|c| c.kind() == "static") {
        return None;
    }
    let mut path = None;
    let mut wildcard = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" | "scoped_identifier" => path = child.utf8_text(source).ok(),
            "asterisk" => wildcard = true,
            _ => {}
        }
    }
    path.map(|p| Import {
        path: p.to_string(),
        wildcard,
    })
}

/// Resolves a source-level type name against the unit's import surface,
/// interning the result. Candidates already in the graph win over the
/// bare name; a name with no candidate is interned as written so later
/// sightings agree on the id.
pub(crate) fn resolve_type_name(name: &str, names: &UnitNames, graph: &mut TypeGraph) -> TypeId {
    let trimmed = name.trim();
    let (base, suffix) = split_type_suffix(trimmed);
    let canonical = resolve_base(base, names, graph);
    // a diamond carries no type information
    let suffix = if suffix == "<>" { "" } else { suffix };
    if suffix.is_empty() {
        return graph.intern(&canonical, Provenance::Unknown);
    }
    let base_id = graph.intern(&canonical, Provenance::Unknown);
    let full = format!("{canonical}{suffix}");
    let provenance = graph.provenance(base_id);
    let id = graph.intern(&full, provenance);
    // erasure edge: raw-type subtype checks see through the suffix
    graph.add_super(id, base_id);
    id
}

/// Non-interning variant used at query time: the first candidate
/// already in the graph wins.
pub(crate) fn lookup_type_name(name: &str, names: &UnitNames, graph: &TypeGraph) -> Option<TypeId> {
    let (base, _) = split_type_suffix(name.trim());
    if base.contains('.') {
        return graph.lookup(base);
    }
    if let Some(canonical) = names.explicit.get(base) {
        if let Some(id) = graph.lookup(canonical) {
            return Some(id);
        }
    }
    if let Some(pkg) = &names.package {
        if let Some(id) = graph.lookup(&format!("{pkg}.{base}")) {
            return Some(id);
        }
    }
    for pkg in &names.wildcards {
        if let Some(id) = graph.lookup(&format!("{pkg}.{base}")) {
            return Some(id);
        }
    }
    if let Some(id) = graph.lookup(&format!("java.lang.{base}")) {
        return Some(id);
    }
    graph.lookup(base)
}

fn resolve_base(base: &str, names: &UnitNames, graph: &TypeGraph) -> String {
    if base.contains('.') {
        return base.to_string();
    }
    if let Some(canonical) = names.explicit.get(base) {
        return canonical.clone();
    }
    if let Some(pkg) = &names.package {
        let candidate = format!("{pkg}.{base}");
        if graph.lookup(&candidate).is_some() {
            return candidate;
        }
    }
    for pkg in &names.wildcards {
        let candidate = format!("{pkg}.{base}");
        if graph.lookup(&candidate).is_some() {
            return candidate;
        }
    }
    let candidate = format!("java.lang.{base}");
    if graph.lookup(&candidate).is_some() {
        return candidate;
    }
    base.to_string()
}

fn split_type_suffix(name: &str) -> (&str, &str) {
    match name.find(['<', '[']) {
        Some(i) => (name[..i].trim_end(), &name[i..]),
        None => (name, ""),
    }
}

fn qualified_name(package: Option<&str>, nesting: &[String]) -> String {
    let path = nesting.join(".");
    match package {
        Some(pkg) => format!("{pkg}.{path}"),
        None => path,
    }
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

/// Lowers one registered unit into a frozen [`SourceUnit`].
pub(crate) fn lower_unit(
    parsed: &ParsedSource,
    id: UnitId,
    names: &UnitNames,
    graph: &mut TypeGraph,
) -> SourceUnit {
    let mut lowerer = Lowerer {
        source: parsed.text.as_bytes(),
        names,
        graph,
        builder: UnitBuilder::new(parsed.path.as_str(), parsed.text.as_str()),
    };
    lowerer.lower_program(&parsed.tree.root_node());
    lowerer.builder.finish(id)
}

struct Lowerer<'a> {
    source: &'a [u8],
    names: &'a UnitNames,
    graph: &'a mut TypeGraph,
    builder: UnitBuilder,
}

impl<'a> Lowerer<'a> {
    fn lower_program(&mut self, root: &Node) {
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    let pkg = package_name(&child, self.source);
                    self.builder.set_package(pkg);
                }
                "import_declaration" => {
                    if let Some(import) = import_of(&child, self.source) {
                        self.builder.add_import(import);
                    }
                }
                kind if is_type_declaration(kind) => {
                    self.lower_class(&child, None, &mut Vec::new());
                }
                _ => {}
            }
        }
    }

    fn lower_class(&mut self, node: &Node, outer: Option<ClassId>, nesting: &mut Vec<String>) {
        let Some(simple) = self.field_text(node, "name") else {
            return;
        };
        nesting.push(simple);
        let canonical = qualified_name(self.names.package.as_deref(), nesting);
        let ty = self.graph.intern(&canonical, Provenance::Project);
        let class_id = self.builder.add_class(ClassDecl {
            ty,
            outer,
            fields: Vec::new(),
            methods: Vec::new(),
            span: span_of(node),
        });
        if let Some(body) = node.child_by_field_name("body") {
            self.lower_class_body(&body, ty, class_id, nesting);
        }
        nesting.pop();
    }

    fn lower_class_body(
        &mut self,
        body: &Node,
        ty: TypeId,
        class_id: ClassId,
        nesting: &mut Vec<String>,
    ) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_declaration"
                | "constructor_declaration"
                | "compact_constructor_declaration" => {
                    let mid = self.lower_method(&member, Some(ty));
                    self.builder.class_mut(class_id).methods.push(mid);
                }
                "field_declaration" | "constant_declaration" => {
                    let vars = self.lower_var_declarators(&member);
                    self.builder.class_mut(class_id).fields.extend(vars);
                }
                "static_initializer" => {
                    if let Some(block) = first_child_of_kind(&member, "block") {
                        let mid = self.lower_initializer(&block, ty, "<clinit>");
                        self.builder.class_mut(class_id).methods.push(mid);
                    }
                }
                "block" => {
                    let mid = self.lower_initializer(&member, ty, "<init>");
                    self.builder.class_mut(class_id).methods.push(mid);
                }
                // enum members sit behind the constant list
                "enum_body_declarations" => self.lower_class_body(&member, ty, class_id, nesting),
                kind if is_type_declaration(kind) => {
                    self.lower_class(&member, Some(class_id), nesting);
                }
                _ => {}
            }
        }
    }

    fn lower_initializer(&mut self, block: &Node, container: TypeId, name: &str) -> MethodId {
        let body = self.lower_block(block);
        self.builder.add_method(MethodDecl {
            name: name.to_string(),
            container: Some(container),
            params: SmallVec::new(),
            throws: SmallVec::new(),
            return_type: None,
            body: Some(body),
            is_ctor: false,
            span: span_of(block),
        })
    }

    fn lower_method(&mut self, node: &Node, container: Option<TypeId>) -> MethodId {
        let is_ctor = matches!(
            node.kind(),
            "constructor_declaration" | "compact_constructor_declaration"
        );
        let name = self.field_text(node, "name").unwrap_or_default();

        let mut params: SmallVec<[VarId; 4]> = SmallVec::new();
        if let Some(list) = node.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for param in list.named_children(&mut cursor) {
                match param.kind() {
                    "formal_parameter" => {
                        let declared = param
                            .child_by_field_name("type")
                            .and_then(|t| self.declared_type_of(&t));
                        let pname = self.field_text(&param, "name").unwrap_or_default();
                        params.push(self.builder.add_var(VarDecl {
                            name: pname,
                            declared_type: declared,
                            init: None,
                            span: span_of(&param),
                        }));
                    }
                    "spread_parameter" => {
                        if let Some(var) = self.lower_spread_parameter(&param) {
                            params.push(var);
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut throws: SmallVec<[TypeId; 2]> = SmallVec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "throws" {
                continue;
            }
            let mut inner = child.walk();
            for ty in child.named_children(&mut inner) {
                throws.push(self.type_of(&ty));
            }
        }

        let return_type = if is_ctor {
            None
        } else {
            node.child_by_field_name("type").map(|t| self.type_of(&t))
        };
        let body = node.child_by_field_name("body").map(|b| self.lower_block(&b));

        self.builder.add_method(MethodDecl {
            name,
            container,
            params,
            throws,
            return_type,
            body,
            is_ctor,
            span: span_of(node),
        })
    }

    fn lower_spread_parameter(&mut self, param: &Node) -> Option<VarId> {
        let mut declared = None;
        let mut name = None;
        let mut cursor = param.walk();
        for child in param.named_children(&mut cursor) {
            match child.kind() {
                "variable_declarator" => name = self.field_text(&child, "name"),
                "modifiers" | "line_comment" | "block_comment" => {}
                _ => declared = self.declared_type_of(&child),
            }
        }
        Some(self.builder.add_var(VarDecl {
            name: name?,
            declared_type: declared,
            init: None,
            span: span_of(param),
        }))
    }

    fn lower_var_declarators(&mut self, node: &Node) -> Vec<VarId> {
        let declared = node
            .child_by_field_name("type")
            .and_then(|t| self.declared_type_of(&t));
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let name = self.field_text(&child, "name").unwrap_or_default();
            let init = child
                .child_by_field_name("value")
                .map(|v| self.lower_expr(&v));
            out.push(self.builder.add_var(VarDecl {
                name,
                declared_type: declared,
                init,
                span: span_of(&child),
            }));
        }
        out
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn lower_block(&mut self, node: &Node) -> StmtId {
        let mut stmts = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "line_comment" | "block_comment") {
                continue;
            }
            stmts.push(self.lower_stmt(&child));
        }
        self.builder.add_stmt(Stmt::Block {
            stmts,
            span: span_of(node),
        })
    }

    fn lower_stmt(&mut self, node: &Node) -> StmtId {
        let span = span_of(node);
        match node.kind() {
            "block" => self.lower_block(node),
            "expression_statement" => {
                let expr = match first_expr_child(node) {
                    Some(inner) => self.lower_expr(&inner),
                    None => self.opaque_leaf(span),
                };
                self.builder.add_stmt(Stmt::Expr { expr, span })
            }
            "local_variable_declaration" => {
                let vars = self.lower_var_declarators(node);
                self.builder.add_stmt(Stmt::LocalVar {
                    vars: vars.into_iter().collect(),
                    span,
                })
            }
            "if_statement" => {
                let cond = self.lower_condition(node);
                let then_branch = self.lower_stmt_field(node, "consequence", span);
                let else_branch = node
                    .child_by_field_name("alternative")
                    .map(|n| self.lower_stmt(&n));
                self.builder.add_stmt(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                    span,
                })
            }
            "while_statement" | "do_statement" => {
                let cond = self.lower_condition(node);
                let body = self.lower_stmt_field(node, "body", span);
                self.builder.add_stmt(Stmt::Loop {
                    vars: SmallVec::new(),
                    header: smallvec![cond],
                    body,
                    span,
                })
            }
            "for_statement" => self.lower_for(node),
            "enhanced_for_statement" => self.lower_enhanced_for(node),
            "try_statement" | "try_with_resources_statement" => self.lower_try(node),
            "throw_statement" => {
                let expr = match first_expr_child(node) {
                    Some(inner) => self.lower_expr(&inner),
                    None => self.opaque_leaf(span),
                };
                self.builder.add_stmt(Stmt::Throw { expr, span })
            }
            "return_statement" => {
                let expr = first_expr_child(node).map(|e| self.lower_expr(&e));
                self.builder.add_stmt(Stmt::Return { expr, span })
            }
            "switch_expression" | "switch_statement" => {
                let scrutinee = node.child_by_field_name("condition").map(|c| {
                    let inner = unwrap_parens(c);
                    self.lower_expr(&inner)
                });
                let body = self.lower_switch_body(node, span);
                self.builder.add_stmt(Stmt::Switch {
                    scrutinee,
                    body,
                    span,
                })
            }
            "synchronized_statement" => match node.child_by_field_name("body") {
                Some(b) => self.lower_block(&b),
                None => self.builder.add_stmt(Stmt::Other { span }),
            },
            "labeled_statement" => {
                let inner = {
                    let mut cursor = node.walk();
                    let found = node.named_children(&mut cursor).find(|c| {
                        !matches!(c.kind(), "identifier" | "line_comment" | "block_comment")
                    });
                    found
                };
                match inner {
                    Some(s) => self.lower_stmt(&s),
                    None => self.builder.add_stmt(Stmt::Other { span }),
                }
            }
            _ => self.builder.add_stmt(Stmt::Other { span }),
        }
    }

    fn lower_stmt_field(&mut self, node: &Node, field: &str, fallback: Span) -> StmtId {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_stmt(&child),
            None => self.builder.add_stmt(Stmt::Other { span: fallback }),
        }
    }

    fn lower_condition(&mut self, node: &Node) -> ExprId {
        match node.child_by_field_name("condition") {
            Some(cond) => {
                let inner = unwrap_parens(cond);
                self.lower_expr(&inner)
            }
            None => self.opaque_leaf(span_of(node)),
        }
    }

    fn lower_for(&mut self, node: &Node) -> StmtId {
        let span = span_of(node);
        let mut vars: SmallVec<[VarId; 1]> = SmallVec::new();
        let mut header: SmallVec<[ExprId; 2]> = SmallVec::new();
        let mut cursor = node.walk();
        let inits: Vec<Node> = node.children_by_field_name("init", &mut cursor).collect();
        for init in inits {
            if init.kind() == "local_variable_declaration" {
                vars.extend(self.lower_var_declarators(&init));
            } else {
                header.push(self.lower_expr(&init));
            }
        }
        if let Some(cond) = node.child_by_field_name("condition") {
            let inner = unwrap_parens(cond);
            header.push(self.lower_expr(&inner));
        }
        let updates: Vec<Node> = node.children_by_field_name("update", &mut cursor).collect();
        for update in updates {
            header.push(self.lower_expr(&update));
        }
        let body = self.lower_stmt_field(node, "body", span);
        self.builder.add_stmt(Stmt::Loop {
            vars,
            header,
            body,
            span,
        })
    }

    fn lower_enhanced_for(&mut self, node: &Node) -> StmtId {
        let span = span_of(node);
        let declared = node
            .child_by_field_name("type")
            .and_then(|t| self.declared_type_of(&t));
        let name = self.field_text(node, "name").unwrap_or_default();
        let init = node
            .child_by_field_name("value")
            .map(|v| self.lower_expr(&v));
        let var = self.builder.add_var(VarDecl {
            name,
            declared_type: declared,
            init,
            span,
        });
        let body = self.lower_stmt_field(node, "body", span);
        self.builder.add_stmt(Stmt::Loop {
            vars: smallvec![var],
            header: SmallVec::new(),
            body,
            span,
        })
    }

    fn lower_try(&mut self, node: &Node) -> StmtId {
        let span = span_of(node);
        let mut resources: SmallVec<[VarId; 1]> = SmallVec::new();
        if let Some(spec) = node.child_by_field_name("resources") {
            let mut cursor = spec.walk();
            for res in spec.named_children(&mut cursor) {
                if res.kind() != "resource" {
                    continue;
                }
                // a bare identifier resource declares nothing
                let Some(ty_node) = res.child_by_field_name("type") else {
                    continue;
                };
                let declared = self.declared_type_of(&ty_node);
                let name = self.field_text(&res, "name").unwrap_or_default();
                let init = res
                    .child_by_field_name("value")
                    .map(|v| self.lower_expr(&v));
                resources.push(self.builder.add_var(VarDecl {
                    name,
                    declared_type: declared,
                    init,
                    span: span_of(&res),
                }));
            }
        }
        let body = match node.child_by_field_name("body") {
            Some(b) => self.lower_block(&b),
            None => self.builder.add_stmt(Stmt::Block {
                stmts: vec![],
                span,
            }),
        };
        let mut catches: SmallVec<[StmtId; 2]> = SmallVec::new();
        let mut finally = None;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "catch_clause" => catches.push(self.lower_catch(&child)),
                "finally_clause" => {
                    finally = first_child_of_kind(&child, "block").map(|b| self.lower_block(&b));
                }
                _ => {}
            }
        }
        self.builder.add_stmt(Stmt::Try {
            resources,
            body,
            catches,
            finally,
            span,
        })
    }

    fn lower_catch(&mut self, node: &Node) -> StmtId {
        let span = span_of(node);
        let mut caught: SmallVec<[TypeId; 2]> = SmallVec::new();
        let mut param = None;
        if let Some(formal) = first_child_of_kind(node, "catch_formal_parameter") {
            if let Some(types) = first_child_of_kind(&formal, "catch_type") {
                let mut cursor = types.walk();
                for ty in types.named_children(&mut cursor) {
                    caught.push(self.type_of(&ty));
                }
            }
            if let Some(name) = self.field_text(&formal, "name") {
                // multi-catch parameters take the first alternative;
                // all alternatives share the throwable upper bound
                let declared = caught.first().copied();
                param = Some(self.builder.add_var(VarDecl {
                    name,
                    declared_type: declared,
                    init: None,
                    span: span_of(&formal),
                }));
            }
        }
        let body = match node.child_by_field_name("body") {
            Some(b) => self.lower_block(&b),
            None => self.builder.add_stmt(Stmt::Block {
                stmts: vec![],
                span,
            }),
        };
        self.builder.add_stmt(Stmt::Catch {
            param,
            caught,
            body,
            span,
        })
    }

    fn lower_switch_body(&mut self, node: &Node, fallback: Span) -> StmtId {
        let mut stmts = Vec::new();
        let Some(block) = node.child_by_field_name("body") else {
            return self.builder.add_stmt(Stmt::Block {
                stmts,
                span: fallback,
            });
        };
        let mut cursor = block.walk();
        for group in block.named_children(&mut cursor) {
            if !matches!(group.kind(), "switch_block_statement_group" | "switch_rule") {
                continue;
            }
            let mut inner = group.walk();
            for child in group.named_children(&mut inner) {
                if matches!(
                    child.kind(),
                    "switch_label" | "line_comment" | "block_comment"
                ) {
                    continue;
                }
                stmts.push(self.lower_stmt(&child));
            }
        }
        self.builder.add_stmt(Stmt::Block {
            stmts,
            span: span_of(&block),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn lower_expr(&mut self, node: &Node) -> ExprId {
        let span = span_of(node);
        match node.kind() {
            "string_literal" | "text_block" => {
                let value = decode_string_literal(self.text_at(node));
                self.builder.add_expr(Expr::Literal {
                    value: Some(value),
                    span,
                })
            }
            "character_literal" => {
                let raw = self.text_at(node);
                let inner = raw
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .unwrap_or(raw);
                self.builder.add_expr(Expr::Literal {
                    value: Some(unescape(inner)),
                    span,
                })
            }
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false" => {
                let value = Some(self.text_at(node).to_string());
                self.builder.add_expr(Expr::Literal { value, span })
            }
            "null_literal" => self.builder.add_expr(Expr::Literal { value: None, span }),
            "identifier" => {
                let name = self.text_at(node).to_string();
                self.builder.add_expr(Expr::Reference { name, span })
            }
            "field_access" => {
                let name = self.field_text(node, "field").unwrap_or_default();
                self.builder.add_expr(Expr::Reference { name, span })
            }
            "method_invocation" => self.lower_call(node),
            "object_creation_expression" => self.lower_new(node),
            "binary_expression" => self.lower_binary(node),
            "parenthesized_expression" => {
                let children = first_expr_child(node)
                    .map(|inner| vec![self.lower_expr(&inner)])
                    .unwrap_or_default();
                self.builder.add_expr(Expr::Opaque { children, span })
            }
            "cast_expression" => self.opaque_fields(node, &["value"], span),
            "ternary_expression" => {
                self.opaque_fields(node, &["condition", "consequence", "alternative"], span)
            }
            "assignment_expression" => self.opaque_fields(node, &["left", "right"], span),
            "array_access" => self.opaque_fields(node, &["array", "index"], span),
            "unary_expression" => self.opaque_fields(node, &["operand"], span),
            "update_expression" => {
                let children = first_expr_child(node)
                    .map(|inner| vec![self.lower_expr(&inner)])
                    .unwrap_or_default();
                self.builder.add_expr(Expr::Opaque { children, span })
            }
            "instanceof_expression" => self.opaque_fields(node, &["left"], span),
            "lambda_expression" => self.lower_lambda(node),
            "switch_expression" => {
                let children = node
                    .child_by_field_name("condition")
                    .map(|c| {
                        let inner = unwrap_parens(c);
                        vec![self.lower_expr(&inner)]
                    })
                    .unwrap_or_default();
                let body = self.lower_switch_body(node, span);
                let expr = self.builder.add_expr(Expr::Opaque { children, span });
                self.builder.claim_stmt(body, expr);
                expr
            }
            _ => self.opaque_leaf(span),
        }
    }

    fn lower_call(&mut self, node: &Node) -> ExprId {
        let span = span_of(node);
        let name = self.field_text(node, "name").unwrap_or_default();
        let args_node = node.child_by_field_name("arguments");
        let callee_end = args_node
            .map(|a| a.start_byte())
            .unwrap_or_else(|| node.end_byte());
        // interior whitespace collapses so multiline chains classify
        let callee: String = self
            .slice(node.start_byte(), callee_end)
            .split_whitespace()
            .collect();
        let receiver = node
            .child_by_field_name("object")
            .map(|o| self.lower_expr(&o));
        let args = args_node.map(|a| self.lower_args(&a)).unwrap_or_default();
        self.builder.add_expr(Expr::Call {
            callee,
            name,
            receiver,
            args,
            span,
        })
    }

    fn lower_new(&mut self, node: &Node) -> ExprId {
        let span = span_of(node);
        let (type_name, ty) = match node.child_by_field_name("type") {
            Some(t) => {
                let text = self.text_at(&t).to_string();
                let id = resolve_type_name(&text, self.names, self.graph);
                (text, Some(id))
            }
            None => (String::new(), None),
        };
        let args = node
            .child_by_field_name("arguments")
            .map(|a| self.lower_args(&a))
            .unwrap_or_default();
        // anonymous class bodies are analyzed without a container type
        if let Some(body) = first_child_of_kind(node, "class_body") {
            let mut cursor = body.walk();
            let members: Vec<Node> = body.named_children(&mut cursor).collect();
            for member in members {
                if member.kind() == "method_declaration" {
                    self.lower_method(&member, None);
                }
            }
        }
        self.builder.add_expr(Expr::New {
            type_name,
            ty,
            args,
            span,
        })
    }

    fn lower_binary(&mut self, node: &Node) -> ExprId {
        let span = span_of(node);
        if !is_plus(node, self.source) {
            return self.opaque_fields(node, &["left", "right"], span);
        }
        let mut operands = Vec::new();
        self.flatten_concat(node, &mut operands);
        self.builder.add_expr(Expr::Concat { operands, span })
    }

    fn flatten_concat(&mut self, node: &Node, out: &mut Vec<ExprId>) {
        for field in ["left", "right"] {
            let Some(child) = node.child_by_field_name(field) else {
                continue;
            };
            if child.kind() == "binary_expression" && is_plus(&child, self.source) {
                self.flatten_concat(&child, out);
            } else {
                out.push(self.lower_expr(&child));
            }
        }
    }

    fn lower_lambda(&mut self, node: &Node) -> ExprId {
        let span = span_of(node);
        match node.child_by_field_name("body") {
            Some(body) if body.kind() == "block" => {
                let stmt = self.lower_block(&body);
                let expr = self.builder.add_expr(Expr::Opaque {
                    children: vec![],
                    span,
                });
                self.builder.claim_stmt(stmt, expr);
                expr
            }
            Some(body) => {
                let children = vec![self.lower_expr(&body)];
                self.builder.add_expr(Expr::Opaque { children, span })
            }
            None => self.opaque_leaf(span),
        }
    }

    fn lower_args(&mut self, node: &Node) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        let args: Vec<Node> = node.named_children(&mut cursor).collect();
        for arg in args {
            if matches!(arg.kind(), "line_comment" | "block_comment") {
                continue;
            }
            out.push(self.lower_expr(&arg));
        }
        out
    }

    fn opaque_fields(&mut self, node: &Node, fields: &[&str], span: Span) -> ExprId {
        let mut children = Vec::new();
        for field in fields {
            if let Some(child) = node.child_by_field_name(field) {
                children.push(self.lower_expr(&child));
            }
        }
        self.builder.add_expr(Expr::Opaque { children, span })
    }

    fn opaque_leaf(&mut self, span: Span) -> ExprId {
        self.builder.add_expr(Expr::Opaque {
            children: vec![],
            span,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn type_of(&mut self, node: &Node) -> TypeId {
        let text = self.text_at(node);
        resolve_type_name(text, self.names, self.graph)
    }

    /// Declared type of a binding site; `var` carries none.
    fn declared_type_of(&mut self, node: &Node) -> Option<TypeId> {
        let text = self.text_at(node);
        if text == "var" {
            return None;
        }
        Some(resolve_type_name(text, self.names, self.graph))
    }

    fn field_text(&self, node: &Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .and_then(|n| n.utf8_text(self.source).ok())
            .map(str::to_string)
    }

    fn text_at(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source
            .get(start..end)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }
}

fn is_plus(node: &Node, source: &[u8]) -> bool {
    node.child_by_field_name("operator")
        .and_then(|o| o.utf8_text(source).ok())
        == Some("+")
}

fn span_of(node: &Node) -> Span {
    Span::new(node.start_byte() as u32, node.end_byte() as u32)
}

fn unwrap_parens(node: Node<'_>) -> Node<'_> {
    let mut cur = node;
    while cur.kind() == "parenthesized_expression" {
        match first_expr_child(&cur) {
            Some(inner) => cur = inner,
            None => break,
        }
    }
    cur
}

fn first_expr_child<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| !matches!(c.kind(), "line_comment" | "block_comment"));
    found
}

fn first_child_of_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn decode_string_literal(raw: &str) -> String {
    if raw.starts_with("\"\"\"") {
        return decode_text_block(raw);
    }
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    unescape(inner)
}

/// Strips the delimiters and the incidental indentation shared by the
/// non-blank lines.
fn decode_text_block(raw: &str) -> String {
    let inner = raw
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
        .unwrap_or(raw);
    let body = match inner.split_once('\n') {
        Some((head, rest)) if head.trim().is_empty() => rest,
        _ => inner,
    };
    let indent = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let stripped: Vec<&str> = body
        .lines()
        .map(|l| if l.len() >= indent { &l[indent..] } else { "" })
        .collect();
    unescape(&stripped.join("\n"))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('s') => out.push(' '),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::parser::JavaParser;
    use crate::java::platform::seed_type_graph;

    fn lower_many(sources: &[(&str, &str)]) -> (Vec<SourceUnit>, TypeGraph) {
        let mut parser = JavaParser::new().expect("parser");
        let parsed: Vec<ParsedSource> = sources
            .iter()
            .map(|(path, text)| parser.parse(*path, *text).expect("tree"))
            .collect();
        let mut graph = TypeGraph::new();
        seed_type_graph(&mut graph);
        let regs: Vec<Registration> = parsed
            .iter()
            .map(|p| register_unit(p, &mut graph))
            .collect();
        for reg in &regs {
            for pending in &reg.pending {
                for name in &pending.supers {
                    let sup = resolve_type_name(name, &reg.names, &mut graph);
                    graph.add_super(pending.ty, sup);
                }
            }
        }
        let units = parsed
            .iter()
            .zip(&regs)
            .enumerate()
            .map(|(i, (p, reg))| lower_unit(p, UnitId(i as u32), &reg.names, &mut graph))
            .collect();
        (units, graph)
    }

    fn lower_one(text: &str) -> (SourceUnit, TypeGraph) {
        let (mut units, graph) = lower_many(&[("T.java", text)]);
        (units.remove(0), graph)
    }

    fn catch_of(unit: &SourceUnit) -> StmtId {
        let sections = unit.catch_sections();
        assert_eq!(sections.len(), 1, "expected exactly one catch");
        sections[0]
    }

    #[test]
    fn lowers_try_catch_with_log_call() {
        let (unit, graph) = lower_one(
            r#"
            package com.acme;
            import java.io.IOException;
            class Reader {
                void read() {
                    try {
                        open();
                    } catch (IOException e) {
                        log.error("read failed {}", e.getMessage());
                    }
                }
            }
            "#,
        );
        let catch_id = catch_of(&unit);
        let Stmt::Catch { caught, body, .. } = unit.stmt(catch_id) else {
            panic!("not a catch");
        };
        assert_eq!(caught.len(), 1);
        assert_eq!(graph.canonical(caught[0]), "java.io.IOException");
        let method = unit.enclosing_method_of_stmt(catch_id).expect("method");
        assert_eq!(unit.method(method).name, "read");
        let callees: Vec<&str> = unit
            .calls_in(*body)
            .into_iter()
            .map(|c| match unit.expr(c) {
                Expr::Call { callee, .. } => callee.as_str(),
                _ => "",
            })
            .collect();
        assert!(callees.contains(&"log.error"), "callees: {callees:?}");
    }

    #[test]
    fn bare_names_fall_back_to_java_lang() {
        let (unit, graph) = lower_one(
            "class T { void f() { try { g(); } catch (Exception e) {} } }",
        );
        let Stmt::Catch { caught, .. } = unit.stmt(catch_of(&unit)) else {
            panic!("not a catch");
        };
        assert_eq!(graph.canonical(caught[0]), "java.lang.Exception");
    }

    #[test]
    fn same_package_types_link_across_units() {
        let (units, graph) = lower_many(&[
            (
                "AppException.java",
                "package com.acme; public class AppException extends RuntimeException {}",
            ),
            (
                "Service.java",
                "package com.acme; class Service { void f() { try { g(); } catch (AppException e) {} } }",
            ),
        ]);
        let Stmt::Catch { caught, .. } = units[1].stmt(catch_of(&units[1])) else {
            panic!("not a catch");
        };
        assert_eq!(graph.canonical(caught[0]), "com.acme.AppException");
        assert_eq!(graph.provenance(caught[0]), Provenance::Project);
        let runtime = graph.lookup("java.lang.RuntimeException").unwrap();
        assert!(graph.is_subtype_or_same(caught[0], runtime));
    }

    #[test]
    fn multi_catch_explodes_alternatives() {
        let (unit, graph) = lower_one(
            r#"
            import java.io.IOException;
            import java.sql.SQLException;
            class T { void f() { try { g(); } catch (IOException | SQLException e) {} } }
            "#,
        );
        let Stmt::Catch { caught, param, .. } = unit.stmt(catch_of(&unit)) else {
            panic!("not a catch");
        };
        assert_eq!(caught.len(), 2);
        assert_eq!(graph.presentable(caught[0]), "IOException");
        assert_eq!(graph.presentable(caught[1]), "SQLException");
        let param = param.expect("param");
        assert_eq!(unit.var(param).name, "e");
        assert_eq!(unit.var(param).declared_type, Some(caught[0]));
    }

    #[test]
    fn concat_flattens_nested_chains() {
        let (unit, _) = lower_one(
            r#"class T { void f(int x) { String s = "a" + x + "b"; } }"#,
        );
        let concat = unit
            .exprs()
            .find_map(|(_, e)| match e {
                Expr::Concat { operands, .. } => Some(operands.clone()),
                _ => None,
            })
            .expect("concat");
        assert_eq!(concat.len(), 3);
        assert!(matches!(
            unit.expr(concat[0]),
            Expr::Literal { value: Some(v), .. } if v == "a"
        ));
        assert!(matches!(unit.expr(concat[1]), Expr::Reference { name, .. } if name == "x"));
    }

    #[test]
    fn string_literals_decode_escapes() {
        let (unit, _) = lower_one(
            r#"class T { void f() { log.error("line\nbreak \"q\""); } }"#,
        );
        let found = unit.exprs().any(|(_, e)| {
            matches!(e, Expr::Literal { value: Some(v), .. } if v == "line\nbreak \"q\"")
        });
        assert!(found);
    }

    #[test]
    fn static_initializer_catches_are_modeled() {
        let (unit, _) = lower_one(
            r#"
            class Driver {
                static {
                    try {
                        Class.forName("org.h2.Driver");
                    } catch (ClassNotFoundException e) {
                        log.error("driver missing");
                    }
                }
            }
            "#,
        );
        let catch_id = catch_of(&unit);
        let method = unit.enclosing_method_of_stmt(catch_id).expect("method");
        assert_eq!(unit.method(method).name, "<clinit>");
    }

    #[test]
    fn lambda_bodies_stay_linked_to_the_method() {
        let (unit, _) = lower_one(
            r#"
            class T {
                void schedule() {
                    Runnable r = () -> {
                        try {
                            work();
                        } catch (Exception e) {
                            log.error("task failed");
                        }
                    };
                }
            }
            "#,
        );
        let catch_id = catch_of(&unit);
        let method = unit.enclosing_method_of_stmt(catch_id).expect("method");
        assert_eq!(unit.method(method).name, "schedule");
    }

    #[test]
    fn callee_keeps_receiver_text() {
        let (unit, _) = lower_one(
            "class T { void f() { audit.logger.warn(\"x\"); sb.append(1); } }",
        );
        let callees: Vec<String> = unit
            .exprs()
            .filter_map(|(_, e)| match e {
                Expr::Call { callee, .. } => Some(callee.clone()),
                _ => None,
            })
            .collect();
        assert!(callees.contains(&"audit.logger.warn".to_string()));
        assert!(callees.contains(&"sb.append".to_string()));
    }

    #[test]
    fn try_with_resources_binds_resources() {
        let (unit, graph) = lower_one(
            r#"
            import java.io.BufferedReader;
            class T {
                void f() {
                    try (BufferedReader r = open()) {
                        r.readLine();
                    } catch (Exception e) {}
                }
            }
            "#,
        );
        let tries: Vec<StmtId> = unit
            .catch_sections()
            .iter()
            .filter_map(|&c| match unit.stmt_parent(c) {
                crate::ast::Parent::Stmt(p) => Some(p),
                _ => None,
            })
            .collect();
        let Stmt::Try { resources, .. } = unit.stmt(tries[0]) else {
            panic!("not a try");
        };
        assert_eq!(resources.len(), 1);
        let var = unit.var(resources[0]);
        assert_eq!(var.name, "r");
        assert_eq!(
            var.declared_type.map(|t| graph.canonical(t).to_string()),
            Some("java.io.BufferedReader".to_string())
        );
    }

    #[test]
    fn unescape_handles_unicode_and_unknown() {
        assert_eq!(unescape("a\\u0041b"), "aAb");
        assert_eq!(unescape(r"tail\"), "tail\\");
        assert_eq!(unescape(r"q\zq"), "qzq");
    }

    #[test]
    fn text_block_strips_incidental_indent() {
        let raw = "\"\"\"\n    order {}\n    failed\n    \"\"\"";
        assert_eq!(decode_text_block(raw), "order {}\nfailed\n");
    }
}
