//! Log message reconstruction.
//!
//! A logging call's first argument is its template; the rest are
//! substitution arguments. The template renders in three variants:
//! literal skeleton only, with argument names substituted into `{}`
//! placeholders, and with argument types substituted instead. Failed
//! resolution degrades to sentinel text, never to an error.

use crate::ast::{Expr, ExprId, SourceUnit, UnitId};
use crate::resolve::{Decl, Resolver};
use crate::workspace::Workspace;

/// Sentinel for a reference that does not resolve.
pub const UNRESOLVABLE_VARIABLE: &str = "UnresolvableVariable";
/// Sentinel for a reference that resolves to a variable without a
/// recoverable declared type.
pub const UNRESOLVABLE_VARIABLE_NO_TYPE: &str = "UnresolvableVariableNoType";
/// Sentinel for a reference that resolves to something other than a
/// variable.
pub const NOT_A_VARIABLE: &str = "NotAVariable";
/// Sentinel for a call whose target does not resolve.
pub const UNRESOLVABLE_METHOD_CALL: &str = "UnresolvableMethodCall";

const PLACEHOLDER: &str = "{}";

/// The three reconstructed texts of one logging call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMessage {
    pub literal: String,
    pub with_names: String,
    pub with_types: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Render {
    Literal,
    Names,
    Types,
}

/// Rebuilds log message text from a call's argument list.
pub struct MessageReconstructor<'a> {
    ws: &'a Workspace,
    resolver: &'a dyn Resolver,
}

impl<'a> MessageReconstructor<'a> {
    pub fn new(ws: &'a Workspace, resolver: &'a dyn Resolver) -> Self {
        Self { ws, resolver }
    }

    /// Reconstructs all three variants for a logging call. A call with
    /// no arguments yields empty texts.
    pub fn reconstruct(&self, unit_id: UnitId, call: ExprId) -> LogMessage {
        let unit = self.ws.unit(unit_id);
        let Expr::Call { args, .. } = unit.expr(call) else {
            return LogMessage::default();
        };
        let Some(&template) = args.first() else {
            return LogMessage::default();
        };
        let sub_args = &args[1..];

        let literal_raw = self.render_template(unit, unit_id, template, Render::Literal);
        let names_raw = self.render_template(unit, unit_id, template, Render::Names);
        let types_raw = self.render_template(unit, unit_id, template, Render::Types);

        let literal = if sub_args.is_empty() {
            literal_raw
        } else {
            strip_placeholders(&literal_raw)
        };
        let name_vars: Vec<String> = sub_args
            .iter()
            .map(|&a| self.render_arg(unit, unit_id, a, Render::Names))
            .collect();
        let type_vars: Vec<String> = sub_args
            .iter()
            .map(|&a| self.render_arg(unit, unit_id, a, Render::Types))
            .collect();

        LogMessage {
            literal,
            with_names: substitute(&names_raw, &name_vars),
            with_types: substitute(&types_raw, &type_vars),
        }
    }

    /// Renders the template expression. Literals contribute their
    /// decoded value, concatenations recurse, references and calls
    /// contribute per mode, and any other shape contributes nothing.
    fn render_template(
        &self,
        unit: &SourceUnit,
        unit_id: UnitId,
        expr: ExprId,
        mode: Render,
    ) -> String {
        match unit.expr(expr) {
            Expr::Literal { value, span } => value
                .clone()
                .unwrap_or_else(|| unit.text_of(*span).to_string()),
            Expr::Concat { operands, .. } => operands
                .iter()
                .map(|&op| self.render_template(unit, unit_id, op, mode))
                .collect(),
            Expr::Reference { name, .. } => match mode {
                Render::Literal => String::new(),
                Render::Names => name.clone(),
                Render::Types => self.reference_type_text(unit_id, expr),
            },
            Expr::Call { name, .. } => match mode {
                Render::Literal => String::new(),
                Render::Names => name.clone(),
                Render::Types => self.call_return_type_text(unit_id, expr),
            },
            Expr::New { .. } | Expr::Opaque { .. } => String::new(),
        }
    }

    /// Renders one substitution argument. Unlike template parts, an
    /// argument of an unmodeled shape falls back to its raw source
    /// text instead of vanishing.
    fn render_arg(&self, unit: &SourceUnit, unit_id: UnitId, expr: ExprId, mode: Render) -> String {
        match unit.expr(expr) {
            Expr::Literal { value, span } => value
                .clone()
                .unwrap_or_else(|| unit.text_of(*span).to_string()),
            Expr::Reference { name, .. } => match mode {
                Render::Types => self.reference_type_text(unit_id, expr),
                _ => name.clone(),
            },
            Expr::Call { name, .. } => match mode {
                Render::Types => self.call_return_type_text(unit_id, expr),
                _ => name.clone(),
            },
            Expr::Concat { operands, .. } => operands
                .iter()
                .map(|&op| self.render_arg(unit, unit_id, op, mode))
                .collect(),
            Expr::New { span, .. } | Expr::Opaque { span, .. } => {
                unit.text_of(*span).to_string()
            }
        }
    }

    fn reference_type_text(&self, unit_id: UnitId, expr: ExprId) -> String {
        match self.resolver.resolve_reference(self.ws, unit_id, expr) {
            None => UNRESOLVABLE_VARIABLE.to_string(),
            Some(Decl::Variable(sig)) => match sig.declared_type {
                Some(ty) => self.ws.types.presentable(ty).to_string(),
                None => UNRESOLVABLE_VARIABLE_NO_TYPE.to_string(),
            },
            Some(_) => NOT_A_VARIABLE.to_string(),
        }
    }

    fn call_return_type_text(&self, unit_id: UnitId, expr: ExprId) -> String {
        match self
            .resolver
            .resolve_callee(self.ws, unit_id, expr)
            .and_then(|sig| sig.return_type)
        {
            Some(ty) => self.ws.types.presentable(ty).to_string(),
            None => UNRESOLVABLE_METHOD_CALL.to_string(),
        }
    }
}

/// Removes every `{}` placeholder from a template, eating one leading
/// space with it when present. Space-prefixed occurrences go first so
/// `"a {}"` becomes `"a"`, not `"a "`.
fn strip_placeholders(template: &str) -> String {
    template.replace(" {}", "").replace(PLACEHOLDER, "")
}

/// Substitutes `vars` into successive `{}` placeholders left to right.
///
/// Excess placeholders stay in the text verbatim; excess vars are
/// appended at the end, each preceded by a single space. A template
/// with no placeholder at all is returned unchanged even when vars
/// exist.
fn substitute(template: &str, vars: &[String]) -> String {
    if vars.is_empty() || !template.contains(PLACEHOLDER) {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = 0;
    while next < vars.len() {
        match rest.find(PLACEHOLDER) {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(&vars[next]);
                rest = &rest[pos + PLACEHOLDER.len()..];
                next += 1;
            }
            None => break,
        }
    }
    out.push_str(rest);
    for var in &vars[next..] {
        out.push(' ');
        out.push_str(var);
    }
    out
}
