//! Stack-trace argument detection over parsed sources.
//!
//! A log call carries the stack trace when one of its direct arguments
//! is a reference whose declared type sits under java.lang.Throwable.

use catchlog_core::ast::{Expr, UnitId};
use catchlog_core::{classify_callee, parse_workspace, stack_trace_logged};

const PRELUDE: &str = r#"import org.slf4j.Logger;
import org.slf4j.LoggerFactory;
import java.io.IOException;

class Sample {
    private static final Logger log = LoggerFactory.getLogger(Sample.class);

"#;

fn logged(body: &str) -> bool {
    let mut java = String::from(PRELUDE);
    java.push_str(body);
    java.push_str("}\n");
    let (ws, resolver) = parse_workspace(&[("Sample.java", &java)]).expect("source should parse");
    let unit = ws.unit(UnitId(0));
    let call = unit
        .exprs()
        .find_map(|(id, expr)| match expr {
            Expr::Call { callee, .. } if classify_callee(callee).is_some() => Some(id),
            _ => None,
        })
        .expect("sample should contain one logging call");
    stack_trace_logged(&ws, &resolver, UnitId(0), call)
}

#[test]
fn catch_parameter_argument_counts() {
    assert!(logged(
        r#"    void run() {
        try {
        } catch (IOException e) {
            log.error("boom", e);
        }
    }
"#,
    ));
}

#[test]
fn any_throwable_typed_reference_counts() {
    assert!(logged(
        r#"    void keep(Exception cause) {
        try {
        } catch (RuntimeException e) {
            log.warn("saved", cause);
        }
    }
"#,
    ));
}

#[test]
fn message_call_on_the_exception_does_not_count() {
    assert!(!logged(
        r#"    void run() {
        try {
        } catch (IOException e) {
            log.error("boom", e.getMessage());
        }
    }
"#,
    ));
}

#[test]
fn reference_nested_in_the_template_does_not_count() {
    assert!(!logged(
        r#"    void run() {
        try {
        } catch (IOException e) {
            log.error("boom: " + e);
        }
    }
"#,
    ));
}

#[test]
fn unresolvable_argument_does_not_count() {
    assert!(!logged(
        r#"    void run() {
        try {
        } catch (IOException e) {
            log.error("boom", ghost);
        }
    }
"#,
    ));
}

#[test]
fn non_throwable_argument_does_not_count() {
    assert!(!logged(
        r#"    void run(String name) {
        try {
        } catch (IOException e) {
            log.error("boom", name);
        }
    }
"#,
    ));
}
