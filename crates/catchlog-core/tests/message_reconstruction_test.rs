//! End-to-end message reconstruction over parsed Java sources.
//!
//! Each case builds a one-class project, locates its logging call and
//! checks the three reconstructed text variants against the template
//! and argument semantics.

use catchlog_core::ast::{Expr, UnitId};
use catchlog_core::{classify_callee, parse_workspace, LogMessage, MessageReconstructor};

const PRELUDE: &str = r#"import org.slf4j.Logger;
import org.slf4j.LoggerFactory;
import java.io.IOException;
import java.nio.file.Files;
import java.nio.file.Path;
import java.sql.SQLException;

class Sample {
    private static final Logger log = LoggerFactory.getLogger(Sample.class);

"#;

fn sample(body: &str) -> String {
    let mut java = String::from(PRELUDE);
    java.push_str(body);
    java.push_str("}\n");
    java
}

fn reconstruct(body: &str) -> LogMessage {
    let java = sample(body);
    let (ws, resolver) = parse_workspace(&[("Sample.java", &java)]).expect("source should parse");
    let unit = ws.unit(UnitId(0));
    let call = unit
        .exprs()
        .find_map(|(id, expr)| match expr {
            Expr::Call { callee, .. } if classify_callee(callee).is_some() => Some(id),
            _ => None,
        })
        .expect("sample should contain one logging call");
    MessageReconstructor::new(&ws, &resolver).reconstruct(UnitId(0), call)
}

#[test]
fn placeholder_takes_the_name_and_type_of_its_argument() {
    let msg = reconstruct(
        r#"    void load(String path) {
        try {
            Files.readString(Path.of(path));
        } catch (IOException e) {
            log.error("Failed to read {}", path, e);
        }
    }
"#,
    );
    assert_eq!(msg.literal, "Failed to read");
    assert_eq!(msg.with_names, "Failed to read path e");
    assert_eq!(msg.with_types, "Failed to read String IOException");
}

#[test]
fn single_reference_placeholder_renders_name_and_type() {
    let msg = reconstruct(
        r#"    void copy(Path src) {
        try {
            Files.readString(src);
        } catch (IOException ex) {
            log.error("Failed: {}", ex);
        }
    }
"#,
    );
    assert_eq!(msg.literal, "Failed:");
    assert_eq!(msg.with_names, "Failed: ex");
    assert_eq!(msg.with_types, "Failed: IOException");
}

#[test]
fn bare_template_is_identical_across_variants() {
    let msg = reconstruct(
        r#"    void halt() {
        try {
        } catch (RuntimeException e) {
            log.error("Error");
        }
    }
"#,
    );
    assert_eq!(msg.literal, "Error");
    assert_eq!(msg.with_names, "Error");
    assert_eq!(msg.with_types, "Error");
}

#[test]
fn concatenated_template_renders_calls_by_name_and_return_type() {
    let msg = reconstruct(
        r#"    String sql() {
        return "select 1";
    }

    void query() {
        try {
            run();
        } catch (SQLException e) {
            log.warn("query " + sql() + " failed: " + e.getMessage());
        }
    }

    void run() throws SQLException {
    }
"#,
    );
    assert_eq!(msg.literal, "query  failed: ", "non-literal parts leave gaps");
    assert_eq!(msg.with_names, "query sql failed: getMessage");
    assert_eq!(msg.with_types, "query String failed: String");
}

#[test]
fn unresolved_reference_degrades_to_a_sentinel() {
    let msg = reconstruct(
        r#"    void report() {
        try {
        } catch (RuntimeException e) {
            log.error("got {}", mystery);
        }
    }
"#,
    );
    assert_eq!(msg.literal, "got");
    assert_eq!(msg.with_names, "got mystery");
    assert_eq!(msg.with_types, "got UnresolvableVariable");
}

#[test]
fn var_declared_local_has_no_recoverable_type() {
    let msg = reconstruct(
        r#"    void track() {
        var order = nextOrder();
        try {
            submit(order);
        } catch (RuntimeException e) {
            log.warn("bad {}", order);
        }
    }
"#,
    );
    assert_eq!(msg.with_names, "bad order");
    assert_eq!(msg.with_types, "bad UnresolvableVariableNoType");
}

#[test]
fn class_reference_argument_is_not_a_variable() {
    let msg = reconstruct(
        r#"    void describe() {
        try {
        } catch (RuntimeException e) {
            log.info("using {}", Files);
        }
    }
"#,
    );
    assert_eq!(msg.with_names, "using Files");
    assert_eq!(msg.with_types, "using NotAVariable");
}

#[test]
fn unresolved_call_argument_degrades_to_a_sentinel() {
    let msg = reconstruct(
        r#"    void sync() {
        try {
        } catch (RuntimeException e) {
            log.error("failed {}", helper());
        }
    }
"#,
    );
    assert_eq!(msg.with_names, "failed helper");
    assert_eq!(msg.with_types, "failed UnresolvableMethodCall");
}

#[test]
fn template_without_placeholders_ignores_extra_arguments() {
    let msg = reconstruct(
        r#"    void watch() {
        try {
        } catch (IOException e) {
            log.error("connection lost", e);
        }
    }
"#,
    );
    assert_eq!(msg.literal, "connection lost");
    assert_eq!(msg.with_names, "connection lost");
    assert_eq!(msg.with_types, "connection lost");
}

#[test]
fn constructor_argument_keeps_its_raw_source_text() {
    let msg = reconstruct(
        r#"    void reject(String id) {
        try {
        } catch (RuntimeException e) {
            log.warn("rejecting {}", new Order(id));
        }
    }
"#,
    );
    assert_eq!(msg.with_names, "rejecting new Order(id)");
    assert_eq!(msg.with_types, "rejecting new Order(id)");
}

#[test]
fn constructor_inside_the_template_contributes_nothing() {
    let msg = reconstruct(
        r#"    void mark() {
        try {
        } catch (RuntimeException e) {
            log.error("pre " + new Marker() + " post");
        }
    }
"#,
    );
    assert_eq!(msg.literal, "pre  post");
    assert_eq!(msg.with_names, "pre  post");
    assert_eq!(msg.with_types, "pre  post");
}

#[test]
fn excess_placeholders_survive_substitution() {
    let msg = reconstruct(
        r#"    void count(int x) {
        try {
        } catch (RuntimeException e) {
            log.error("a {} b {}", x);
        }
    }
"#,
    );
    assert_eq!(msg.literal, "a b");
    assert_eq!(msg.with_names, "a x b {}");
    assert_eq!(msg.with_types, "a int b {}");
}

#[test]
fn unmodeled_argument_shapes_fall_back_to_raw_text() {
    let msg = reconstruct(
        r#"    void mode(boolean flag) {
        try {
        } catch (RuntimeException e) {
            log.info("mode {}", flag ? "fast" : "slow");
        }
    }
"#,
    );
    assert_eq!(msg.with_names, r#"mode flag ? "fast" : "slow""#);
}
