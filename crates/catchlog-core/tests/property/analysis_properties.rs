use catchlog_core::ast::{Expr, UnitId};
use catchlog_core::{classify_callee, is_test_file, parse_workspace, sanitize_field, LogLevel};
use catchlog_core::{MessageReconstructor, Provenance, TypeGraph};
use proptest::prelude::*;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "fatal"];

fn level() -> impl Strategy<Value = (&'static str, LogLevel)> {
    prop_oneof![
        Just(("trace", LogLevel::Trace)),
        Just(("debug", LogLevel::Debug)),
        Just(("info", LogLevel::Info)),
        Just(("warn", LogLevel::Warn)),
        Just(("error", LogLevel::Error)),
        Just(("fatal", LogLevel::Fatal)),
    ]
}

fn mixed_case(word: &str, mask: u32) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask >> (i % 32) & 1 == 1 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn log_receivers_classify_in_any_case(
        prefix in "[A-Za-z0-9_]{0,8}",
        suffix in "[A-Za-z0-9_]{0,8}",
        (name, expected) in level(),
        mask in any::<u32>(),
    ) {
        let callee = format!("{prefix}log{suffix}.{}", mixed_case(name, mask));
        prop_assert_eq!(classify_callee(&callee), Some(expected));
    }

    #[test]
    fn non_severity_suffixes_never_classify(
        prefix in "[A-Za-z0-9_]{0,8}",
        method in "[a-z]{1,10}",
    ) {
        prop_assume!(!LEVELS.contains(&method.as_str()));
        let callee = format!("{prefix}log.{method}");
        prop_assert_eq!(classify_callee(&callee), None);
    }

    #[test]
    fn sanitized_fields_are_single_line(s in ".*") {
        let clean = sanitize_field(&s);
        prop_assert!(!clean.contains('\n'));
        prop_assert!(!clean.contains('\r'));
    }

    #[test]
    fn sanitize_without_line_breaks_is_identity(s in "[^\r\n]*") {
        prop_assert_eq!(sanitize_field(&s), s);
    }

    #[test]
    fn substitution_consumes_placeholders_then_appends(
        segs in prop::collection::vec("[a-z ]{0,6}", 2..5),
        extra in 0usize..3,
    ) {
        let placeholders = segs.len() - 1;
        let arg_count = placeholders + extra;
        let template = segs.join("{}");
        let params = (0..arg_count)
            .map(|i| format!("int a{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let args = (0..arg_count).map(|i| format!(", a{i}")).collect::<String>();
        let java = format!(
            r#"import org.slf4j.Logger;
import org.slf4j.LoggerFactory;

class Sample {{
    private static final Logger log = LoggerFactory.getLogger(Sample.class);

    void run({params}) {{
        try {{
        }} catch (RuntimeException e) {{
            log.error("{template}"{args});
        }}
    }}
}}
"#
        );
        let (ws, resolver) =
            parse_workspace(&[("Sample.java", &java)]).expect("generated source parses");
        let unit = ws.unit(UnitId(0));
        let call = unit
            .exprs()
            .find_map(|(id, expr)| match expr {
                Expr::Call { callee, .. } if classify_callee(callee).is_some() => Some(id),
                _ => None,
            })
            .expect("generated source has one log call");
        let msg = MessageReconstructor::new(&ws, &resolver).reconstruct(UnitId(0), call);

        let mut expected = String::new();
        for (i, seg) in segs.iter().enumerate() {
            expected.push_str(seg);
            if i < placeholders {
                expected.push_str(&format!("a{i}"));
            }
        }
        for k in placeholders..arg_count {
            expected.push(' ');
            expected.push_str(&format!("a{k}"));
        }
        prop_assert_eq!(msg.with_names, expected);
    }

    #[test]
    fn supertype_chains_are_transitive(
        names in prop::collection::vec("[a-z]{1,6}", 2..8),
    ) {
        let mut graph = TypeGraph::new();
        let ids: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, n)| graph.intern(&format!("t{i}.{n}"), Provenance::Unknown))
            .collect();
        for pair in ids.windows(2) {
            graph.add_super(pair[0], pair[1]);
        }
        let first = ids[0];
        let last = *ids.last().unwrap();
        prop_assert!(graph.is_subtype_or_same(first, first));
        prop_assert!(graph.is_subtype_or_same(first, last));
        prop_assert!(!graph.is_subtype_or_same(last, first));
    }

    #[test]
    fn cyclic_super_edges_terminate(count in 2usize..6) {
        let mut graph = TypeGraph::new();
        let ids: Vec<_> = (0..count)
            .map(|i| graph.intern(&format!("cycle.T{i}"), Provenance::Unknown))
            .collect();
        for pair in ids.windows(2) {
            graph.add_super(pair[0], pair[1]);
        }
        graph.add_super(*ids.last().unwrap(), ids[0]);
        for &a in &ids {
            for &b in &ids {
                prop_assert!(graph.is_subtype_or_same(a, b));
            }
        }
    }

    #[test]
    fn test_file_detection_is_name_based(
        stem in "[A-Z][A-Za-z0-9]{0,10}",
        dirs in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        let test_name = format!("{path}{stem}Test.java");
        prop_assert!(is_test_file(&test_name));
        if !stem.ends_with("Test") {
            let plain_name = format!("{path}{stem}.java");
            prop_assert!(!is_test_file(&plain_name));
        }
    }
}
