//! End-to-end pipeline tests over an on-disk project tree.
//!
//! Each case writes a small Java project into a temp directory, runs
//! the full analysis and checks the produced records, summaries and
//! export shapes.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use catchlog_core::{
    analyze_project, write_catch_summaries, write_log_records, AnalysisOptions, AttributionTier,
    ExceptionCategory, LogLevel, Provenance, ScanConfig,
};

const ORDER_SERVICE: &str = r#"package com.shop;

import org.slf4j.Logger;
import org.slf4j.LoggerFactory;

public class OrderService {
    private static final Logger log = LoggerFactory.getLogger(OrderService.class);

    public void place(String id) {
        try {
            submit(id);
        } catch (ApiException e) {
            log.error("Failed to place order {}", id, e);
        }
    }

    void submit(String id) throws ApiException {
    }
}
"#;

const API_EXCEPTION: &str = r#"package com.shop;

public class ApiException extends Exception {
    public ApiException(String message) {
        super(message);
    }
}
"#;

const ORDER_SERVICE_TEST: &str = r#"package com.shop;

import org.slf4j.Logger;
import org.slf4j.LoggerFactory;

public class OrderServiceTest {
    private static final Logger log = LoggerFactory.getLogger(OrderServiceTest.class);

    public void checkPlace() {
        try {
            new OrderService().place("o-1");
        } catch (RuntimeException e) {
            log.error("test run failed", e);
        }
    }
}
"#;

fn write_file(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, text).expect("write source");
}

fn shop_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write_file(root, "src/main/java/com/shop/OrderService.java", ORDER_SERVICE);
    write_file(root, "src/main/java/com/shop/ApiException.java", API_EXCEPTION);
    write_file(
        root,
        "src/test/java/com/shop/OrderServiceTest.java",
        ORDER_SERVICE_TEST,
    );
    dir
}

fn options_for(dir: &TempDir) -> AnalysisOptions {
    AnalysisOptions {
        scan: ScanConfig::new(dir.path()),
        threads: None,
    }
}

#[test]
fn analyzes_a_project_end_to_end() {
    let dir = shop_project();
    let report = analyze_project(&options_for(&dir)).expect("analysis should succeed");

    assert_eq!(report.stats.files_scanned, 2, "test sources stay excluded");
    assert_eq!(report.stats.files_parsed, 2);
    assert_eq!(report.stats.parse_failures, 0);
    assert_eq!(report.stats.catch_sections, 1);
    assert_eq!(report.stats.log_calls, 1);

    let record = &report.log_records[0];
    assert!(
        record
            .log_location
            .starts_with("src/main/java/com/shop/OrderService.java:"),
        "unexpected location {}",
        record.log_location
    );
    assert_eq!(record.log_level, LogLevel::Error);
    assert_eq!(record.text_literal, "Failed to place order");
    assert_eq!(record.text_with_names, "Failed to place order id e");
    assert_eq!(record.text_with_types, "Failed to place order String ApiException");
    assert!(record.stack_trace_logged);
    assert_eq!(record.caught_exception_types, vec!["ApiException"]);
    assert_eq!(record.exception_category, ExceptionCategory::Checked);
    assert_eq!(record.exception_provenance, Provenance::Project);
    assert_eq!(record.attributed_methods, vec!["submit"]);
    assert_eq!(record.attribution_tier, AttributionTier::SingleCandidate);
    assert_eq!(record.attribution_provenance, Provenance::Project);
    assert_eq!(record.context.calls_in_try, 1);
    assert!(!record.context.catch_in_loop);

    let summary = &report.catch_summaries[0];
    assert!(summary
        .catch_location
        .starts_with("src/main/java/com/shop/OrderService.java:"));
    assert_eq!(summary.exception_type, "ApiException");
    assert!(summary.is_logged);
    assert!(summary.is_stack_trace_logged);
    assert_eq!(summary.log_num, 1);
    assert_eq!(summary.stack_trace_num, 1);
}

#[test]
fn include_tests_picks_up_test_sources() {
    let dir = shop_project();
    let mut options = options_for(&dir);
    options.scan.include_tests = true;
    let report = analyze_project(&options).expect("analysis should succeed");

    assert_eq!(report.stats.files_parsed, 3);
    assert_eq!(report.stats.log_calls, 2);
    assert_eq!(report.stats.catch_sections, 2);
}

#[test]
fn loop_context_is_recorded() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "src/RetryWorker.java",
        r#"import org.slf4j.Logger;
import org.slf4j.LoggerFactory;

public class RetryWorker {
    private static final Logger log = LoggerFactory.getLogger(RetryWorker.class);

    public void retry(int attempts) {
        for (int i = 0; i < attempts; i++) {
            try {
                poll();
            } catch (InterruptedException e) {
                log.warn("poll interrupted", e);
            }
        }
    }

    void poll() throws InterruptedException {
    }
}
"#,
    );
    let mut options = options_for(&dir);
    options.threads = Some(2);
    let report = analyze_project(&options).expect("analysis should succeed");

    assert_eq!(report.stats.log_calls, 1);
    let record = &report.log_records[0];
    assert!(record.context.catch_in_loop);
    assert!(!record.context.log_in_inner_loop);
}

#[test]
fn csv_export_writes_header_and_rows() {
    let dir = shop_project();
    let report = analyze_project(&options_for(&dir)).expect("analysis should succeed");

    let mut buf = Vec::new();
    write_log_records(&mut buf, &report.log_records).expect("log export");
    let text = String::from_utf8(buf).expect("export is utf8");
    let mut lines = text.lines();
    let header = lines.next().expect("header line");
    assert!(header.starts_with("logLocation;;;logLevel;;;"));
    assert_eq!(header.split(";;;").count(), 28);
    let row = lines.next().expect("record row");
    assert_eq!(row.split(";;;").count(), 28);
    assert!(row.contains(";;;error;;;"));
    assert!(lines.next().is_none());

    let mut buf = Vec::new();
    write_catch_summaries(&mut buf, &report.catch_summaries).expect("summary export");
    let text = String::from_utf8(buf).expect("export is utf8");
    let mut lines = text.lines();
    let header = lines.next().expect("header line");
    assert_eq!(header.split(',').count(), 6);
    let row = lines.next().expect("summary row");
    assert!(row.contains("ApiException"));
    assert!(lines.next().is_none());
}

#[test]
fn report_serializes_to_json() {
    let dir = shop_project();
    let report = analyze_project(&options_for(&dir)).expect("analysis should succeed");

    let value = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(value["log_records"][0]["logLevel"], "error");
    assert_eq!(value["log_records"][0]["attributionTier"], "single_candidate");
    assert_eq!(value["log_records"][0]["catchInLoop"], false);
    assert_eq!(value["stats"]["files_parsed"], 2);
}

#[test]
fn empty_root_produces_an_empty_report() {
    let dir = TempDir::new().expect("tempdir");
    let report = analyze_project(&options_for(&dir)).expect("analysis should succeed");

    assert_eq!(report.stats.files_scanned, 0);
    assert!(report.log_records.is_empty());
    assert!(report.catch_summaries.is_empty());
}
