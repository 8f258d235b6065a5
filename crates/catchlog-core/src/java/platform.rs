//! Seeded platform surface.
//!
//! The resolver never sees JDK or logging-facade sources, so the
//! exception hierarchy and the method signatures that matter for
//! attribution are installed up front. The tables stay deliberately
//! small: common throwables, the I/O and JDBC calls that declare them,
//! and the slf4j facade.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::types::{Provenance, TypeGraph, TypeId};

/// One method signature known without source.
#[derive(Debug, Clone)]
pub(crate) struct SeedMethod {
    pub name: &'static str,
    pub return_type: TypeId,
    pub throws: SmallVec<[TypeId; 2]>,
    pub provenance: Provenance,
}

/// Method lookup over seeded types.
#[derive(Debug, Default)]
pub(crate) struct SeedMethodIndex {
    by_type: FxHashMap<TypeId, Vec<SeedMethod>>,
}

impl SeedMethodIndex {
    pub fn methods_of(&self, ty: TypeId) -> &[SeedMethod] {
        self.by_type.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[rustfmt::skip]
const SEED_TYPES: &[(&str, &[&str], Provenance)] = &[
    // primitives and void
    ("void", &[], Provenance::Platform),
    ("boolean", &[], Provenance::Platform),
    ("byte", &[], Provenance::Platform),
    ("short", &[], Provenance::Platform),
    ("int", &[], Provenance::Platform),
    ("long", &[], Provenance::Platform),
    ("char", &[], Provenance::Platform),
    ("float", &[], Provenance::Platform),
    ("double", &[], Provenance::Platform),
    // java.lang core
    ("java.lang.Object", &[], Provenance::Platform),
    ("java.lang.String", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.CharSequence", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.StringBuilder", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.Number", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.Integer", &["java.lang.Number"], Provenance::Platform),
    ("java.lang.Long", &["java.lang.Number"], Provenance::Platform),
    ("java.lang.Boolean", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.Class", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.Thread", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.System", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.AutoCloseable", &[], Provenance::Platform),
    ("java.lang.StackTraceElement", &["java.lang.Object"], Provenance::Platform),
    // throwable hierarchy
    ("java.lang.Throwable", &["java.lang.Object"], Provenance::Platform),
    ("java.lang.Exception", &["java.lang.Throwable"], Provenance::Platform),
    ("java.lang.RuntimeException", &["java.lang.Exception"], Provenance::Platform),
    ("java.lang.Error", &["java.lang.Throwable"], Provenance::Platform),
    ("java.lang.AssertionError", &["java.lang.Error"], Provenance::Platform),
    ("java.lang.OutOfMemoryError", &["java.lang.Error"], Provenance::Platform),
    ("java.lang.StackOverflowError", &["java.lang.Error"], Provenance::Platform),
    ("java.lang.IllegalArgumentException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.NumberFormatException", &["java.lang.IllegalArgumentException"], Provenance::Platform),
    ("java.lang.IllegalStateException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.NullPointerException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.IndexOutOfBoundsException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.ArrayIndexOutOfBoundsException", &["java.lang.IndexOutOfBoundsException"], Provenance::Platform),
    ("java.lang.ArithmeticException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.ClassCastException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.UnsupportedOperationException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.SecurityException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.lang.ClassNotFoundException", &["java.lang.Exception"], Provenance::Platform),
    ("java.lang.InterruptedException", &["java.lang.Exception"], Provenance::Platform),
    ("java.lang.CloneNotSupportedException", &["java.lang.Exception"], Provenance::Platform),
    ("java.lang.ReflectiveOperationException", &["java.lang.Exception"], Provenance::Platform),
    ("java.lang.NoSuchMethodException", &["java.lang.ReflectiveOperationException"], Provenance::Platform),
    ("java.lang.IllegalAccessException", &["java.lang.ReflectiveOperationException"], Provenance::Platform),
    ("java.lang.InstantiationException", &["java.lang.ReflectiveOperationException"], Provenance::Platform),
    // java.util
    ("java.util.NoSuchElementException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.util.ConcurrentModificationException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.util.List", &["java.lang.Object"], Provenance::Platform),
    ("java.util.Map", &["java.lang.Object"], Provenance::Platform),
    ("java.util.Optional", &["java.lang.Object"], Provenance::Platform),
    ("java.util.concurrent.TimeoutException", &["java.lang.Exception"], Provenance::Platform),
    ("java.util.concurrent.ExecutionException", &["java.lang.Exception"], Provenance::Platform),
    // java.io
    ("java.io.IOException", &["java.lang.Exception"], Provenance::Platform),
    ("java.io.FileNotFoundException", &["java.io.IOException"], Provenance::Platform),
    ("java.io.EOFException", &["java.io.IOException"], Provenance::Platform),
    ("java.io.InterruptedIOException", &["java.io.IOException"], Provenance::Platform),
    ("java.io.UnsupportedEncodingException", &["java.io.IOException"], Provenance::Platform),
    ("java.io.UncheckedIOException", &["java.lang.RuntimeException"], Provenance::Platform),
    ("java.io.InputStream", &["java.lang.Object", "java.lang.AutoCloseable"], Provenance::Platform),
    ("java.io.OutputStream", &["java.lang.Object", "java.lang.AutoCloseable"], Provenance::Platform),
    ("java.io.BufferedReader", &["java.lang.Object", "java.lang.AutoCloseable"], Provenance::Platform),
    ("java.io.File", &["java.lang.Object"], Provenance::Platform),
    // java.net
    ("java.net.SocketException", &["java.io.IOException"], Provenance::Platform),
    ("java.net.ConnectException", &["java.net.SocketException"], Provenance::Platform),
    ("java.net.SocketTimeoutException", &["java.io.InterruptedIOException"], Provenance::Platform),
    ("java.net.UnknownHostException", &["java.io.IOException"], Provenance::Platform),
    ("java.net.MalformedURLException", &["java.io.IOException"], Provenance::Platform),
    ("java.net.URISyntaxException", &["java.lang.Exception"], Provenance::Platform),
    ("java.net.Socket", &["java.lang.Object", "java.lang.AutoCloseable"], Provenance::Platform),
    // java.nio.file
    ("java.nio.file.FileSystemException", &["java.io.IOException"], Provenance::Platform),
    ("java.nio.file.NoSuchFileException", &["java.nio.file.FileSystemException"], Provenance::Platform),
    ("java.nio.file.Files", &["java.lang.Object"], Provenance::Platform),
    ("java.nio.file.Path", &["java.lang.Object"], Provenance::Platform),
    // java.sql
    ("java.sql.SQLException", &["java.lang.Exception"], Provenance::Platform),
    ("java.sql.SQLTimeoutException", &["java.sql.SQLException"], Provenance::Platform),
    ("java.sql.BatchUpdateException", &["java.sql.SQLException"], Provenance::Platform),
    ("java.sql.DriverManager", &["java.lang.Object"], Provenance::Platform),
    ("java.sql.Connection", &["java.lang.AutoCloseable"], Provenance::Platform),
    ("java.sql.Statement", &["java.lang.AutoCloseable"], Provenance::Platform),
    ("java.sql.PreparedStatement", &["java.sql.Statement"], Provenance::Platform),
    ("java.sql.ResultSet", &["java.lang.AutoCloseable"], Provenance::Platform),
    // java.text
    ("java.text.ParseException", &["java.lang.Exception"], Provenance::Platform),
    // slf4j facade
    ("org.slf4j.Logger", &["java.lang.Object"], Provenance::Library),
    ("org.slf4j.LoggerFactory", &["java.lang.Object"], Provenance::Library),
];

#[rustfmt::skip]
const SEED_METHODS: &[(&str, &str, &str, &[&str])] = &[
    ("java.lang.Object", "toString", "java.lang.String", &[]),
    ("java.lang.Object", "equals", "boolean", &[]),
    ("java.lang.Object", "hashCode", "int", &[]),
    ("java.lang.Object", "getClass", "java.lang.Class", &[]),
    ("java.lang.Throwable", "getMessage", "java.lang.String", &[]),
    ("java.lang.Throwable", "getLocalizedMessage", "java.lang.String", &[]),
    ("java.lang.Throwable", "getCause", "java.lang.Throwable", &[]),
    ("java.lang.Throwable", "printStackTrace", "void", &[]),
    ("java.lang.Throwable", "getStackTrace", "java.lang.StackTraceElement[]", &[]),
    ("java.lang.Throwable", "addSuppressed", "void", &[]),
    ("java.lang.Throwable", "fillInStackTrace", "java.lang.Throwable", &[]),
    ("java.lang.String", "format", "java.lang.String", &[]),
    ("java.lang.String", "valueOf", "java.lang.String", &[]),
    ("java.lang.String", "length", "int", &[]),
    ("java.lang.String", "isEmpty", "boolean", &[]),
    ("java.lang.String", "substring", "java.lang.String", &[]),
    ("java.lang.String", "trim", "java.lang.String", &[]),
    ("java.lang.String", "contains", "boolean", &[]),
    ("java.lang.String", "getBytes", "byte[]", &[]),
    ("java.lang.StringBuilder", "append", "java.lang.StringBuilder", &[]),
    ("java.lang.StringBuilder", "toString", "java.lang.String", &[]),
    ("java.lang.Integer", "parseInt", "int", &[]),
    ("java.lang.Integer", "valueOf", "java.lang.Integer", &[]),
    ("java.lang.Long", "parseLong", "long", &[]),
    ("java.lang.Thread", "sleep", "void", &["java.lang.InterruptedException"]),
    ("java.lang.Thread", "join", "void", &["java.lang.InterruptedException"]),
    ("java.lang.Thread", "currentThread", "java.lang.Thread", &[]),
    ("java.lang.Thread", "interrupt", "void", &[]),
    ("java.lang.Thread", "start", "void", &[]),
    ("java.lang.Class", "forName", "java.lang.Class", &["java.lang.ClassNotFoundException"]),
    ("java.lang.Class", "getName", "java.lang.String", &[]),
    ("java.lang.Class", "getSimpleName", "java.lang.String", &[]),
    ("java.lang.Class", "newInstance", "java.lang.Object", &["java.lang.InstantiationException", "java.lang.IllegalAccessException"]),
    ("java.lang.System", "currentTimeMillis", "long", &[]),
    ("java.lang.System", "getProperty", "java.lang.String", &[]),
    ("java.lang.System", "getenv", "java.lang.String", &[]),
    ("java.io.InputStream", "read", "int", &["java.io.IOException"]),
    ("java.io.InputStream", "readAllBytes", "byte[]", &["java.io.IOException"]),
    ("java.io.InputStream", "available", "int", &["java.io.IOException"]),
    ("java.io.InputStream", "close", "void", &["java.io.IOException"]),
    ("java.io.OutputStream", "write", "void", &["java.io.IOException"]),
    ("java.io.OutputStream", "flush", "void", &["java.io.IOException"]),
    ("java.io.OutputStream", "close", "void", &["java.io.IOException"]),
    ("java.io.BufferedReader", "readLine", "java.lang.String", &["java.io.IOException"]),
    ("java.io.BufferedReader", "close", "void", &["java.io.IOException"]),
    ("java.nio.file.Files", "readAllBytes", "byte[]", &["java.io.IOException"]),
    ("java.nio.file.Files", "readString", "java.lang.String", &["java.io.IOException"]),
    ("java.nio.file.Files", "write", "java.nio.file.Path", &["java.io.IOException"]),
    ("java.nio.file.Files", "createDirectories", "java.nio.file.Path", &["java.io.IOException"]),
    ("java.nio.file.Files", "delete", "void", &["java.io.IOException"]),
    ("java.nio.file.Files", "newBufferedReader", "java.io.BufferedReader", &["java.io.IOException"]),
    ("java.nio.file.Files", "exists", "boolean", &[]),
    ("java.net.Socket", "connect", "void", &["java.io.IOException"]),
    ("java.net.Socket", "close", "void", &["java.io.IOException"]),
    ("java.net.Socket", "getInputStream", "java.io.InputStream", &["java.io.IOException"]),
    ("java.net.Socket", "getOutputStream", "java.io.OutputStream", &["java.io.IOException"]),
    ("java.sql.DriverManager", "getConnection", "java.sql.Connection", &["java.sql.SQLException"]),
    ("java.sql.Connection", "createStatement", "java.sql.Statement", &["java.sql.SQLException"]),
    ("java.sql.Connection", "prepareStatement", "java.sql.PreparedStatement", &["java.sql.SQLException"]),
    ("java.sql.Connection", "commit", "void", &["java.sql.SQLException"]),
    ("java.sql.Connection", "rollback", "void", &["java.sql.SQLException"]),
    ("java.sql.Connection", "close", "void", &["java.sql.SQLException"]),
    ("java.sql.Statement", "executeQuery", "java.sql.ResultSet", &["java.sql.SQLException"]),
    ("java.sql.Statement", "executeUpdate", "int", &["java.sql.SQLException"]),
    ("java.sql.Statement", "close", "void", &["java.sql.SQLException"]),
    ("java.sql.ResultSet", "next", "boolean", &["java.sql.SQLException"]),
    ("java.sql.ResultSet", "getString", "java.lang.String", &["java.sql.SQLException"]),
    ("java.sql.ResultSet", "close", "void", &["java.sql.SQLException"]),
    ("org.slf4j.LoggerFactory", "getLogger", "org.slf4j.Logger", &[]),
    ("org.slf4j.Logger", "isTraceEnabled", "boolean", &[]),
    ("org.slf4j.Logger", "isDebugEnabled", "boolean", &[]),
    ("org.slf4j.Logger", "isInfoEnabled", "boolean", &[]),
    ("org.slf4j.Logger", "isWarnEnabled", "boolean", &[]),
    ("org.slf4j.Logger", "isErrorEnabled", "boolean", &[]),
    ("org.slf4j.Logger", "trace", "void", &[]),
    ("org.slf4j.Logger", "debug", "void", &[]),
    ("org.slf4j.Logger", "info", "void", &[]),
    ("org.slf4j.Logger", "warn", "void", &[]),
    ("org.slf4j.Logger", "error", "void", &[]),
    ("org.slf4j.Logger", "getName", "java.lang.String", &[]),
];

/// Installs the platform surface into a fresh graph and returns the
/// seeded method index. Method provenance follows the owning type.
pub(crate) fn seed_type_graph(graph: &mut TypeGraph) -> SeedMethodIndex {
    for &(canonical, _, provenance) in SEED_TYPES {
        graph.intern(canonical, provenance);
    }
    for &(canonical, supers, provenance) in SEED_TYPES {
        let id = graph.intern(canonical, provenance);
        for &sup in supers {
            let sup_id = graph.intern(sup, Provenance::Platform);
            graph.add_super(id, sup_id);
        }
    }

    let mut index = SeedMethodIndex::default();
    for &(owner, name, returns, throws) in SEED_METHODS {
        let owner_id = graph.intern(owner, Provenance::Platform);
        let return_type = graph.intern(returns, Provenance::Platform);
        let throws: SmallVec<[TypeId; 2]> = throws
            .iter()
            .map(|&t| graph.intern(t, Provenance::Platform))
            .collect();
        let provenance = graph.provenance(owner_id);
        index.by_type.entry(owner_id).or_default().push(SeedMethod {
            name,
            return_type,
            throws,
            provenance,
        });
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExceptionCategory;

    #[test]
    fn throwable_hierarchy_is_connected() {
        let mut graph = TypeGraph::new();
        seed_type_graph(&mut graph);
        let fnf = graph.lookup("java.io.FileNotFoundException").unwrap();
        let io = graph.lookup("java.io.IOException").unwrap();
        let throwable = graph.lookup("java.lang.Throwable").unwrap();
        assert!(graph.is_subtype_or_same(fnf, io));
        assert!(graph.is_subtype_or_same(fnf, throwable));
        assert!(!graph.is_subtype_or_same(io, fnf));
        assert_eq!(graph.classify(io), ExceptionCategory::Checked);
        assert_eq!(
            graph.classify(graph.lookup("java.lang.NullPointerException").unwrap()),
            ExceptionCategory::Runtime
        );
    }

    #[test]
    fn slf4j_is_library_provenance() {
        let mut graph = TypeGraph::new();
        seed_type_graph(&mut graph);
        let logger = graph.lookup("org.slf4j.Logger").unwrap();
        assert_eq!(graph.provenance(logger), Provenance::Library);
        assert_eq!(graph.presentable(logger), "Logger");
    }

    #[test]
    fn seeded_methods_carry_throws() {
        let mut graph = TypeGraph::new();
        let index = seed_type_graph(&mut graph);
        let thread = graph.lookup("java.lang.Thread").unwrap();
        let sleep = index
            .methods_of(thread)
            .iter()
            .find(|m| m.name == "sleep")
            .unwrap();
        let interrupted = graph.lookup("java.lang.InterruptedException").unwrap();
        assert_eq!(sleep.throws.as_slice(), [interrupted]);
        assert_eq!(graph.canonical(sleep.return_type), "void");
    }
}
