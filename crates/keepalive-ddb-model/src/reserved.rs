//! The DynamoDB reserved-word set.
//!
//! Attribute names matching any of these words (case-insensitively) cannot be
//! referenced directly in an expression; the service rejects such requests
//! with a `ValidationException`. The list is kept sorted so lookups can use a
//! binary search.

/// Message prefix shared by every component that rejects a reserved name.
pub const RESERVED_KEYWORD_MESSAGE: &str =
    "Invalid expression: Attribute name is a reserved keyword; reserved keyword:";

/// Reserved words, lowercase and sorted.
pub const RESERVED_WORDS: &[&str] = &[
    "abort", "absolute", "action", "add", "after", "agent", "aggregate", "all", "allocate",
    "alter", "analyze", "and", "any", "archive", "are", "array", "as", "asc", "ascii",
    "asensitive", "assertion", "asymmetric", "at", "atomic", "attach", "attribute", "auth",
    "authorization", "authorize", "auto", "avg", "back", "backup", "base", "batch", "before",
    "begin", "between", "bigint", "binary", "bit", "blob", "block", "boolean", "both",
    "breadth", "bucket", "bulk", "by", "byte", "call", "called", "calling", "capacity",
    "cascade", "cascaded", "case", "cast", "catalog", "char", "character", "check", "class",
    "clob", "close", "cluster", "clustered", "clustering", "clusters", "coalesce", "collate",
    "collation", "collection", "column", "columns", "combine", "comment", "commit", "compact",
    "compile", "compress", "condition", "conflict", "connect", "connection", "consistency",
    "consistent", "constraint", "constraints", "constructor", "consumed", "continue",
    "convert", "copy", "corresponding", "count", "counter", "create", "cross", "cube",
    "current", "cursor", "cycle", "data", "database", "date", "datetime", "day", "deallocate",
    "dec", "decimal", "declare", "default", "deferrable", "deferred", "define", "defined",
    "definition", "delete", "delimited", "depth", "deref", "desc", "describe", "descriptor",
    "detach", "deterministic", "diagnostics", "directories", "disable", "disconnect",
    "distinct", "distribute", "do", "domain", "double", "drop", "dump", "duration", "dynamic",
    "each", "element", "else", "elseif", "empty", "enable", "end", "equal", "equals", "error",
    "escape", "escaped", "eval", "evaluate", "exceeded", "except", "exception", "exceptions",
    "exclusive", "exec", "execute", "exists", "exit", "explain", "explode", "export",
    "expression", "extended", "external", "extract", "fail", "false", "family", "fetch",
    "fields", "file", "filter", "filtering", "final", "finish", "first", "fixed", "flattern",
    "float", "for", "force", "foreign", "format", "forward", "found", "free", "from", "full",
    "function", "functions", "general", "generate", "get", "glob", "global", "go", "goto",
    "grant", "greater", "group", "grouping", "handler", "hash", "have", "having", "heap",
    "hidden", "hold", "hour", "identified", "identity", "if", "ignore", "immediate", "import",
    "in", "including", "inclusive", "increment", "incremental", "index", "indexed", "indexes",
    "indicator", "infinite", "initially", "inline", "inner", "innter", "inout", "input",
    "insensitive", "insert", "instead", "int", "integer", "intersect", "interval", "into",
    "invalidate", "is", "isolation", "item", "items", "iterate", "join", "key", "keys", "lag",
    "language", "large", "last", "lateral", "lead", "leading", "leave", "left", "length",
    "less", "level", "like", "limit", "limited", "lines", "list", "load", "local", "localtime",
    "localtimestamp", "location", "locator", "lock", "locks", "log", "loged", "long", "loop",
    "lower", "map", "match", "materialized", "max", "maxlen", "member", "merge", "method",
    "metrics", "min", "minus", "minute", "missing", "mod", "mode", "modifies", "modify",
    "module", "month", "multi", "multiset", "name", "names", "national", "natural", "nchar",
    "nclob", "new", "next", "no", "none", "not", "null", "nullif", "number", "numeric",
    "object", "of", "offline", "offset", "old", "on", "online", "only", "opaque", "open",
    "operator", "option", "or", "order", "ordinality", "other", "others", "out", "outer",
    "output", "over", "overlaps", "override", "owner", "pad", "parallel", "parameter",
    "parameters", "partial", "partition", "partitioned", "partitions", "path", "percent",
    "percentile", "permission", "permissions", "pipe", "pipelined", "plan", "pool", "position",
    "precision", "prepare", "preserve", "primary", "prior", "private", "privileges",
    "procedure", "processed", "project", "projection", "property", "provisioning", "public",
    "put", "query", "quit", "quorum", "raise", "random", "range", "rank", "raw", "read",
    "reads", "real", "rebuild", "record", "recursive", "reduce", "ref", "reference",
    "references", "referencing", "regexp", "region", "reindex", "relative", "release",
    "remainder", "rename", "repeat", "replace", "request", "reset", "resignal", "resource",
    "response", "restore", "restrict", "result", "return", "returning", "returns", "reverse",
    "revoke", "right", "role", "roles", "rollback", "rollup", "routine", "row", "rows", "rule",
    "rules", "sample", "satisfies", "save", "savepoint", "scan", "schema", "scope", "scroll",
    "search", "second", "section", "segment", "segments", "select", "self", "semi",
    "sensitive", "separate", "sequence", "serializable", "session", "set", "sets", "shard",
    "share", "shared", "short", "show", "signal", "similar", "size", "skewed", "smallint",
    "snapshot", "some", "source", "space", "spaces", "sparse", "specific", "specifictype",
    "split", "sql", "sqlcode", "sqlerror", "sqlexception", "sqlstate", "sqlwarning", "start",
    "state", "static", "status", "storage", "store", "stored", "stream", "string", "struct",
    "style", "sub", "submultiset", "subpartition", "substring", "subtype", "sum", "super",
    "symmetric", "synonym", "system", "table", "tablesample", "temp", "temporary",
    "terminated", "text", "than", "then", "throughput", "time", "timestamp", "timezone",
    "tinyint", "to", "token", "total", "touch", "trailing", "transaction", "transform",
    "translate", "translation", "treat", "trigger", "trim", "true", "truncate", "ttl", "tuple",
    "type", "under", "undo", "union", "unique", "unit", "unknown", "unlogged", "unnest",
    "unprocessed", "unsigned", "until", "update", "upper", "url", "usage", "use", "user",
    "users", "using", "uuid", "vacuum", "value", "valued", "values", "varchar", "variable",
    "variance", "varint", "varying", "view", "views", "virtual", "void", "wait", "when",
    "whenever", "where", "while", "window", "with", "within", "without", "work", "wrapped",
    "write", "year", "zone",
];

/// Returns `true` if `name` is a reserved word, ignoring ASCII case.
#[must_use]
pub fn is_reserved_word(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Expression keywords that may appear unquoted without naming an attribute.
pub const EXPRESSION_KEYWORDS: &[&str] = &[
    "add", "and", "between", "delete", "in", "not", "or", "remove", "set",
];

/// Expression function names, lowercase and sorted.
pub const FUNCTION_NAMES: &[&str] = &[
    "attribute_exists", "attribute_not_exists", "attribute_type", "begins_with", "contains",
    "if_not_exists", "list_append", "size",
];

/// Returns `true` if `word` is an expression keyword or function name,
/// ignoring ASCII case.
#[must_use]
pub fn is_expression_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    EXPRESSION_KEYWORDS.binary_search(&lower.as_str()).is_ok()
        || FUNCTION_NAMES.binary_search(&lower.as_str()).is_ok()
}

/// Returns `true` if `name` is a bare attribute identifier:
/// `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Formats the validation message for a reserved attribute name.
#[must_use]
pub fn reserved_keyword_message(name: &str) -> String {
    format!("{RESERVED_KEYWORD_MESSAGE} {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_keep_word_list_sorted_and_unique() {
        assert!(RESERVED_WORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_should_match_reserved_words_case_insensitively() {
        assert!(is_reserved_word("name"));
        assert!(is_reserved_word("Name"));
        assert!(is_reserved_word("STATUS"));
        assert!(is_reserved_word("ttl"));
    }

    #[test]
    fn test_should_accept_ordinary_attribute_names() {
        assert!(!is_reserved_word("sessionId"));
        assert!(!is_reserved_word("expireTime"));
        assert!(!is_reserved_word("version"));
        assert!(!is_reserved_word("attribute_exists"));
    }

    #[test]
    fn test_should_keep_expression_words_sorted() {
        assert!(EXPRESSION_KEYWORDS.windows(2).all(|w| w[0] < w[1]));
        assert!(FUNCTION_NAMES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_should_recognise_expression_words() {
        assert!(is_expression_word("begins_with"));
        assert!(is_expression_word("Contains"));
        assert!(is_expression_word("REMOVE"));
        assert!(!is_expression_word("expireTime"));
    }

    #[test]
    fn test_should_accept_only_bare_identifiers() {
        assert!(is_identifier("sessionId"));
        assert!(is_identifier("_ttl2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("expire-time"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("list[0]"));
    }

    #[test]
    fn test_should_format_reserved_keyword_message() {
        assert_eq!(
            reserved_keyword_message("status"),
            "Invalid expression: Attribute name is a reserved keyword; reserved keyword: status"
        );
    }
}
