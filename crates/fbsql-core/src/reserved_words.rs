//! Reserved-word tables
//!
//! A reserved word is a keyword that cannot be used unquoted as an identifier.
//! The tokenizer consults a `ReservedWords` table to decide whether a bare word
//! is a `ReservedWord` token or a generic token.
//!
//! Tables are immutable once built and share their storage, so a single table
//! can be handed to any number of tokenizers (including across threads).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Keywords the DML statement detector depends on.
///
/// Every preset includes these, even where the Firebird grammar treats them as
/// non-reserved (for example `RETURNING`).
const STATEMENT_KEYWORDS: &[&str] = &[
    "AS",
    "DELETE",
    "FROM",
    "INSERT",
    "INTO",
    "MERGE",
    "OR",
    "RETURNING",
    "SET",
    "UPDATE",
];

const FIREBIRD_3_0_WORDS: &[&str] = &[
    "ADD",
    "ADMIN",
    "ALL",
    "ALTER",
    "AND",
    "ANY",
    "AS",
    "AT",
    "AVG",
    "BEGIN",
    "BETWEEN",
    "BIGINT",
    "BIT_LENGTH",
    "BLOB",
    "BOOLEAN",
    "BOTH",
    "BY",
    "CASE",
    "CAST",
    "CHAR",
    "CHAR_LENGTH",
    "CHARACTER",
    "CHARACTER_LENGTH",
    "CHECK",
    "CLOSE",
    "COLLATE",
    "COLUMN",
    "COMMIT",
    "CONNECT",
    "CONSTRAINT",
    "CORR",
    "COUNT",
    "COVAR_POP",
    "COVAR_SAMP",
    "CREATE",
    "CROSS",
    "CURRENT",
    "CURRENT_CONNECTION",
    "CURRENT_DATE",
    "CURRENT_ROLE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_TRANSACTION",
    "CURRENT_USER",
    "CURSOR",
    "DATE",
    "DAY",
    "DEC",
    "DECIMAL",
    "DECLARE",
    "DEFAULT",
    "DELETE",
    "DELETING",
    "DETERMINISTIC",
    "DISCONNECT",
    "DISTINCT",
    "DOUBLE",
    "DROP",
    "ELSE",
    "END",
    "ESCAPE",
    "EXECUTE",
    "EXISTS",
    "EXTERNAL",
    "EXTRACT",
    "FALSE",
    "FETCH",
    "FILTER",
    "FLOAT",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "FUNCTION",
    "GDSCODE",
    "GLOBAL",
    "GRANT",
    "GROUP",
    "HAVING",
    "HOUR",
    "IN",
    "INDEX",
    "INNER",
    "INSENSITIVE",
    "INSERT",
    "INSERTING",
    "INT",
    "INTEGER",
    "INTO",
    "IS",
    "JOIN",
    "LEADING",
    "LEFT",
    "LIKE",
    "LONG",
    "LOWER",
    "MAX",
    "MERGE",
    "MIN",
    "MINUTE",
    "MONTH",
    "NATIONAL",
    "NATURAL",
    "NCHAR",
    "NO",
    "NOT",
    "NULL",
    "NUMERIC",
    "OCTET_LENGTH",
    "OF",
    "OFFSET",
    "ON",
    "ONLY",
    "OPEN",
    "OR",
    "ORDER",
    "OUTER",
    "OVER",
    "PARAMETER",
    "PLAN",
    "POSITION",
    "POST_EVENT",
    "PRECISION",
    "PRIMARY",
    "PROCEDURE",
    "RDB$DB_KEY",
    "RDB$RECORD_VERSION",
    "REAL",
    "RECORD_VERSION",
    "RECREATE",
    "RECURSIVE",
    "REFERENCES",
    "REGR_AVGX",
    "REGR_AVGY",
    "REGR_COUNT",
    "REGR_INTERCEPT",
    "REGR_R2",
    "REGR_SLOPE",
    "REGR_SXX",
    "REGR_SXY",
    "REGR_SYY",
    "RELEASE",
    "RETURN",
    "RETURNING_VALUES",
    "RETURNS",
    "REVOKE",
    "RIGHT",
    "ROLLBACK",
    "ROW",
    "ROW_COUNT",
    "ROWS",
    "SAVEPOINT",
    "SCROLL",
    "SECOND",
    "SELECT",
    "SENSITIVE",
    "SET",
    "SIMILAR",
    "SMALLINT",
    "SOME",
    "SQLCODE",
    "SQLSTATE",
    "START",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "SUM",
    "TABLE",
    "THEN",
    "TIME",
    "TIMESTAMP",
    "TO",
    "TRAILING",
    "TRIGGER",
    "TRIM",
    "TRUE",
    "UNION",
    "UNIQUE",
    "UNKNOWN",
    "UPDATE",
    "UPDATING",
    "UPPER",
    "USER",
    "USING",
    "VALUE",
    "VALUES",
    "VAR_POP",
    "VAR_SAMP",
    "VARCHAR",
    "VARIABLE",
    "VARYING",
    "VIEW",
    "WHEN",
    "WHERE",
    "WHILE",
    "WITH",
    "YEAR",
];

/// Words reserved from Firebird 4.0 onwards, on top of the 3.0 list.
const FIREBIRD_4_0_ADDITIONS: &[&str] = &[
    "BINARY",
    "DECFLOAT",
    "INT128",
    "LATERAL",
    "LOCAL",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "PUBLICATION",
    "RESETTING",
    "TIMEZONE_HOUR",
    "TIMEZONE_MINUTE",
    "UNBOUNDED",
    "VARBINARY",
    "WINDOW",
    "WITHOUT",
];

static MINIMAL: LazyLock<ReservedWords> =
    LazyLock::new(|| ReservedWords::new(STATEMENT_KEYWORDS.iter().copied()));

static FIREBIRD_3_0: LazyLock<ReservedWords> = LazyLock::new(|| {
    ReservedWords::new(
        FIREBIRD_3_0_WORDS
            .iter()
            .chain(STATEMENT_KEYWORDS)
            .copied(),
    )
});

static FIREBIRD_4_0: LazyLock<ReservedWords> = LazyLock::new(|| {
    ReservedWords::new(
        FIREBIRD_3_0_WORDS
            .iter()
            .chain(FIREBIRD_4_0_ADDITIONS)
            .chain(STATEMENT_KEYWORDS)
            .copied(),
    )
});

/// Named reserved-word tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReservedWordsPreset {
    /// Only the keywords needed to classify DML statements
    #[serde(rename = "minimal")]
    Minimal,
    /// Firebird 3.0 reserved words
    #[serde(rename = "firebird-3.0")]
    Firebird30,
    /// Firebird 4.0 reserved words
    #[serde(rename = "firebird-4.0")]
    Firebird40,
    /// Firebird 5.0 reserved words (no additions over 4.0)
    #[default]
    #[serde(rename = "firebird-5.0")]
    Firebird50,
}

impl ReservedWordsPreset {
    /// All presets, oldest first
    pub const ALL: [ReservedWordsPreset; 4] = [
        ReservedWordsPreset::Minimal,
        ReservedWordsPreset::Firebird30,
        ReservedWordsPreset::Firebird40,
        ReservedWordsPreset::Firebird50,
    ];

    /// The configuration name of this preset
    pub fn name(&self) -> &'static str {
        match self {
            ReservedWordsPreset::Minimal => "minimal",
            ReservedWordsPreset::Firebird30 => "firebird-3.0",
            ReservedWordsPreset::Firebird40 => "firebird-4.0",
            ReservedWordsPreset::Firebird50 => "firebird-5.0",
        }
    }
}

impl fmt::Display for ReservedWordsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive, immutable set of reserved words.
///
/// Cloning is cheap: clones share the same underlying table.
#[derive(Debug, Clone)]
pub struct ReservedWords {
    /// Upper-cased words
    words: Arc<HashSet<String>>,
    /// Length of the longest word, used to reject long probes without allocating
    max_len: usize,
}

impl ReservedWords {
    /// Build a table from arbitrary words. Words are matched case-insensitively.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_ascii_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        let max_len = words.iter().map(String::len).max().unwrap_or(0);
        Self {
            words: Arc::new(words),
            max_len,
        }
    }

    /// Get the shared table for a preset
    pub fn preset(preset: ReservedWordsPreset) -> Self {
        match preset {
            ReservedWordsPreset::Minimal => MINIMAL.clone(),
            ReservedWordsPreset::Firebird30 => FIREBIRD_3_0.clone(),
            ReservedWordsPreset::Firebird40 | ReservedWordsPreset::Firebird50 => {
                FIREBIRD_4_0.clone()
            }
        }
    }

    /// Only the keywords needed to classify DML statements
    pub fn minimal() -> Self {
        Self::preset(ReservedWordsPreset::Minimal)
    }

    /// Reserved words of the most recent supported Firebird version
    pub fn latest() -> Self {
        Self::preset(ReservedWordsPreset::default())
    }

    /// Return a new table containing this table's words plus `additional`.
    ///
    /// The original table is left untouched.
    pub fn with_additional<I, S>(&self, additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.extend(additional.into_iter().map(|w| w.as_ref().to_string()));
        Self::new(words)
    }

    /// Check if `word` is reserved (case-insensitive)
    pub fn contains(&self, word: &str) -> bool {
        if word.is_empty() || word.len() > self.max_len {
            return false;
        }
        self.words.contains(&word.to_ascii_uppercase())
    }

    /// Number of words in the table
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in the table (upper-cased, unordered)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_case_insensitive() {
        let words = ReservedWords::minimal();
        assert!(words.contains("RETURNING"));
        assert!(words.contains("returning"));
        assert!(words.contains("Returning"));
        assert!(!words.contains("RETURNINGS"));
        assert!(!words.contains(""));
    }

    #[test]
    fn test_every_preset_contains_statement_keywords() {
        for preset in ReservedWordsPreset::ALL {
            let words = ReservedWords::preset(preset);
            for keyword in STATEMENT_KEYWORDS {
                assert!(words.contains(keyword), "{preset} is missing {keyword}");
            }
        }
    }

    #[test]
    fn test_firebird_4_adds_words() {
        let fb3 = ReservedWords::preset(ReservedWordsPreset::Firebird30);
        let fb4 = ReservedWords::preset(ReservedWordsPreset::Firebird40);
        assert!(!fb3.contains("DECFLOAT"));
        assert!(fb4.contains("DECFLOAT"));
        assert!(fb4.len() > fb3.len());
        assert!(fb3.contains("rdb$db_key"));
    }

    #[test]
    fn test_presets_share_storage() {
        let a = ReservedWords::latest();
        let b = ReservedWords::latest();
        assert!(Arc::ptr_eq(&a.words, &b.words));
    }

    #[test]
    fn test_with_additional_leaves_original_untouched() {
        let base = ReservedWords::minimal();
        let extended = base.with_additional(["matching", "  "]);
        assert!(extended.contains("MATCHING"));
        assert!(!base.contains("MATCHING"));
        assert_eq!(extended.len(), base.len() + 1);
    }

    #[test]
    fn test_long_probe_is_rejected() {
        let words = ReservedWords::new(["AS"]);
        assert!(!words.contains("ASASASAS"));
        assert!(words.contains("as"));
    }

    #[test]
    fn test_reserved_words_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReservedWords>();
    }
}
