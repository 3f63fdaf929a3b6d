//! The dangerous-parameter-value catalog used by the risk-assessment
//! layer (spec §4.8 step 4): SQL injection, path traversal, and command
//! injection signatures.

use aegis_core::RiskLevel;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct DangerousPattern {
    pub id: &'static str,
    pub severity: RiskLevel,
    pub regex: Regex,
}

static DANGEROUS_PATTERNS: Lazy<Vec<DangerousPattern>> = Lazy::new(|| {
    vec![
        DangerousPattern {
            id: "sql_destructive_statement",
            severity: RiskLevel::Critical,
            regex: Regex::new(r"(?i);\s*(DROP|DELETE|TRUNCATE|ALTER)\b").unwrap(),
        },
        DangerousPattern {
            id: "sql_union_select",
            severity: RiskLevel::Critical,
            regex: Regex::new(r"(?i)\bUNION\s+SELECT\b").unwrap(),
        },
        DangerousPattern {
            id: "sql_comment_terminator",
            severity: RiskLevel::High,
            regex: Regex::new(r"';\s*--").unwrap(),
        },
        DangerousPattern {
            id: "sql_tautology",
            severity: RiskLevel::High,
            regex: Regex::new(r"(?i)OR\s+'1'\s*=\s*'1'").unwrap(),
        },
        DangerousPattern {
            id: "path_traversal_dotdot",
            severity: RiskLevel::High,
            regex: Regex::new(r"\.\./").unwrap(),
        },
        DangerousPattern {
            id: "path_sensitive_etc",
            severity: RiskLevel::Critical,
            regex: Regex::new(r"/etc/(passwd|shadow|hosts)\b").unwrap(),
        },
        DangerousPattern {
            id: "path_proc_self",
            severity: RiskLevel::High,
            regex: Regex::new(r"/proc/self\b").unwrap(),
        },
        DangerousPattern {
            id: "cmd_backtick_substitution",
            severity: RiskLevel::Critical,
            regex: Regex::new(r"`[^`]+`").unwrap(),
        },
        DangerousPattern {
            id: "cmd_dollar_paren_substitution",
            severity: RiskLevel::Critical,
            regex: Regex::new(r"\$\([^)]+\)").unwrap(),
        },
        DangerousPattern {
            id: "cmd_chained_shell_binary",
            severity: RiskLevel::High,
            regex: Regex::new(r";\s*(rm|cat|curl|wget|nc|bash|sh|python|node)\b").unwrap(),
        },
        DangerousPattern {
            id: "cmd_piped_to_shell",
            severity: RiskLevel::High,
            regex: Regex::new(r"\|\s*(bash|sh|zsh)\b").unwrap(),
        },
    ]
});

/// Returns the highest-severity dangerous pattern matching `value`, if
/// any (spec §4.8 step 4: "a hit at critical or high denies").
pub fn scan_for_danger(value: &str) -> Option<(&'static str, RiskLevel)> {
    DANGEROUS_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(value))
        .max_by_key(|p| p.severity)
        .map(|p| (p.id, p.severity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sql_drop_table() {
        let hit = scan_for_danger("SELECT * FROM public_data; DROP TABLE users; --");
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().1, RiskLevel::Critical);
    }

    #[test]
    fn detects_path_traversal() {
        assert!(scan_for_danger("../../etc/passwd").is_some());
    }

    #[test]
    fn detects_command_substitution() {
        assert!(scan_for_danger("echo $(rm -rf /)").is_some());
    }

    #[test]
    fn benign_value_has_no_hit() {
        assert!(scan_for_danger("select name from users where id = 1").is_none());
    }
}
