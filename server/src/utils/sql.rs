//! SQL utility functions

/// Comma-separated list of `n` positional placeholders (`?, ?, ?`)
///
/// # Example
///
/// ```
/// use leads_server::utils::sql::placeholders;
///
/// let sql = format!("status IN ({})", placeholders(2));
/// assert_eq!(sql, "status IN (?, ?)");
/// ```
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
