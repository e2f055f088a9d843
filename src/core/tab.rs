//! Per-run tab identifier.
//!
//! The server keeps one conversation per tab id. A fresh id is minted the
//! first time one is needed after start-up and reused until the process exits.

use chrono::Utc;

const SUFFIX_LEN: usize = 7;

#[derive(Debug, Default)]
pub struct TabSession {
    id: Option<String>,
}

impl TabSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current id, generating one on first use.
    pub fn id(&mut self) -> &str {
        self.id.get_or_insert_with(generate_tab_id)
    }
}

/// `tab_<unix millis>_<7 lowercase alphanumerics>`
pub fn generate_tab_id() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!("tab_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_lazy_and_stable() {
        let mut tab = TabSession::new();
        let first = tab.id().to_string();
        let second = tab.id().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn separate_sessions_get_separate_ids() {
        let a = TabSession::new().id().to_string();
        let b = TabSession::new().id().to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn id_format() {
        let id = generate_tab_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "tab");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
