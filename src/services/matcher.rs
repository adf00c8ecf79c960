use crate::platform::window::{DesktopWindow, WindowProvider};
use crate::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Case-insensitive substring containment, the only matching rule Gridle
/// applies to window titles.
pub fn title_matches(query: &str, title: &str) -> bool {
    title.to_lowercase().contains(&query.to_lowercase())
}

/// Telemetry for matching operations
#[derive(Debug, Default, Clone)]
pub struct MatcherMetrics {
    pub match_requests: u64,
    pub last_match_count: usize,
    pub windows_restored: u64,
    pub restore_failures: u64,
}

/// Finds the windows a title query refers to.
///
/// Matches are returned in the provider's enumeration order; that order is
/// whatever the OS reports and is not guaranteed stable across runs.
/// Minimized matches are asked to restore before being returned, but a
/// failed restore never drops the window from the result.
pub struct WindowMatcher {
    provider: Arc<dyn WindowProvider>,
    metrics: Arc<RwLock<MatcherMetrics>>,
}

impl WindowMatcher {
    pub fn new(provider: Arc<dyn WindowProvider>) -> Self {
        Self {
            provider,
            metrics: Arc::new(RwLock::new(MatcherMetrics::default())),
        }
    }

    /// Re-enumerate windows and return every one whose title contains the
    /// query. An empty result is a normal outcome, not an error.
    pub async fn match_windows(&self, query: &str) -> Result<Vec<DesktopWindow>> {
        let windows = self.provider.list_windows()?;

        let mut matched = Vec::new();
        let mut restored = 0u64;
        let mut restore_failures = 0u64;

        for window in windows {
            if !title_matches(query, &window.title) {
                continue;
            }

            if window.is_minimized {
                match self.provider.restore(window.window_id) {
                    Ok(()) => restored += 1,
                    Err(err) => {
                        // Best effort: the window stays a target either way
                        warn!(
                            "Failed to restore window {} ('{}'): {}",
                            window.window_id, window.title, err
                        );
                        restore_failures += 1;
                    }
                }
            }

            matched.push(window);
        }

        debug!("Query '{}' matched {} window(s)", query, matched.len());

        let mut metrics = self.metrics.write().await;
        metrics.match_requests += 1;
        metrics.last_match_count = matched.len();
        metrics.windows_restored += restored;
        metrics.restore_failures += restore_failures;

        Ok(matched)
    }

    pub async fn metrics(&self) -> MatcherMetrics {
        self.metrics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::window::{Frame, InMemoryWindowProvider};

    fn window(window_id: u32, title: &str, minimized: bool) -> DesktopWindow {
        DesktopWindow::new(
            window_id,
            title,
            Frame {
                x: 0,
                y: 0,
                width: 800,
                height: 600,
            },
            minimized,
        )
    }

    fn matcher_with(windows: Vec<DesktopWindow>) -> (WindowMatcher, Arc<InMemoryWindowProvider>) {
        let provider = Arc::new(InMemoryWindowProvider::new_with(windows));
        (WindowMatcher::new(provider.clone()), provider)
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert!(title_matches("note", "Notepad — file.txt"));
        assert!(title_matches("NOTE", "my notes"));
        assert!(!title_matches("note", "Terminal"));
    }

    #[tokio::test]
    async fn matches_come_back_in_enumeration_order() {
        let (matcher, _) = matcher_with(vec![
            window(9, "Notepad - b.txt", false),
            window(3, "Terminal", false),
            window(1, "Notepad - a.txt", false),
        ]);

        let ids: Vec<_> = matcher
            .match_windows("notepad")
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.window_id)
            .collect();
        assert_eq!(ids, vec![9, 1]);
    }

    #[tokio::test]
    async fn minimized_match_is_restored() {
        let (matcher, provider) = matcher_with(vec![window(1, "Notepad", true)]);

        let matched = matcher.match_windows("note").await.unwrap();
        assert_eq!(matched.len(), 1);
        assert!(!provider.get_window(1).unwrap().unwrap().is_minimized);

        let metrics = matcher.metrics().await;
        assert_eq!(metrics.windows_restored, 1);
        assert_eq!(metrics.restore_failures, 0);
    }

    #[tokio::test]
    async fn restore_failure_keeps_window_in_result() {
        let (matcher, provider) = matcher_with(vec![window(1, "Notepad", true)]);
        provider.set_failing(1);

        let matched = matcher.match_windows("note").await.unwrap();
        assert_eq!(matched.len(), 1);

        let metrics = matcher.metrics().await;
        assert_eq!(metrics.restore_failures, 1);
    }

    #[tokio::test]
    async fn non_minimized_windows_are_not_restored() {
        let (matcher, provider) = matcher_with(vec![window(1, "Notepad", false)]);

        matcher.match_windows("note").await.unwrap();
        assert_eq!(matcher.metrics().await.windows_restored, 0);
        assert!(!provider.get_window(1).unwrap().unwrap().is_minimized);
    }

    #[tokio::test]
    async fn empty_match_set_is_ok() {
        let (matcher, _) = matcher_with(vec![window(1, "Notepad", false)]);

        let matched = matcher.match_windows("xyz-nonexistent").await.unwrap();
        assert!(matched.is_empty());
        assert_eq!(matcher.metrics().await.last_match_count, 0);
    }
}
