//! Built-in patch for the admin layout's notification dropdown.
//!
//! The order notification click handler used to mark the notification read
//! and jump to the orders list. The replacement logs the click, marks it
//! read, and routes order notifications to the order detail page when a
//! `referenceId` is present, falling back to the list page otherwise.

use crate::pattern::{PatternError, ReplacementPattern};

/// Comment marker that identifies the handler to replace.
pub const MARKER: &str = "Redirect if it's an order notification";

/// Lazily matches from the inline `onClick` arrow function through the
/// marker comment to the nearest `}` `}` pair that closes the callback.
pub const SEARCH: &str = r"onClick=\{\(\) => \{.*?Redirect if it's an order notification.*?\}\s*\}";

/// Replacement handler, indentation included.
pub const REPLACEMENT: &str = r#"                            onClick={() => {
                                                                console.log("Notification Clicked:", notif);
                                                                if (!notif.isRead) toggleRead(notif._id);
                                                                
                                                                // Redirect if it's an order notification
                                                                if (notif.type === 'order') {
                                                                    if (notif.referenceId) {
                                                                        console.log("Navigating to detail page:", notif.referenceId);
                                                                        navigate(`/admin/orders/${notif.referenceId}`);
                                                                    } else {
                                                                        console.log("No referenceId found, navigating to list page");
                                                                        navigate('/admin/orders');
                                                                    }
                                                                    setIsNotifOpen(false);
                                                                }
                                                            }}"#;

/// The notification click handler patch, compiled.
pub fn click_handler_patch() -> Result<ReplacementPattern, PatternError> {
    ReplacementPattern::new(SEARCH, REPLACEMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_compiles() {
        let patch = click_handler_patch().unwrap();
        assert_eq!(patch.as_str(), SEARCH);
        assert!(SEARCH.contains(MARKER));
    }

    #[test]
    fn test_replacement_routes_orders() {
        assert!(REPLACEMENT.contains("navigate(`/admin/orders/${notif.referenceId}`);"));
        assert!(REPLACEMENT.contains("navigate('/admin/orders');"));
        assert!(REPLACEMENT.contains("setIsNotifOpen(false);"));
        assert!(REPLACEMENT.trim_end().ends_with("}}"));
    }

    #[test]
    fn test_search_still_matches_replacement_prefix() {
        // The new handler keeps the marker, so the bare regex matches a span
        // one brace short of the block. Re-runs rely on skipping applied
        // blocks rather than on the regex failing to match.
        let raw = regex::RegexBuilder::new(SEARCH)
            .dot_matches_new_line(true)
            .build()
            .unwrap();
        let m = raw.find(REPLACEMENT).unwrap();
        assert_eq!(m.end(), REPLACEMENT.len() - 1);

        let patch = click_handler_patch().unwrap();
        assert!(patch.find(REPLACEMENT).is_empty());
    }
}
