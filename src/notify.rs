//! User-facing notification seam
//!
//! Every mutation shows a loading notice, then a success or failure
//! notice. The trait keeps that contract explicit instead of relying on
//! an ambient notification layer, and lets tests record the sequence.

pub trait Notifier {
    /// Show a transient "operation in progress" notice
    fn loading(&mut self, message: &str);

    /// Dismiss the loading notice, whatever the outcome
    fn dismiss_loading(&mut self);

    /// Show a success toast
    fn success(&mut self, message: &str);

    /// Show a failure toast
    fn failure(&mut self, message: &str);
}

/// Status-line notifier backing the TUI's bottom bar
#[derive(Debug, Default)]
pub struct StatusLine {
    pub loading: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.loading = None;
        self.status = None;
        self.error = None;
    }
}

impl Notifier for StatusLine {
    fn loading(&mut self, message: &str) {
        self.loading = Some(message.to_string());
        self.status = None;
        self.error = None;
    }

    fn dismiss_loading(&mut self) {
        self.loading = None;
    }

    fn success(&mut self, message: &str) {
        self.status = Some(message.to_string());
        self.error = None;
    }

    fn failure(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_then_success_dismisses_loading() {
        let mut line = StatusLine::new();
        line.loading("Saving...");
        assert!(line.loading.is_some());
        line.dismiss_loading();
        line.success("Saved");
        assert!(line.loading.is_none());
        assert_eq!(line.status.as_deref(), Some("Saved"));
        assert!(line.error.is_none());
    }

    #[test]
    fn test_failure_replaces_status() {
        let mut line = StatusLine::new();
        line.success("Saved");
        line.failure("Request failed");
        assert!(line.status.is_none());
        assert_eq!(line.error.as_deref(), Some("Request failed"));
    }
}
