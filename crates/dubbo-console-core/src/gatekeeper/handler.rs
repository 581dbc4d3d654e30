use std::sync::Arc;

use tracing::warn;

use super::notify::{Notification, Notifier};
use super::status::StatusCodeMap;
use crate::api::ApiError;

pub const NETWORK_ERROR_MESSAGE: &str = "Network abnormality";
pub const NETWORK_ERROR_DESCRIPTION: &str = "Your network is abnormal, unable to connect to the server";

/// Surfaces failed requests to the user without swallowing them.
///
/// Every transport failure produces exactly one notification, then the
/// original error is handed back for the caller to return. Retrying is the
/// caller's business.
#[derive(Clone)]
pub struct ErrorHandler {
    notifier: Arc<dyn Notifier>,
    status_codes: &'static StatusCodeMap,
}

impl ErrorHandler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            status_codes: StatusCodeMap::global(),
        }
    }

    /// What the user should be told about `error`, if anything.
    ///
    /// Only transport outcomes are notified here: an error status, or no
    /// response at all. Decode and storage failures belong to the caller.
    pub fn notification_for(&self, error: &ApiError) -> Option<Notification> {
        match error {
            ApiError::Http {
                status,
                url,
                status_text,
                ..
            } => Some(Notification::error(
                format!("Request error {}: {}", status, url),
                self.status_codes.resolve(*status, status_text),
            )),
            ApiError::Network(_) | ApiError::Unreachable(_) => Some(Notification::error(
                NETWORK_ERROR_MESSAGE,
                NETWORK_ERROR_DESCRIPTION,
            )),
            ApiError::LoginRejected | ApiError::InvalidResponse { .. } | ApiError::Storage(_) => None,
        }
    }

    /// Notify about `error` and give it back, so call sites read
    /// `return Err(handler.handle_response_error(e))`.
    pub fn handle_response_error(&self, error: ApiError) -> ApiError {
        if let Some(notification) = self.notification_for(&error) {
            warn!(error = %error, "Request failed");
            self.notifier.notify(notification);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;
    use crate::gatekeeper::Severity;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn take(&self) -> Vec<Notification> {
            std::mem::take(&mut *self.seen.lock().unwrap())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    fn handler() -> (ErrorHandler, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (ErrorHandler::new(notifier.clone()), notifier)
    }

    #[test]
    fn test_mapped_status_is_described_and_reraised() {
        let (handler, notifier) = handler();
        let err = ApiError::from_status(StatusCode::NOT_FOUND, None, "/api/dev/service/foo", "");

        let returned = handler.handle_response_error(err);

        assert_eq!(returned.status(), Some(404));
        assert_eq!(
            notifier.take(),
            vec![Notification {
                message: "Request error 404: /api/dev/service/foo".to_string(),
                description: "The request is for a record that does not exist, and the server does not operate."
                    .to_string(),
                severity: Severity::Error,
            }]
        );
    }

    #[test]
    fn test_unmapped_status_uses_status_text() {
        let (handler, notifier) = handler();
        let err = ApiError::Http {
            status: 999,
            url: "/api/dev/services".to_string(),
            status_text: "Strange Things".to_string(),
            body: String::new(),
        };

        let returned = handler.handle_response_error(err);

        assert_eq!(returned.status(), Some(999));
        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "Request error 999: /api/dev/services");
        assert_eq!(seen[0].description, "Strange Things");
    }

    #[test]
    fn test_no_response_notifies_once_per_call() {
        let (handler, notifier) = handler();

        let first = handler.handle_response_error(ApiError::Unreachable("connection refused".into()));
        assert!(first.is_network());
        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "Network abnormality");
        assert_eq!(seen[0].description, "Your network is abnormal, unable to connect to the server");

        handler.handle_response_error(ApiError::Unreachable("timed out".into()));
        assert_eq!(notifier.take().len(), 1);
    }

    #[test]
    fn test_non_transport_errors_are_not_notified() {
        let (handler, notifier) = handler();
        let returned = handler.handle_response_error(ApiError::LoginRejected);
        assert!(matches!(returned, ApiError::LoginRejected));

        handler.handle_response_error(ApiError::InvalidResponse {
            url: "/api/dev/services".into(),
            reason: "expected array".into(),
        });
        assert!(notifier.take().is_empty());
    }
}
