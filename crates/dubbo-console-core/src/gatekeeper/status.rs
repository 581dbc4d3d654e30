use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Description used when a status is unmapped and the response carried no
/// status text either
pub const UNKNOWN_ERROR_DESCRIPTION: &str = "Unknown error.";

/// Process-wide table, built on first use and never modified
static STATUS_CODES: OnceLock<StatusCodeMap> = OnceLock::new();

/// Immutable mapping from HTTP status code to a user-facing description.
#[derive(Debug)]
pub struct StatusCodeMap {
    descriptions: BTreeMap<u16, &'static str>,
}

impl StatusCodeMap {
    /// The shared table
    pub fn global() -> &'static StatusCodeMap {
        STATUS_CODES.get_or_init(Self::build)
    }

    fn build() -> Self {
        let descriptions = BTreeMap::from([
            (200, "The server successfully returned the requested data."),
            (201, "Create or modify data successfully."),
            (202, "A request has entered the background queue (asynchronous task)."),
            (204, "Delete data successfully."),
            (400, "There was an error in the request, and the server did not create or modify the data."),
            (401, "The user does not have permission (token, user name, password error)."),
            (403, "Users are authorized, but access is prohibited."),
            (404, "The request is for a record that does not exist, and the server does not operate."),
            (405, "Request method is not allowed."),
            (406, "The format of the request is not available."),
            (410, "The requested resource is permanently deleted and will no longer be available."),
            (422, "A validation error occurred while creating an object."),
            (500, "Server error, please check the server."),
            (502, "Gateway error."),
            (503, "Service unavailable, server temporarily overloaded or maintained."),
            (504, "Gateway timed out."),
        ]);
        Self { descriptions }
    }

    pub fn describe(&self, status: u16) -> Option<&'static str> {
        self.descriptions.get(&status).copied()
    }

    /// Description for `status`, falling back to the response's own status
    /// text, then to [`UNKNOWN_ERROR_DESCRIPTION`].
    pub fn resolve(&self, status: u16, status_text: &str) -> String {
        match self.describe(status) {
            Some(description) => description.to_string(),
            None if !status_text.trim().is_empty() => status_text.to_string(),
            None => UNKNOWN_ERROR_DESCRIPTION.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let map = StatusCodeMap::global();
        assert_eq!(map.len(), 16);
        assert_eq!(
            map.describe(404),
            Some("The request is for a record that does not exist, and the server does not operate.")
        );
        assert_eq!(map.describe(504), Some("Gateway timed out."));
        assert_eq!(map.describe(418), None);
    }

    #[test]
    fn test_resolve_prefers_table() {
        let map = StatusCodeMap::global();
        assert_eq!(map.resolve(502, "Bad Gateway"), "Gateway error.");
    }

    #[test]
    fn test_resolve_falls_back_to_status_text() {
        let map = StatusCodeMap::global();
        assert_eq!(map.resolve(999, "Teapot Overflow"), "Teapot Overflow");
        assert_eq!(map.resolve(429, "Too Many Requests"), "Too Many Requests");
    }

    #[test]
    fn test_resolve_without_status_text() {
        let map = StatusCodeMap::global();
        assert_eq!(map.resolve(999, ""), UNKNOWN_ERROR_DESCRIPTION);
        assert_eq!(map.resolve(999, "   "), UNKNOWN_ERROR_DESCRIPTION);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(StatusCodeMap::global(), StatusCodeMap::global()));
    }
}
