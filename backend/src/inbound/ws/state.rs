//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

use crate::domain::ports::EventQuery;

/// Browser origins permitted to open the RPC socket.
///
/// Entries compare by scheme, host and effective port, so
/// `https://events.example` and `https://events.example:443` are the same
/// origin.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Arc<[Origin]>);

impl AllowedOrigins {
    /// Parse each entry as a URL and keep its origin.
    ///
    /// # Examples
    /// ```
    /// use events_backend::inbound::ws::state::AllowedOrigins;
    /// use url::Url;
    ///
    /// let origins = AllowedOrigins::parse(["http://localhost:3000"]).expect("valid origins");
    /// assert!(origins.permits(&Url::parse("http://localhost:3000").expect("url")));
    /// assert!(!origins.permits(&Url::parse("http://localhost:4000").expect("url")));
    /// ```
    pub fn parse<I, S>(entries: I) -> Result<Self, url::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = entries
            .into_iter()
            .map(|entry| Url::parse(entry.as_ref()).map(|url| url.origin()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(origins.into()))
    }

    pub fn permits(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        candidate.is_tuple() && self.0.iter().any(|allowed| *allowed == candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub events: Arc<dyn EventQuery>,
    pub allowed_origins: AllowedOrigins,
}

impl WsState {
    pub fn new(events: Arc<dyn EventQuery>, allowed_origins: AllowedOrigins) -> Self {
        Self {
            events,
            allowed_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://events.example", true)]
    #[case("https://events.example:443", true)]
    #[case("http://events.example", false)]
    #[case("https://sub.events.example", false)]
    #[case("http://localhost:3000", true)]
    #[case("http://localhost:3001", false)]
    fn compares_by_origin(#[case] origin: &str, #[case] expected: bool) {
        let allowed = AllowedOrigins::parse(["https://events.example/", "http://localhost:3000"])
            .expect("valid origins");
        let url = Url::parse(origin).expect("url");
        assert_eq!(allowed.permits(&url), expected);
    }

    #[rstest]
    fn rejects_unparsable_entries() {
        assert!(AllowedOrigins::parse(["not a url"]).is_err());
    }

    #[rstest]
    fn empty_list_permits_nothing() {
        let allowed = AllowedOrigins::default();
        assert!(allowed.is_empty());
        assert!(!allowed.permits(&Url::parse("http://localhost:3000").expect("url")));
    }
}
