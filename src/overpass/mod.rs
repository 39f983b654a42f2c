//! Overpass API access: query construction, wire types and the HTTP client.

pub mod client;
pub mod query;
pub mod types;

pub use client::{OverpassClient, OverpassError, Transport};
pub use query::OverpassQuery;
pub use types::{Bounds, Center, Element, OverpassResponse};

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for pipeline tests.

    use super::client::decode_response;
    use super::{OverpassError, OverpassQuery, OverpassResponse, Transport};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned results in order and records every query it sees.
    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<OverpassResponse, OverpassError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue an HTTP 200 body, decoded the way the real client decodes it.
        pub fn reply(self, body: serde_json::Value) -> Self {
            self.replies.lock().unwrap().push_back(decode_response(body));
            self
        }

        pub fn empty(self) -> Self {
            self.reply(serde_json::json!({"elements": []}))
        }

        pub fn fail(self, err: OverpassError) -> Self {
            self.replies.lock().unwrap().push_back(Err(err));
            self
        }

        pub fn queries(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, query: &OverpassQuery) -> Result<OverpassResponse, OverpassError> {
            self.seen.lock().unwrap().push(query.as_str().to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected query: {}", query))
        }
    }
}
