// Application state module
// Route table and responder shared by all connections

use std::collections::HashMap;

use super::types::Config;
use crate::error::ServeError;
use crate::http::ConditionalResponder;
use crate::source::Source;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: HashMap<String, Source>,
    pub responder: ConditionalResponder,
}

impl AppState {
    /// Build the route table; fails on misconfigured cache or disposition policies
    pub fn new(config: &Config) -> Result<Self, ServeError> {
        let mut routes = HashMap::with_capacity(config.routes.len());
        for route in &config.routes {
            let source = Source::from_config(route, &config.cache)?;
            routes.insert(route.path.clone(), source);
        }

        Ok(Self {
            config: config.clone(),
            routes,
            responder: ConditionalResponder::new(),
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_log_follows_config() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        assert!(AppState::new(&cfg).unwrap().access_log_enabled());

        cfg.logging.access_log = false;
        assert!(!AppState::new(&cfg).unwrap().access_log_enabled());
    }
}
