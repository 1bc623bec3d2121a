//! Lookup of function and event definitions by selector/topic

use std::collections::HashMap;

use ethers_core::types::H256;

use super::function::{FunctionDef, LogEventDef};
use crate::config::CodecConfig;
use crate::{log_debug, log_warn};

/// Resolves definitions for decoding. Implemented by whatever holds the
/// parsed contract ABI.
pub trait AbiLookup {
    fn function_by_selector(&self, selector: [u8; 4]) -> Option<&FunctionDef>;

    fn event_by_topic(&self, topic: H256) -> Option<&LogEventDef>;
}

/// In-memory registry keyed by selector and topic
#[derive(Debug, Default)]
pub struct AbiRegistry {
    functions: HashMap<[u8; 4], FunctionDef>,
    events: HashMap<H256, LogEventDef>,
    /// Anonymous events emit no signature topic, so they are kept out of `events`
    anonymous: Vec<LogEventDef>,
    config: CodecConfig,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        AbiRegistry {
            config,
            ..Default::default()
        }
    }

    /// Build a registry from definition lists
    pub fn from_defs(
        functions: impl IntoIterator<Item = FunctionDef>,
        events: impl IntoIterator<Item = LogEventDef>,
    ) -> Self {
        let mut registry = Self::new();
        functions.into_iter().for_each(|f| registry.add_function(f));
        events.into_iter().for_each(|e| registry.add_event(e));
        registry
    }

    /// Register a function. A later definition with the same selector
    /// replaces the earlier one.
    pub fn add_function(&mut self, function: FunctionDef) {
        let selector = function.selector();
        log_debug!(
            &self.config,
            "abi::registry",
            "registering function",
            function = function.signature(),
            selector = hex::encode(selector),
        );
        if let Some(previous) = self.functions.insert(selector, function) {
            log_warn!(
                &self.config,
                "abi::registry",
                "selector collision, replacing definition",
                selector = hex::encode(selector),
                replaced = previous.signature(),
            );
        }
    }

    /// Register an event. Anonymous events are listed but never resolved by
    /// topic.
    pub fn add_event(&mut self, event: LogEventDef) {
        if event.is_anonymous() {
            log_debug!(
                &self.config,
                "abi::registry",
                "registering anonymous event",
                event = event.signature(),
            );
            self.anonymous.push(event);
            return;
        }

        let topic = event.topic();
        if let Some(previous) = self.events.insert(topic, event) {
            log_warn!(
                &self.config,
                "abi::registry",
                "topic collision, replacing definition",
                replaced = previous.signature(),
            );
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &LogEventDef> {
        self.events.values().chain(&self.anonymous)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.events.is_empty() && self.anonymous.is_empty()
    }
}

impl AbiLookup for AbiRegistry {
    fn function_by_selector(&self, selector: [u8; 4]) -> Option<&FunctionDef> {
        self.functions.get(&selector)
    }

    fn event_by_topic(&self, topic: H256) -> Option<&LogEventDef> {
        self.events.get(&topic)
    }
}
