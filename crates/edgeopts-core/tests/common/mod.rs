//! Test doubles and common utilities for orchestration contract tests
//!
//! `MockOptionsApi` serves a fixed schema and options state, counts every
//! call, and can be told to fail individual operations.

#![allow(dead_code)]

use edgeopts_core::error::{Error, Result};
use edgeopts_core::schema::{BitField, OptionDescriptor, PropertyDescriptor, PropertyType};
use edgeopts_core::traits::{OptionsApi, ProtectKeyAction};
use edgeopts_core::OptionsMap;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Operations a mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Metadata,
    GetOptions,
    UpdateOptions,
    CreateProtectKey,
    DeleteProtectKey,
}

#[derive(Default)]
struct MockState {
    descriptors: Vec<OptionDescriptor>,
    options: Mutex<OptionsMap>,
    failing: Mutex<Vec<Operation>>,
    metadata_calls: AtomicUsize,
    get_calls: AtomicUsize,
    update_calls: AtomicUsize,
    create_key_calls: AtomicUsize,
    delete_key_calls: AtomicUsize,
    applied: Mutex<Vec<OptionsMap>>,
    key_actions: Mutex<Vec<ProtectKeyAction>>,
}

/// A mock OptionsApi that tracks calls
///
/// Clones share state, so a test can hand one clone to the updater and keep
/// another to inspect counters.
#[derive(Clone)]
pub struct MockOptionsApi {
    state: Arc<MockState>,
}

impl MockOptionsApi {
    pub fn new(descriptors: Vec<OptionDescriptor>, options: OptionsMap) -> Self {
        Self {
            state: Arc::new(MockState {
                descriptors,
                options: Mutex::new(options),
                ..Default::default()
            }),
        }
    }

    /// Mock with [`standard_schema`] and [`current_state`]
    pub fn standard() -> Self {
        Self::new(standard_schema(), current_state())
    }

    /// Make `operation` fail from now on
    pub fn fail(&self, operation: Operation) {
        self.state.failing.lock().unwrap().push(operation);
    }

    pub fn metadata_calls(&self) -> usize {
        self.state.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.state.get_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }

    pub fn create_key_calls(&self) -> usize {
        self.state.create_key_calls.load(Ordering::SeqCst)
    }

    pub fn delete_key_calls(&self) -> usize {
        self.state.delete_key_calls.load(Ordering::SeqCst)
    }

    /// Every options map sent to `update_options`
    pub fn applied(&self) -> Vec<OptionsMap> {
        self.state.applied.lock().unwrap().clone()
    }

    /// Every action sent to `create_protect_key`
    pub fn key_actions(&self) -> Vec<ProtectKeyAction> {
        self.state.key_actions.lock().unwrap().clone()
    }

    /// Current remote options
    pub fn remote_options(&self) -> OptionsMap {
        self.state.options.lock().unwrap().clone()
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if self.state.failing.lock().unwrap().contains(&operation) {
            return Err(Error::provider("mock", format!("{:?} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OptionsApi for MockOptionsApi {
    async fn get_options_metadata(&self, _service_id: &str) -> Result<Vec<OptionDescriptor>> {
        self.state.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::Metadata)?;
        Ok(self.state.descriptors.clone())
    }

    async fn get_options(&self, _service_id: &str) -> Result<OptionsMap> {
        self.state.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::GetOptions)?;
        Ok(self.remote_options())
    }

    async fn update_options(&self, _service_id: &str, options: &OptionsMap) -> Result<OptionsMap> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::UpdateOptions)?;

        self.state.applied.lock().unwrap().push(options.clone());
        let mut current = self.state.options.lock().unwrap();
        for (key, value) in options {
            current.insert(key.clone(), value.clone());
        }
        Ok(current.clone())
    }

    async fn create_protect_key(&self, _service_id: &str, action: ProtectKeyAction) -> Result<()> {
        self.state.create_key_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::CreateProtectKey)?;
        self.state.key_actions.lock().unwrap().push(action);
        Ok(())
    }

    async fn delete_protect_key(&self, _service_id: &str) -> Result<()> {
        self.state.delete_key_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::DeleteProtectKey)?;
        Ok(())
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

/// A schema with every standard option and one dynamic option per type
pub fn standard_schema() -> Vec<OptionDescriptor> {
    vec![
        OptionDescriptor::standard("s1", "Reverse Proxy").with_group("Origin"),
        OptionDescriptor::standard("s2", "ProtectServe").with_group("Security"),
        OptionDescriptor::standard("s3", "CORS Override").with_group("Headers"),
        OptionDescriptor::standard("s4", "Expiry Overrides").with_group("Caching"),
        OptionDescriptor::standard("s5", "Referrer Blocking").with_group("Security"),
        OptionDescriptor::standard("s6", "Auto HTTPS Redirect").with_group("Security"),
        OptionDescriptor::dynamic(
            "d1",
            "Query String Caching",
            PropertyDescriptor::new("queryStringCaching", PropertyType::Boolean),
        ),
        OptionDescriptor::dynamic(
            "d2",
            "Max Age",
            PropertyDescriptor::new("maxAge", PropertyType::Integer).with_range(Some(0), Some(100)),
        ),
        OptionDescriptor::dynamic(
            "d3",
            "Custom Header",
            PropertyDescriptor::new("customHeader", PropertyType::String),
        ),
        OptionDescriptor::dynamic(
            "d4",
            "Compression",
            PropertyDescriptor::new("compression", PropertyType::Enum)
                .with_enum_values(["OFF", "GZIP", "BROTLI"]),
        ),
        OptionDescriptor::dynamic(
            "d5",
            "Allowed Methods",
            PropertyDescriptor::new("allowedMethods", PropertyType::Bitfield).with_bit_fields(vec![
                BitField { bit: 0, key: "GET".to_string() },
                BitField { bit: 1, key: "HEAD".to_string() },
                BitField { bit: 2, key: "OPTIONS".to_string() },
            ]),
        ),
        OptionDescriptor::dynamic(
            "d6",
            "Edge Hosts",
            PropertyDescriptor::new("edgeHosts", PropertyType::StringList),
        ),
        OptionDescriptor::dynamic(
            "d7",
            "Origin Shield",
            PropertyDescriptor::new("originShield", PropertyType::String),
        )
        .read_only(),
    ]
}

/// Remote options state before any update
pub fn current_state() -> OptionsMap {
    options(json!({
        "cors": false,
        "maxAge": 30,
        "compression": "OFF",
        "originShield": "fra"
    }))
}

/// Build an options map from a JSON object literal
pub fn options(value: Value) -> OptionsMap {
    value
        .as_object()
        .cloned()
        .expect("options literal must be a JSON object")
}
