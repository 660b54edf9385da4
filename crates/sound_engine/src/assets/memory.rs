//! In-memory resource manager
//!
//! Serves sound assets registered up front from memory. Loads complete after
//! a configurable number of polls so the manager's Loading phase can be
//! observed, and every dependency of an asset is reported before the asset
//! itself.

use crate::audio::helpers::{LoadAssetEvent, LoadAssetRequest, ResourceManager};
use crate::audio::{SerialId, SoundAsset};
use std::collections::HashMap;

/// Registered asset
#[derive(Debug, Clone)]
struct MemoryAssetEntry {
    bytes: Vec<u8>,
    length: Option<f32>,
    dependencies: Vec<String>,
}

/// Load waiting for its latency to run out
#[derive(Debug)]
struct InFlightLoad {
    request: LoadAssetRequest,
    remaining_polls: u32,
}

/// Resource manager backed by a map of encoded sound files
#[derive(Debug, Default)]
pub struct MemoryResourceManager {
    entries: HashMap<String, MemoryAssetEntry>,
    in_flight: Vec<InFlightLoad>,
    latency_polls: u32,
    requested: usize,
    cancelled: usize,
}

impl MemoryResourceManager {
    /// Create an empty resource manager with zero latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of polls a load waits before completing
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency_polls = polls;
        self
    }

    /// Register an encoded sound file
    pub fn register(&mut self, name: &str, bytes: Vec<u8>, length: Option<f32>) {
        self.entries.insert(
            name.to_string(),
            MemoryAssetEntry {
                bytes,
                length,
                dependencies: Vec::new(),
            },
        );
    }

    /// Declare that `name` needs `dependency` loaded first
    ///
    /// Returns false when `name` is not registered.
    pub fn add_dependency(&mut self, name: &str, dependency: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.dependencies.push(dependency.to_string());
                true
            }
            None => false,
        }
    }

    /// Whether an asset is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Loads currently waiting
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Loads requested so far
    pub fn requested_count(&self) -> usize {
        self.requested
    }

    /// Loads cancelled so far
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }

    fn complete(&self, request: &LoadAssetRequest, events: &mut Vec<LoadAssetEvent>) {
        let serial_id = request.serial_id;
        let Some(entry) = self.entries.get(&request.asset_name) else {
            events.push(LoadAssetEvent::Failure {
                serial_id,
                reason: format!("Asset '{}' is not registered", request.asset_name),
            });
            return;
        };

        let total_count = entry.dependencies.len();
        for (loaded, dependency) in entry.dependencies.iter().enumerate() {
            if !self.entries.contains_key(dependency) {
                events.push(LoadAssetEvent::Failure {
                    serial_id,
                    reason: format!("Dependency asset '{}' is not registered", dependency),
                });
                return;
            }
            events.push(LoadAssetEvent::DependencyAsset {
                serial_id,
                dependency_asset_name: dependency.clone(),
                loaded_count: loaded + 1,
                total_count,
            });
        }

        match SoundAsset::from_bytes(request.asset_name.as_str(), &entry.bytes) {
            Ok(asset) => {
                let asset = match entry.length {
                    Some(length) => asset.with_length(length),
                    None => asset,
                };
                events.push(LoadAssetEvent::Success { serial_id, asset });
            }
            Err(e) => events.push(LoadAssetEvent::Failure {
                serial_id,
                reason: e.to_string(),
            }),
        }
    }
}

impl ResourceManager for MemoryResourceManager {
    fn load_asset(&mut self, request: LoadAssetRequest) {
        log::trace!("Loading '{}' for sound {}", request.asset_name, request.serial_id);
        self.requested += 1;
        self.in_flight.push(InFlightLoad {
            request,
            remaining_polls: self.latency_polls,
        });
    }

    /// Cancelled loads are dropped outright and never reported
    fn cancel_load(&mut self, serial_id: SerialId) -> bool {
        let before = self.in_flight.len();
        self.in_flight.retain(|load| load.request.serial_id != serial_id);
        self.cancelled += before - self.in_flight.len();
        false
    }

    fn poll_events(&mut self) -> Vec<LoadAssetEvent> {
        let mut events = Vec::new();
        let mut waiting = Vec::with_capacity(self.in_flight.len());

        for mut load in std::mem::take(&mut self.in_flight) {
            if load.remaining_polls == 0 {
                self.complete(&load.request, &mut events);
            } else {
                load.remaining_polls -= 1;
                waiting.push(load);
            }
        }

        self.in_flight = waiting;
        events
    }
}
