//! Sound manager
//!
//! Owns the named sound groups, hands out serial ids, tracks requests while
//! their assets load and fans lifecycle events out to listeners.
//!
//! Everything happens on the host's tick. `play_sound` only records the
//! request and asks the resource manager for the asset; agent selection runs
//! in `update` once the load result has been polled. Events produced during
//! a call or a tick are queued and dispatched at the end of the next
//! `update`, so listeners always observe per-request order:
//! dependency progress, then success or failure, then updates.

use crate::audio::agent::PlaybackState;
use crate::audio::events::{
    PlaySoundDependencyAssetEventArgs, PlaySoundFailureEventArgs, PlaySoundSuccessEventArgs,
    PlaySoundUpdateEventArgs, SoundEvent, SoundEventHandlers, Subscription,
};
use crate::audio::group::{ReleasedSound, SoundGroup};
use crate::audio::helpers::{
    LoadAssetEvent, LoadAssetRequest, ResourceManager, SoundAgentHelper, SoundGroupHelper, SoundHelper,
};
use crate::audio::settings::SoundConfig;
use crate::audio::spatial::SpatialAudio;
use crate::audio::{PlaySoundErrorCode, PlaySoundParams, SoundAsset, SoundError};
use crate::foundation::math::Vec3;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Handle identifying one playback request
///
/// Issued by `SoundManager::play_sound`, starting at 1 and increasing by one
/// per request for the manager's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialId(u64);

impl SerialId {
    /// Wrap a raw serial number
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw serial number
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SerialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Request waiting on the resource manager
struct PendingSound<U> {
    group_index: usize,
    asset_name: String,
    params: PlaySoundParams,
    user_data: Option<U>,
    requested_at: f32,
}

/// Request bound to an agent
struct ActiveSound<U> {
    group_index: usize,
    asset_name: String,
    user_data: Option<U>,
}

/// Routes playback requests to sound groups and reports their lifecycle
///
/// `U` is the caller data attached to each request and echoed back in its
/// events.
pub struct SoundManager<U = ()> {
    groups: Vec<SoundGroup>,
    group_indices: HashMap<String, usize>,
    resource_manager: Option<Box<dyn ResourceManager>>,
    sound_helper: Option<Box<dyn SoundHelper>>,
    serial: u64,
    sequence: u64,
    elapsed: f32,
    loading: HashMap<SerialId, PendingSound<U>>,
    release_on_load: HashSet<SerialId>,
    active: HashMap<SerialId, ActiveSound<U>>,
    pending_events: Vec<SoundEvent<U>>,
    handlers: SoundEventHandlers<U>,
    spatial: SpatialAudio,
}

impl<U: Clone + 'static> SoundManager<U> {
    /// Create a manager with no groups and no collaborators
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            group_indices: HashMap::new(),
            resource_manager: None,
            sound_helper: None,
            serial: 0,
            sequence: 0,
            elapsed: 0.0,
            loading: HashMap::new(),
            release_on_load: HashSet::new(),
            active: HashMap::new(),
            pending_events: Vec::new(),
            handlers: SoundEventHandlers::new(),
            spatial: SpatialAudio::default(),
        }
    }

    fn ensure_configurable(&self, what: &str, already_set: bool) -> Result<(), SoundError> {
        if !self.groups.is_empty() {
            return Err(SoundError::Configuration(format!(
                "{} must be set before any sound group is added",
                what
            )));
        }
        if already_set {
            return Err(SoundError::Configuration(format!(
                "{} is already set; call shutdown() first",
                what
            )));
        }
        Ok(())
    }

    /// Wire the asset loader
    ///
    /// # Errors
    /// `Configuration` when a group exists or a resource manager is already set.
    pub fn set_resource_manager(&mut self, resource_manager: Box<dyn ResourceManager>) -> Result<(), SoundError> {
        self.ensure_configurable("Resource manager", self.resource_manager.is_some())?;
        self.resource_manager = Some(resource_manager);
        log::info!("Sound resource manager set");
        Ok(())
    }

    /// Wire the playback backend
    ///
    /// # Errors
    /// `Configuration` when a group exists or a sound helper is already set.
    pub fn set_sound_helper(&mut self, sound_helper: Box<dyn SoundHelper>) -> Result<(), SoundError> {
        self.ensure_configurable("Sound helper", self.sound_helper.is_some())?;
        self.sound_helper = Some(sound_helper);
        log::info!("Sound helper set");
        Ok(())
    }

    /// Number of sound groups
    pub fn sound_group_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether a group with this exact name exists
    pub fn has_sound_group(&self, name: &str) -> bool {
        self.group_indices.contains_key(name)
    }

    /// Group by name
    pub fn sound_group(&self, name: &str) -> Option<&SoundGroup> {
        self.group_indices.get(name).map(|&index| &self.groups[index])
    }

    /// Group by name, for changing mute, volume or replacement policy
    ///
    /// The agent pool cannot be changed through it:
    ///
    /// ```compile_fail
    /// use sound_engine::audio::backend::null_backend::NullGroupHelper;
    /// use sound_engine::audio::SoundManager;
    ///
    /// let mut manager: SoundManager = SoundManager::new();
    /// manager.add_sound_group("ui", Box::new(NullGroupHelper));
    /// let _assets = manager.sound_group_mut("ui").unwrap().clear();
    /// ```
    pub fn sound_group_mut(&mut self, name: &str) -> Option<&mut SoundGroup> {
        match self.group_indices.get(name) {
            Some(&index) => self.groups.get_mut(index),
            None => None,
        }
    }

    /// Every group in insertion order
    pub fn all_sound_groups(&self) -> Vec<&SoundGroup> {
        self.groups.iter().collect()
    }

    /// Add a group with default policy (replaceable, unmuted, volume 1.0)
    pub fn add_sound_group(&mut self, name: &str, group_helper: Box<dyn SoundGroupHelper>) -> bool {
        self.add_sound_group_with(name, false, false, 1.0, group_helper)
    }

    /// Add a group with explicit policy
    ///
    /// Returns false when the name is taken.
    pub fn add_sound_group_with(
        &mut self,
        name: &str,
        avoid_being_replaced_by_same_priority: bool,
        mute: bool,
        volume: f32,
        group_helper: Box<dyn SoundGroupHelper>,
    ) -> bool {
        if self.has_sound_group(name) {
            log::warn!("Sound group '{}' already exists", name);
            return false;
        }

        let group = SoundGroup::new(name, avoid_being_replaced_by_same_priority, mute, volume, group_helper);
        self.group_indices.insert(name.to_string(), self.groups.len());
        self.groups.push(group);
        log::info!(
            "Added sound group '{}' (avoid same priority: {}, mute: {}, volume: {:.2})",
            name,
            avoid_being_replaced_by_same_priority,
            mute,
            volume
        );
        true
    }

    /// Append a playback channel to a group, returning its agent index
    ///
    /// # Errors
    /// `Configuration` without a sound helper, `InvalidGroup` for an unknown
    /// group.
    pub fn add_sound_agent_helper(
        &mut self,
        group_name: &str,
        agent_helper: Box<dyn SoundAgentHelper>,
    ) -> Result<usize, SoundError> {
        if self.sound_helper.is_none() {
            return Err(SoundError::Configuration(
                "Sound helper must be set before adding agents".to_string(),
            ));
        }
        let index = *self
            .group_indices
            .get(group_name)
            .ok_or_else(|| SoundError::InvalidGroup(group_name.to_string()))?;

        let agent_index = self.groups[index].add_agent_helper(agent_helper);
        log::debug!("Group '{}' gained agent {}", group_name, agent_index);
        Ok(agent_index)
    }

    /// Build groups and their agents from configuration
    ///
    /// Groups whose names already exist are skipped. Returns the number of
    /// groups created.
    ///
    /// # Errors
    /// `Configuration` without a sound helper, or the helper's error when it
    /// cannot create an agent.
    pub fn apply_config(&mut self, config: &SoundConfig) -> Result<usize, SoundError> {
        if self.sound_helper.is_none() {
            return Err(SoundError::Configuration(
                "Sound helper must be set before applying a sound config".to_string(),
            ));
        }
        self.spatial.set_config(config.spatial.clone());

        let mut created = 0;
        for group in &config.groups {
            if self.has_sound_group(&group.name) {
                log::warn!("Skipping sound group '{}' from config: name already in use", group.name);
                continue;
            }

            let Some(helper) = self.sound_helper.as_mut() else {
                break;
            };
            let group_helper = helper.create_group_helper(&group.name);
            self.add_sound_group_with(
                &group.name,
                group.avoid_being_replaced_by_same_priority,
                group.mute,
                group.volume,
                group_helper,
            );
            created += 1;

            for agent_index in 0..group.agent_count {
                let Some(helper) = self.sound_helper.as_mut() else {
                    break;
                };
                let agent_helper = helper.create_agent_helper(&group.name, agent_index)?;
                self.add_sound_agent_helper(&group.name, agent_helper)?;
            }
        }
        Ok(created)
    }

    /// Request playback of an asset in a group
    ///
    /// Returns the new serial id at once. The outcome arrives later as one
    /// `PlaySoundSuccess` or `PlaySoundFailure` event.
    ///
    /// # Errors
    /// `Configuration` without a resource manager, `InvalidGroup` for an
    /// unknown group. No serial id is consumed in either case.
    pub fn play_sound(
        &mut self,
        asset_name: &str,
        group_name: &str,
        params: PlaySoundParams,
        user_data: Option<U>,
    ) -> Result<SerialId, SoundError> {
        if self.resource_manager.is_none() {
            return Err(SoundError::Configuration(
                "Resource manager must be set before playing sounds".to_string(),
            ));
        }
        let group_index = *self
            .group_indices
            .get(group_name)
            .ok_or_else(|| SoundError::InvalidGroup(group_name.to_string()))?;

        self.serial += 1;
        let serial_id = SerialId(self.serial);

        if self.groups[group_index].agent_count() == 0 {
            let error = SoundError::NoAgent(group_name.to_string());
            log::warn!("Play sound {} '{}' failed: {}", serial_id, asset_name, error);
            self.pending_events.push(SoundEvent::Failure(PlaySoundFailureEventArgs {
                serial_id,
                sound_group_name: group_name.to_string(),
                sound_asset_name: asset_name.to_string(),
                error_code: PlaySoundErrorCode::SoundGroupHasNoAgent,
                error_message: error.to_string(),
                user_data,
            }));
            return Ok(serial_id);
        }

        let priority = params.priority;
        self.loading.insert(
            serial_id,
            PendingSound {
                group_index,
                asset_name: asset_name.to_string(),
                params,
                user_data,
                requested_at: self.elapsed,
            },
        );

        if let Some(resource_manager) = self.resource_manager.as_mut() {
            resource_manager.load_asset(LoadAssetRequest {
                serial_id,
                asset_name: asset_name.to_string(),
                priority,
            });
        }
        log::debug!("Play sound {} '{}' in group '{}' is loading", serial_id, asset_name, group_name);
        Ok(serial_id)
    }

    /// Whether a request is still waiting on its asset
    pub fn is_loading_sound(&self, serial_id: SerialId) -> bool {
        self.loading.contains_key(&serial_id)
    }

    /// Serial ids of every loading request, ascending
    pub fn loading_sound_serial_ids(&self) -> Vec<SerialId> {
        let mut ids: Vec<SerialId> = self.loading.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Current state of a request
    ///
    /// # Errors
    /// `InvalidHandle` when the id is not tracked any more.
    pub fn playback_state(&self, serial_id: SerialId) -> Result<PlaybackState, SoundError> {
        if self.loading.contains_key(&serial_id) {
            return Ok(PlaybackState::Loading);
        }
        self.active
            .get(&serial_id)
            .and_then(|active| self.groups[active.group_index].sound_state(serial_id))
            .ok_or(SoundError::InvalidHandle(serial_id))
    }

    fn cancel_loading(&mut self, serial_id: SerialId) -> bool {
        if self.loading.remove(&serial_id).is_none() {
            return false;
        }
        let reports_later = self
            .resource_manager
            .as_mut()
            .is_some_and(|resource_manager| resource_manager.cancel_load(serial_id));
        if reports_later {
            self.release_on_load.insert(serial_id);
        }
        log::debug!("Cancelled loading sound {}", serial_id);
        true
    }

    /// Stop a sound, fading out over `fade_out_seconds`
    ///
    /// A request still loading is cancelled and produces no further events.
    /// Returns false for untracked or already stopping ids.
    pub fn stop_sound(&mut self, serial_id: SerialId, fade_out_seconds: f32) -> bool {
        if self.cancel_loading(serial_id) {
            return true;
        }
        match self.active.get(&serial_id) {
            Some(active) => self.groups[active.group_index].stop_sound(serial_id, fade_out_seconds.max(0.0)),
            None => false,
        }
    }

    /// Pause a playing sound, fading out over `fade_out_seconds`
    pub fn pause_sound(&mut self, serial_id: SerialId, fade_out_seconds: f32) -> bool {
        match self.active.get(&serial_id) {
            Some(active) => self.groups[active.group_index].pause_sound(serial_id, fade_out_seconds.max(0.0)),
            None => false,
        }
    }

    /// Resume a paused sound, fading in over `fade_in_seconds`
    pub fn resume_sound(&mut self, serial_id: SerialId, fade_in_seconds: f32) -> bool {
        match self.active.get(&serial_id) {
            Some(active) => self.groups[active.group_index].resume_sound(serial_id, fade_in_seconds.max(0.0)),
            None => false,
        }
    }

    /// Stop everything in one group, or in every group with `None`
    ///
    /// Loading requests for the affected groups are cancelled. Returns the
    /// number of requests stopped or cancelled.
    ///
    /// # Errors
    /// `InvalidGroup` for an unknown group name.
    pub fn stop_all_sounds(&mut self, group_name: Option<&str>, fade_out_seconds: f32) -> Result<usize, SoundError> {
        let Some(group_name) = group_name else {
            return Ok(self.stop_all_loaded_sounds(fade_out_seconds) + self.stop_all_loading_sounds());
        };

        let group_index = *self
            .group_indices
            .get(group_name)
            .ok_or_else(|| SoundError::InvalidGroup(group_name.to_string()))?;

        let loading: Vec<SerialId> = self
            .loading
            .iter()
            .filter(|(_, pending)| pending.group_index == group_index)
            .map(|(&serial_id, _)| serial_id)
            .collect();
        let cancelled = loading.into_iter().filter(|&id| self.cancel_loading(id)).count();

        Ok(cancelled + self.groups[group_index].stop_all_sounds(fade_out_seconds.max(0.0)))
    }

    /// Stop every sound bound to an agent
    pub fn stop_all_loaded_sounds(&mut self, fade_out_seconds: f32) -> usize {
        let fade_out_seconds = fade_out_seconds.max(0.0);
        self.groups
            .iter_mut()
            .map(|group| group.stop_all_sounds(fade_out_seconds))
            .sum()
    }

    /// Cancel every request still loading
    pub fn stop_all_loading_sounds(&mut self) -> usize {
        self.loading_sound_serial_ids()
            .into_iter()
            .filter(|&serial_id| self.cancel_loading(serial_id))
            .count()
    }

    /// Move the listener used for distance attenuation
    pub fn set_listener_position(&mut self, position: Vec3) {
        self.spatial.set_listener_position(position);
    }

    /// Spatial settings and listener
    pub fn spatial(&self) -> &SpatialAudio {
        &self.spatial
    }

    /// Listen for sounds that started playing
    pub fn on_play_sound_success(
        &mut self,
        callback: impl FnMut(&PlaySoundSuccessEventArgs<U>) + 'static,
    ) -> Subscription {
        self.handlers.success.subscribe(callback)
    }

    /// Listen for requests that failed
    pub fn on_play_sound_failure(
        &mut self,
        callback: impl FnMut(&PlaySoundFailureEventArgs<U>) + 'static,
    ) -> Subscription {
        self.handlers.failure.subscribe(callback)
    }

    /// Listen for per-tick progress of audible sounds
    pub fn on_play_sound_update(
        &mut self,
        callback: impl FnMut(&PlaySoundUpdateEventArgs<U>) + 'static,
    ) -> Subscription {
        self.handlers.update.subscribe(callback)
    }

    /// Listen for dependency loading progress
    pub fn on_play_sound_dependency_asset(
        &mut self,
        callback: impl FnMut(&PlaySoundDependencyAssetEventArgs<U>) + 'static,
    ) -> Subscription {
        self.handlers.dependency_asset.subscribe(callback)
    }

    /// Advance one tick
    ///
    /// Steps agents (fades, natural ends, returning stopped agents to Idle),
    /// applies load results, emits update events for audible sounds and
    /// finally dispatches every queued event.
    pub fn update(&mut self, elapse_seconds: f32) {
        let elapse_seconds = elapse_seconds.max(0.0);
        self.elapsed += elapse_seconds;

        for index in 0..self.groups.len() {
            let released = self.groups[index].update(elapse_seconds, &self.spatial);
            for sound in released {
                self.retire(sound);
            }
        }

        let load_events = match self.resource_manager.as_mut() {
            Some(resource_manager) => resource_manager.poll_events(),
            None => Vec::new(),
        };
        for event in load_events {
            self.handle_load_event(event);
        }

        self.queue_update_events();

        for event in std::mem::take(&mut self.pending_events) {
            log::trace!("Dispatching {} event for sound {}", event.kind(), event.serial_id());
            self.handlers.dispatch(&event);
        }
    }

    fn release_asset(&mut self, asset: SoundAsset) {
        match self.sound_helper.as_mut() {
            Some(helper) => helper.release_sound_asset(asset),
            None => log::debug!("Dropping sound asset '{}' without a sound helper", asset.name()),
        }
    }

    fn retire(&mut self, sound: ReleasedSound) {
        self.active.remove(&sound.serial_id);
        self.release_asset(sound.asset);
    }

    fn handle_load_event(&mut self, event: LoadAssetEvent) {
        let serial_id = event.serial_id();

        if self.release_on_load.contains(&serial_id) {
            match event {
                LoadAssetEvent::Success { asset, .. } => {
                    self.release_on_load.remove(&serial_id);
                    log::debug!("Releasing asset '{}' of cancelled sound {}", asset.name(), serial_id);
                    self.release_asset(asset);
                }
                LoadAssetEvent::Failure { .. } => {
                    self.release_on_load.remove(&serial_id);
                }
                LoadAssetEvent::DependencyAsset { .. } => {}
            }
            return;
        }

        if !self.loading.contains_key(&serial_id) {
            log::warn!("Load result for unknown sound {}", serial_id);
            if let LoadAssetEvent::Success { asset, .. } = event {
                self.release_asset(asset);
            }
            return;
        }

        match event {
            LoadAssetEvent::DependencyAsset {
                dependency_asset_name,
                loaded_count,
                total_count,
                ..
            } => {
                let Some(pending) = self.loading.get(&serial_id) else {
                    return;
                };
                self.pending_events
                    .push(SoundEvent::DependencyAsset(PlaySoundDependencyAssetEventArgs {
                        serial_id,
                        sound_group_name: self.groups[pending.group_index].name().to_string(),
                        sound_asset_name: pending.asset_name.clone(),
                        dependency_asset_name,
                        loaded_count,
                        total_count,
                        user_data: pending.user_data.clone(),
                    }));
            }
            LoadAssetEvent::Success { asset, .. } => {
                if let Some(pending) = self.loading.remove(&serial_id) {
                    self.start_loaded_sound(serial_id, pending, asset);
                }
            }
            LoadAssetEvent::Failure { reason, .. } => {
                if let Some(pending) = self.loading.remove(&serial_id) {
                    let error = SoundError::LoadFailure {
                        asset: pending.asset_name.clone(),
                        reason,
                    };
                    self.queue_failure(serial_id, pending, &error);
                }
            }
        }
    }

    fn start_loaded_sound(&mut self, serial_id: SerialId, pending: PendingSound<U>, asset: SoundAsset) {
        self.sequence += 1;
        let group = &mut self.groups[pending.group_index];
        let result = group.play_sound(serial_id, asset, pending.params.clone(), self.sequence, &self.spatial);

        match result {
            Ok(outcome) => {
                let group_name = self.groups[pending.group_index].name().to_string();
                if let Some(victim) = outcome.evicted {
                    log::debug!(
                        "Sound {} evicted {} from group '{}' agent {} (priority {})",
                        serial_id,
                        victim,
                        group_name,
                        outcome.agent_index,
                        pending.params.priority
                    );
                }
                if let Some(previous) = outcome.released {
                    self.retire(previous);
                }
                log::debug!(
                    "Sound {} '{}' playing on group '{}' agent {}",
                    serial_id,
                    pending.asset_name,
                    group_name,
                    outcome.agent_index
                );
                self.pending_events.push(SoundEvent::Success(PlaySoundSuccessEventArgs {
                    serial_id,
                    sound_group_name: group_name,
                    sound_asset_name: pending.asset_name.clone(),
                    agent_index: outcome.agent_index,
                    duration: self.elapsed - pending.requested_at,
                    user_data: pending.user_data.clone(),
                }));
                self.active.insert(
                    serial_id,
                    ActiveSound {
                        group_index: pending.group_index,
                        asset_name: pending.asset_name,
                        user_data: pending.user_data,
                    },
                );
            }
            Err(rejection) => {
                if let Some(victim) = rejection.evicted {
                    log::debug!(
                        "Sound {} evicted {} from group '{}' but the agent refused its asset",
                        serial_id,
                        victim,
                        self.groups[pending.group_index].name()
                    );
                }
                if let Some(previous) = rejection.released {
                    self.retire(previous);
                }
                self.release_asset(rejection.asset);
                self.queue_failure(serial_id, pending, &rejection.error);
            }
        }
    }

    fn queue_failure(&mut self, serial_id: SerialId, pending: PendingSound<U>, error: &SoundError) {
        let error_code = PlaySoundErrorCode::from_error(error).unwrap_or(PlaySoundErrorCode::LoadAssetFailure);
        log::warn!("Play sound {} '{}' failed: {}", serial_id, pending.asset_name, error);
        self.pending_events.push(SoundEvent::Failure(PlaySoundFailureEventArgs {
            serial_id,
            sound_group_name: self.groups[pending.group_index].name().to_string(),
            sound_asset_name: pending.asset_name,
            error_code,
            error_message: error.to_string(),
            user_data: pending.user_data,
        }));
    }

    fn queue_update_events(&mut self) {
        for group in &self.groups {
            let mix = group.mix();
            for agent in group.agents().filter(|agent| agent.is_audible()) {
                let Some(serial_id) = agent.active_serial_id() else {
                    continue;
                };
                let Some(active) = self.active.get(&serial_id) else {
                    continue;
                };
                self.pending_events.push(SoundEvent::Update(PlaySoundUpdateEventArgs {
                    serial_id,
                    sound_group_name: group.name().to_string(),
                    sound_asset_name: active.asset_name.clone(),
                    state: agent.state(),
                    time: agent.time(),
                    length: agent.asset().and_then(SoundAsset::length),
                    effective_volume: agent.effective_volume(mix),
                    user_data: active.user_data.clone(),
                }));
            }
        }
    }

    /// Stop everything and detach all groups and collaborators
    ///
    /// Loads in flight are cancelled, agent assets are released and queued
    /// events are dropped. Listeners stay registered and serial ids keep
    /// increasing, so a handle from before the shutdown never matches a
    /// later request.
    pub fn shutdown(&mut self) {
        for serial_id in self.loading_sound_serial_ids() {
            self.cancel_loading(serial_id);
        }

        let assets: Vec<SoundAsset> = self.groups.iter_mut().flat_map(SoundGroup::clear).collect();
        for asset in assets {
            self.release_asset(asset);
        }

        self.groups.clear();
        self.group_indices.clear();
        self.active.clear();
        self.release_on_load.clear();
        self.pending_events.clear();
        self.resource_manager = None;
        self.sound_helper = None;
        log::info!("Sound manager shut down");
    }
}

impl<U: Clone + 'static> Default for SoundManager<U> {
    fn default() -> Self {
        Self::new()
    }
}
