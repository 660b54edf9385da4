//! Fake collaborators shared by the integration tests
//!
//! Every fake writes what it was asked to do into an `Rc<RefCell<_>>` log the
//! test keeps a handle to.

#![allow(dead_code)]

use sound_engine::audio::{
    LoadAssetEvent, LoadAssetRequest, PlaySoundErrorCode, PlaySoundParams, PlaybackState, ResourceManager,
    SerialId, SoundAgentHelper, SoundAsset, SoundError, SoundGroupHelper, SoundHelper, SoundManager,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// What the fake resource manager saw
#[derive(Default)]
pub struct ResourceLog {
    pub requests: Vec<LoadAssetRequest>,
    pub cancelled: Vec<SerialId>,
    pub queued: Vec<LoadAssetEvent>,
    /// Complete every load on the next poll with a clip of this length
    pub auto_complete: Option<f32>,
    /// Forget cancelled loads instead of possibly reporting them later
    pub drops_cancelled: bool,
}

impl ResourceLog {
    pub fn complete(&mut self, serial_id: SerialId, name: &str, length: f32) {
        self.queued.push(LoadAssetEvent::Success {
            serial_id,
            asset: asset(name, length),
        });
    }

    pub fn fail(&mut self, serial_id: SerialId, reason: &str) {
        self.queued.push(LoadAssetEvent::Failure {
            serial_id,
            reason: reason.to_string(),
        });
    }

    pub fn dependency(&mut self, serial_id: SerialId, name: &str, loaded_count: usize, total_count: usize) {
        self.queued.push(LoadAssetEvent::DependencyAsset {
            serial_id,
            dependency_asset_name: name.to_string(),
            loaded_count,
            total_count,
        });
    }
}

pub fn asset(name: &str, length: f32) -> SoundAsset {
    SoundAsset::from_bytes(name, b"OggS\0\0\0\0").unwrap().with_length(length)
}

pub struct FakeResources(pub Rc<RefCell<ResourceLog>>);

impl ResourceManager for FakeResources {
    fn load_asset(&mut self, request: LoadAssetRequest) {
        let mut log = self.0.borrow_mut();
        if let Some(length) = log.auto_complete {
            log.complete(request.serial_id, &request.asset_name, length);
        }
        log.requests.push(request);
    }

    fn cancel_load(&mut self, serial_id: SerialId) -> bool {
        let mut log = self.0.borrow_mut();
        log.cancelled.push(serial_id);
        !log.drops_cancelled
    }

    fn poll_events(&mut self) -> Vec<LoadAssetEvent> {
        std::mem::take(&mut self.0.borrow_mut().queued)
    }
}

/// State of one fake playback channel
#[derive(Debug, Default)]
pub struct ChannelLog {
    pub asset: Option<String>,
    pub playing: bool,
    pub paused: bool,
    pub volume: f32,
    pub mute: bool,
    pub finished: bool,
    pub plays: usize,
}

/// What the fake sound helper saw
#[derive(Default)]
pub struct BackendLog {
    pub released: Vec<String>,
    pub group_mutes: Vec<(String, bool)>,
    pub group_volumes: Vec<(String, f32)>,
    pub reject_assets: HashSet<String>,
    pub channels: HashMap<String, Vec<Rc<RefCell<ChannelLog>>>>,
}

pub struct FakeSoundHelper(pub Rc<RefCell<BackendLog>>);

impl SoundHelper for FakeSoundHelper {
    fn create_group_helper(&mut self, group_name: &str) -> Box<dyn SoundGroupHelper> {
        Box::new(FakeGroupHelper {
            name: group_name.to_string(),
            log: Rc::clone(&self.0),
        })
    }

    fn create_agent_helper(
        &mut self,
        group_name: &str,
        _agent_index: usize,
    ) -> Result<Box<dyn SoundAgentHelper>, SoundError> {
        Ok(Box::new(fake_agent(&self.0, group_name)))
    }

    fn release_sound_asset(&mut self, asset: SoundAsset) {
        self.0.borrow_mut().released.push(asset.name().to_string());
    }
}

pub struct FakeGroupHelper {
    name: String,
    log: Rc<RefCell<BackendLog>>,
}

impl SoundGroupHelper for FakeGroupHelper {
    fn on_mute_changed(&mut self, mute: bool) {
        self.log.borrow_mut().group_mutes.push((self.name.clone(), mute));
    }

    fn on_volume_changed(&mut self, volume: f32) {
        self.log.borrow_mut().group_volumes.push((self.name.clone(), volume));
    }
}

pub struct FakeAgent {
    channel: Rc<RefCell<ChannelLog>>,
    log: Rc<RefCell<BackendLog>>,
}

pub fn fake_agent(log: &Rc<RefCell<BackendLog>>, group_name: &str) -> FakeAgent {
    let channel = Rc::new(RefCell::new(ChannelLog::default()));
    log.borrow_mut()
        .channels
        .entry(group_name.to_string())
        .or_default()
        .push(Rc::clone(&channel));
    FakeAgent {
        channel,
        log: Rc::clone(log),
    }
}

impl SoundAgentHelper for FakeAgent {
    fn set_sound_asset(&mut self, asset: &SoundAsset) -> Result<(), SoundError> {
        if self.log.borrow().reject_assets.contains(asset.name()) {
            return Err(SoundError::SetSoundAssetFailure {
                asset: asset.name().to_string(),
                reason: "unsupported".to_string(),
            });
        }
        self.channel.borrow_mut().asset = Some(asset.name().to_string());
        Ok(())
    }

    fn play(&mut self, _params: &PlaySoundParams) {
        let mut channel = self.channel.borrow_mut();
        channel.playing = true;
        channel.paused = false;
        channel.finished = false;
        channel.plays += 1;
    }

    fn stop(&mut self) {
        self.channel.borrow_mut().playing = false;
    }

    fn pause(&mut self) {
        self.channel.borrow_mut().paused = true;
    }

    fn resume(&mut self) {
        self.channel.borrow_mut().paused = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.channel.borrow_mut().volume = volume;
    }

    fn set_mute(&mut self, mute: bool) {
        self.channel.borrow_mut().mute = mute;
    }

    fn is_finished(&self) -> bool {
        self.channel.borrow().finished
    }

    fn reset(&mut self) {
        let mut channel = self.channel.borrow_mut();
        channel.asset = None;
        channel.playing = false;
        channel.paused = false;
    }
}

/// Event as seen by a listener
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Success { serial_id: SerialId, agent_index: usize, user_data: Option<u32> },
    Failure { serial_id: SerialId, error_code: PlaySoundErrorCode },
    Update { serial_id: SerialId, state: PlaybackState, effective_volume: f32 },
    Dependency { serial_id: SerialId, loaded_count: usize, total_count: usize },
}

impl Recorded {
    pub fn serial_id(&self) -> SerialId {
        match self {
            Self::Success { serial_id, .. }
            | Self::Failure { serial_id, .. }
            | Self::Update { serial_id, .. }
            | Self::Dependency { serial_id, .. } => *serial_id,
        }
    }
}

pub struct Harness {
    pub manager: SoundManager<u32>,
    pub resources: Rc<RefCell<ResourceLog>>,
    pub backend: Rc<RefCell<BackendLog>>,
    pub events: Rc<RefCell<Vec<Recorded>>>,
}

impl Harness {
    /// Manager with fakes wired in and every event recorded
    pub fn new() -> Self {
        let resources = Rc::new(RefCell::new(ResourceLog {
            auto_complete: Some(10.0),
            ..ResourceLog::default()
        }));
        let backend = Rc::new(RefCell::new(BackendLog::default()));
        let events = Rc::new(RefCell::new(Vec::new()));

        let mut manager = SoundManager::new();
        manager
            .set_resource_manager(Box::new(FakeResources(Rc::clone(&resources))))
            .unwrap();
        manager
            .set_sound_helper(Box::new(FakeSoundHelper(Rc::clone(&backend))))
            .unwrap();

        let log = Rc::clone(&events);
        manager.on_play_sound_success(move |args| {
            log.borrow_mut().push(Recorded::Success {
                serial_id: args.serial_id,
                agent_index: args.agent_index,
                user_data: args.user_data,
            });
        });
        let log = Rc::clone(&events);
        manager.on_play_sound_failure(move |args| {
            log.borrow_mut().push(Recorded::Failure {
                serial_id: args.serial_id,
                error_code: args.error_code,
            });
        });
        let log = Rc::clone(&events);
        manager.on_play_sound_update(move |args| {
            log.borrow_mut().push(Recorded::Update {
                serial_id: args.serial_id,
                state: args.state,
                effective_volume: args.effective_volume,
            });
        });
        let log = Rc::clone(&events);
        manager.on_play_sound_dependency_asset(move |args| {
            log.borrow_mut().push(Recorded::Dependency {
                serial_id: args.serial_id,
                loaded_count: args.loaded_count,
                total_count: args.total_count,
            });
        });

        Self {
            manager,
            resources,
            backend,
            events,
        }
    }

    /// Add a group through the fake backend with `agents` channels
    pub fn group(&mut self, name: &str, agents: usize, avoid_same_priority: bool) {
        let helper = FakeSoundHelper(Rc::clone(&self.backend)).create_group_helper(name);
        assert!(self
            .manager
            .add_sound_group_with(name, avoid_same_priority, false, 1.0, helper));
        for _ in 0..agents {
            let agent = fake_agent(&self.backend, name);
            self.manager.add_sound_agent_helper(name, Box::new(agent)).unwrap();
        }
    }

    pub fn play(&mut self, asset: &str, group: &str, priority: i32) -> SerialId {
        self.manager
            .play_sound(asset, group, PlaySoundParams::new().with_priority(priority), None)
            .unwrap()
    }

    pub fn channel(&self, group: &str, index: usize) -> Rc<RefCell<ChannelLog>> {
        Rc::clone(&self.backend.borrow().channels[group][index])
    }

    pub fn take_events(&self) -> Vec<Recorded> {
        std::mem::take(&mut self.events.borrow_mut())
    }

    /// Recorded events other than per-tick updates
    pub fn take_outcomes(&self) -> Vec<Recorded> {
        self.take_events()
            .into_iter()
            .filter(|event| !matches!(event, Recorded::Update { .. }))
            .collect()
    }
}
