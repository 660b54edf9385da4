//! Sound groups
//!
//! A group is a named pool of agents sharing mute, volume and a replacement
//! policy. It implements agent allocation with priority-based stealing when
//! every agent in the pool is busy.

use crate::audio::agent::{GroupMix, PlaybackState, SoundAgent};
use crate::audio::helpers::{SoundAgentHelper, SoundGroupHelper};
use crate::audio::spatial::SpatialAudio;
use crate::audio::{PlaySoundParams, SerialId, SoundAsset, SoundError};

/// Sound started by `SoundGroup::play_sound`
#[derive(Debug)]
pub(crate) struct PlaySoundOutcome {
    /// Agent now playing the sound
    pub agent_index: usize,
    /// Serial id of the sound that was stolen from, if any
    pub evicted: Option<SerialId>,
    /// Previous occupant of the agent, to unmap and release
    pub released: Option<ReleasedSound>,
}

/// Sound refused by `SoundGroup::play_sound`
#[derive(Debug)]
pub(crate) struct PlaySoundRejection {
    /// Reason for the refusal
    pub error: SoundError,
    /// Asset to hand back to the sound helper
    pub asset: SoundAsset,
    /// Serial id evicted before the agent helper refused the asset
    pub evicted: Option<SerialId>,
    /// Previous occupant of the agent, to unmap and release
    pub released: Option<ReleasedSound>,
}

/// Asset freed by an agent returning to Idle
#[derive(Debug)]
pub(crate) struct ReleasedSound {
    /// Serial id that finished
    pub serial_id: SerialId,
    /// Asset the agent was holding
    pub asset: SoundAsset,
}

/// Named pool of agents with shared mix policy
///
/// Hosts reach a group through `SoundManager::sound_group_mut` to change its
/// mix and replacement policy. The agent pool itself is only changed by the
/// manager, which keeps its request map in step with it.
pub struct SoundGroup {
    name: String,
    avoid_being_replaced_by_same_priority: bool,
    mute: bool,
    volume: f32,
    helper: Box<dyn SoundGroupHelper>,
    agents: Vec<SoundAgent>,
}

impl SoundGroup {
    /// Create an empty group
    pub(crate) fn new(
        name: impl Into<String>,
        avoid_being_replaced_by_same_priority: bool,
        mute: bool,
        volume: f32,
        helper: Box<dyn SoundGroupHelper>,
    ) -> Self {
        Self {
            name: name.into(),
            avoid_being_replaced_by_same_priority,
            mute,
            volume: volume.clamp(0.0, 1.0),
            helper,
            agents: Vec::new(),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether sounds of equal priority are protected from replacement
    pub fn avoid_being_replaced_by_same_priority(&self) -> bool {
        self.avoid_being_replaced_by_same_priority
    }

    /// Change the same-priority replacement rule
    pub fn set_avoid_being_replaced_by_same_priority(&mut self, avoid: bool) {
        self.avoid_being_replaced_by_same_priority = avoid;
    }

    /// Group mute state
    pub fn mute(&self) -> bool {
        self.mute
    }

    /// Mute or unmute every agent in the group
    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
        self.helper.on_mute_changed(mute);
        self.refresh_agents();
    }

    /// Group volume (0.0 to 1.0)
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set group volume, clamped to 0.0..=1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.helper.on_volume_changed(self.volume);
        self.refresh_agents();
    }

    /// Current group mix
    pub fn mix(&self) -> GroupMix {
        GroupMix {
            mute: self.mute,
            volume: self.volume,
        }
    }

    fn refresh_agents(&mut self) {
        let mix = self.mix();
        for agent in self.agents.iter_mut().filter(|agent| agent.is_busy()) {
            agent.refresh(mix);
        }
    }

    /// Number of agents owned
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of agents holding a sound
    pub fn busy_agent_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_busy()).count()
    }

    /// Agents in pool order
    pub fn agents(&self) -> impl Iterator<Item = &SoundAgent> {
        self.agents.iter()
    }

    /// Agent by index
    pub fn agent(&self, index: usize) -> Option<&SoundAgent> {
        self.agents.get(index)
    }

    /// Append a playback channel, returning its index
    pub(crate) fn add_agent_helper(&mut self, helper: Box<dyn SoundAgentHelper>) -> usize {
        let index = self.agents.len();
        self.agents.push(SoundAgent::new(index, helper));
        index
    }

    /// Agent currently controlling a serial id
    pub fn find_agent(&self, serial_id: SerialId) -> Option<&SoundAgent> {
        self.agents
            .iter()
            .find(|agent| agent.active_serial_id() == Some(serial_id))
    }

    fn find_agent_mut(&mut self, serial_id: SerialId) -> Option<&mut SoundAgent> {
        self.agents
            .iter_mut()
            .find(|agent| agent.active_serial_id() == Some(serial_id))
    }

    /// State of the agent bound to a serial id, including a just-stopped one
    pub fn sound_state(&self, serial_id: SerialId) -> Option<PlaybackState> {
        self.agents
            .iter()
            .find(|agent| agent.serial_id() == Some(serial_id))
            .map(SoundAgent::state)
    }

    /// Pick the agent for a request of the given priority
    ///
    /// A free agent wins outright. Otherwise the busy agent with the lowest
    /// priority below `priority` is chosen; agents at exactly `priority` are
    /// candidates only when same-priority replacement is allowed. Among equal
    /// priorities the sound that started first goes.
    pub fn select_agent(&self, priority: i32) -> Option<usize> {
        if let Some(free) = self.agents.iter().position(SoundAgent::is_available) {
            return Some(free);
        }

        self.agents
            .iter()
            .filter(|agent| {
                agent.priority() < priority
                    || (!self.avoid_being_replaced_by_same_priority && agent.priority() == priority)
            })
            .min_by_key(|agent| (agent.priority(), agent.sequence()))
            .map(SoundAgent::index)
    }

    /// Start a loaded sound on the best agent, stealing one if needed
    ///
    /// # Errors
    /// `NoAgent` for an empty pool, `CapacityExceeded` when no agent is
    /// eligible, or the agent helper's error when it refuses the asset.
    /// The asset is handed back in every case.
    pub(crate) fn play_sound(
        &mut self,
        serial_id: SerialId,
        asset: SoundAsset,
        params: PlaySoundParams,
        sequence: u64,
        spatial: &SpatialAudio,
    ) -> Result<PlaySoundOutcome, PlaySoundRejection> {
        if self.agents.is_empty() {
            return Err(PlaySoundRejection {
                error: SoundError::NoAgent(self.name.clone()),
                asset,
                evicted: None,
                released: None,
            });
        }

        let Some(index) = self.select_agent(params.priority) else {
            return Err(PlaySoundRejection {
                error: SoundError::CapacityExceeded {
                    group: self.name.clone(),
                    priority: params.priority,
                },
                asset,
                evicted: None,
                released: None,
            });
        };

        let mix = self.mix();
        let agent = &mut self.agents[index];

        let was_busy = agent.is_busy();
        let previous = agent.evict();
        let evicted = if was_busy {
            previous.as_ref().map(|(victim, _)| *victim)
        } else {
            None
        };
        let released = previous.and_then(|(serial_id, asset)| {
            asset.map(|asset| ReleasedSound { serial_id, asset })
        });

        match agent.start(serial_id, asset, params, sequence, mix, spatial) {
            Ok(()) => Ok(PlaySoundOutcome {
                agent_index: index,
                evicted,
                released,
            }),
            Err(rejected) => Err(PlaySoundRejection {
                error: rejected.error,
                asset: rejected.asset,
                evicted,
                released,
            }),
        }
    }

    /// Stop the sound with this serial id
    pub(crate) fn stop_sound(&mut self, serial_id: SerialId, fade_out_seconds: f32) -> bool {
        let mix = self.mix();
        self.find_agent_mut(serial_id)
            .is_some_and(|agent| agent.stop(fade_out_seconds, mix))
    }

    /// Pause the sound with this serial id
    pub(crate) fn pause_sound(&mut self, serial_id: SerialId, fade_out_seconds: f32) -> bool {
        let mix = self.mix();
        self.find_agent_mut(serial_id)
            .is_some_and(|agent| agent.pause(fade_out_seconds, mix))
    }

    /// Resume the sound with this serial id
    pub(crate) fn resume_sound(&mut self, serial_id: SerialId, fade_in_seconds: f32) -> bool {
        let mix = self.mix();
        self.find_agent_mut(serial_id)
            .is_some_and(|agent| agent.resume(fade_in_seconds, mix))
    }

    /// Stop every sound in the group, returning how many were stopped
    pub(crate) fn stop_all_sounds(&mut self, fade_out_seconds: f32) -> usize {
        let mix = self.mix();
        self.agents
            .iter_mut()
            .filter(|agent| agent.is_busy())
            .map(|agent| agent.stop(fade_out_seconds, mix))
            .filter(|stopped| *stopped)
            .count()
    }

    /// Advance every agent one tick, collecting assets freed this tick
    pub(crate) fn update(&mut self, elapse_seconds: f32, spatial: &SpatialAudio) -> Vec<ReleasedSound> {
        let mix = self.mix();
        let mut released = Vec::new();
        for agent in &mut self.agents {
            let serial_id = agent.serial_id();
            if let Some(asset) = agent.update(elapse_seconds, mix, spatial) {
                if let Some(serial_id) = serial_id {
                    released.push(ReleasedSound { serial_id, asset });
                }
            }
        }
        released
    }

    /// Reset every agent immediately, returning the assets they held
    pub(crate) fn clear(&mut self) -> Vec<SoundAsset> {
        self.agents
            .iter_mut()
            .filter_map(|agent| agent.evict().and_then(|(_, asset)| asset))
            .collect()
    }
}
