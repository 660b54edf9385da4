//! Headless sound engine demo
//!
//! Builds a sound manager from `config/sound.ron` (or the path given as the
//! first argument), plays a scripted burst of sounds on a 60 Hz tick and
//! logs every lifecycle event. Run with `RUST_LOG=debug` to see agent
//! allocation and stealing.

use sound_engine::prelude::*;
use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

const TICK: f32 = 1.0 / 60.0;
const SAMPLE_RATE: u32 = 22_050;

/// Mono 16-bit PCM WAV containing a sine tone
fn sine_wav(frequency: f32, seconds: f32) -> Vec<u8> {
    let samples = (seconds * SAMPLE_RATE as f32) as u32;
    let data_len = samples * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());

    for n in 0..samples {
        let t = n as f32 / SAMPLE_RATE as f32;
        let sample = ((TAU * frequency * t).sin() * 0.3 * f32::from(i16::MAX)) as i16;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

fn resources() -> MemoryResourceManager {
    let mut resources = MemoryResourceManager::new().with_latency(3);
    resources.register("theme", sine_wav(220.0, 2.0), Some(2.0));
    resources.register("laser", sine_wav(880.0, 0.3), Some(0.3));
    resources.register("explosion", sine_wav(110.0, 1.2), Some(1.2));
    resources.register("explosion_bank", sine_wav(55.0, 0.1), Some(0.1));
    resources.register("click", sine_wav(1_760.0, 0.05), Some(0.05));
    resources.add_dependency("explosion", "explosion_bank");
    resources
}

#[derive(Default)]
struct Tally {
    success: usize,
    failure: usize,
    updates: usize,
}

fn run_ticks(manager: &mut SoundManager<&'static str>, seconds: f32) {
    let ticks = (seconds / TICK).round() as u32;
    for _ in 0..ticks {
        manager.update(TICK);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    sound_engine::foundation::logging::init_with_level(log::LevelFilter::Info);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/config/sound.ron").to_string());
    let config = SoundConfig::load_from_file(&path)?;
    log::info!("Loaded sound config from {} ({} agents)", path, config.total_agent_count());

    let mut manager: SoundManager<&'static str> = SoundManager::new();
    manager.set_resource_manager(Box::new(resources()))?;
    manager.set_sound_helper(create_sound_helper(config.backend)?)?;
    manager.apply_config(&config)?;

    let tally = Rc::new(RefCell::new(Tally::default()));
    {
        let tally = Rc::clone(&tally);
        manager.on_play_sound_success(move |args| {
            tally.borrow_mut().success += 1;
            log::info!(
                "{} '{}' started on {}[{}] after {:.2}s ({:?})",
                args.serial_id,
                args.sound_asset_name,
                args.sound_group_name,
                args.agent_index,
                args.duration,
                args.user_data
            );
        });
    }
    {
        let tally = Rc::clone(&tally);
        manager.on_play_sound_failure(move |args| {
            tally.borrow_mut().failure += 1;
            log::warn!("{} '{}' failed: {:?} ({})", args.serial_id, args.sound_asset_name, args.error_code, args.error_message);
        });
    }
    {
        let tally = Rc::clone(&tally);
        manager.on_play_sound_update(move |_| tally.borrow_mut().updates += 1);
    }
    manager.on_play_sound_dependency_asset(|args| {
        log::info!(
            "{} '{}' loaded dependency '{}' ({}/{})",
            args.serial_id,
            args.sound_asset_name,
            args.dependency_asset_name,
            args.loaded_count,
            args.total_count
        );
    });

    let theme = manager.play_sound(
        "theme",
        "music",
        PlaySoundParams::new().with_loop(true).with_fade_in(1.0).with_priority(10),
        Some("theme"),
    )?;

    // More lasers than sfx agents: later, higher-priority shots steal.
    // Shots alternate between the left and right guns.
    for (shot, priority) in [0, 0, 1, 1, 2, 3].into_iter().enumerate() {
        let pan = if shot % 2 == 0 { -0.7 } else { 0.7 };
        let params = PlaySoundParams::new().with_priority(priority).with_pan(pan);
        manager.play_sound("laser", "sfx", params, Some("laser"))?;
        log::debug!("Fired laser {} at priority {}", shot, priority);
        run_ticks(&mut manager, 0.05);
    }

    let explosion = manager.play_sound(
        "explosion",
        "sfx",
        PlaySoundParams::new()
            .with_priority(5)
            .with_position(Vec3::new(12.0, 0.0, 0.0)),
        Some("explosion"),
    )?;
    manager.set_listener_position(Vec3::new(4.0, 0.0, 0.0));

    // Cancelled while loading: no events for this one.
    let cancelled = manager.play_sound("click", "ui", PlaySoundParams::new(), Some("click"))?;
    manager.stop_sound(cancelled, 0.0);

    run_ticks(&mut manager, 1.0);
    log::info!("Explosion is {:?}", manager.playback_state(explosion));

    manager.pause_sound(theme, 0.5);
    run_ticks(&mut manager, 0.5);
    manager.resume_sound(theme, 0.5);
    run_ticks(&mut manager, 0.5);

    manager.stop_sound(theme, 1.0);
    run_ticks(&mut manager, 1.5);

    let tally = tally.borrow();
    log::info!(
        "Done: {} started, {} failed, {} update events",
        tally.success,
        tally.failure,
        tally.updates
    );
    manager.shutdown();
    Ok(())
}
