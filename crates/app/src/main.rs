//! Entry point: watch a model directory and keep one proxy per OBJ file.

use std::{
    cell::RefCell, collections::HashMap, path::PathBuf, rc::Rc, thread, time::Duration,
};

use anyhow::Result;
use proxy::{
    ColliderSet, DirectoryWatcher, Entity, ProxyConfig, ProxyWorld, SyncReport, attach_colliders,
};

struct Args {
    dir: PathBuf,
    poll_ms: u64,
    /// 0 = poll forever.
    polls: u64,
    config: ProxyConfig,
}

fn parse_args() -> Args {
    let mut args = Args {
        dir: PathBuf::from("assets/models"),
        poll_ms: 500,
        polls: 0,
        config: ProxyConfig::default(),
    };

    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--dir=") {
            args.dir = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--volume=") {
            match v.parse::<f32>() {
                Ok(volume) if volume.is_finite() && volume > 0.0 => args.config.volume = volume,
                _ => log::warn!("Ignoring invalid volume '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--poll-ms=") {
            match v.parse::<u64>() {
                Ok(ms) => args.poll_ms = ms.max(1),
                Err(_) => log::warn!("Ignoring invalid poll interval '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--polls=") {
            match v.parse::<u64>() {
                Ok(n) => args.polls = n,
                Err(_) => log::warn!("Ignoring invalid poll count '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--ext=") {
            args.config.extension = v.trim_start_matches('.').to_string();
        } else if arg == "--real" {
            args.config.start_in_proxy_mode = false;
        } else {
            log::warn!("Unknown argument '{}'", arg);
        }
    }
    args
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    log::info!(
        "Watching {} every {}ms (volume={}, proxy_mode={}, ext=.{})",
        args.dir.display(),
        args.poll_ms,
        args.config.volume,
        args.config.start_in_proxy_mode,
        args.config.extension
    );

    let watcher = DirectoryWatcher::new(&args.dir, args.config.extension.clone());
    let mut world = ProxyWorld::new(args.config);

    let colliders: Rc<RefCell<HashMap<Entity, Rc<RefCell<ColliderSet>>>>> = Rc::default();
    let registry = Rc::clone(&colliders);
    world.set_spawn_hook(move |e, proxy| {
        registry.borrow_mut().insert(e, attach_colliders(proxy));
    });

    let mut poll = 0u64;
    loop {
        let report = match watcher.poll(&mut world) {
            Ok(report) => report,
            Err(err) => {
                log::warn!("Poll of {} failed: {:#}", watcher.dir().display(), err);
                SyncReport::default()
            }
        };
        for path in &report.removed {
            log::info!("Model removed: {}", path.display());
        }
        colliders.borrow_mut().retain(|e, _| world.is_alive(*e));

        for e in &report.added {
            if let Some(proxy) = world.get(*e) {
                let active = colliders
                    .borrow()
                    .get(e)
                    .map(|set| set.borrow().active());
                log::info!(
                    "[{}] {}: {:?}, scale {:.3}, collider {:?}",
                    e,
                    proxy.name(),
                    proxy.load_state(),
                    proxy.display_scale().x,
                    active
                );
            }
        }

        poll += 1;
        if args.polls != 0 && poll >= args.polls {
            break;
        }
        thread::sleep(Duration::from_millis(args.poll_ms));
    }

    let failed = world.iter().filter(|(_, p)| p.is_load_failed()).count();
    log::info!(
        "Stopped after {} polls: {} proxies, {} failed to load",
        poll,
        world.len(),
        failed
    );
    Ok(())
}
