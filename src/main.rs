//! Botforge headless battle runner.
//!
//! Builds two robot designs from the stock component catalog, spawns a group
//! of robots for two players and lets them drive around the battlefield under
//! random move orders until the requested number of ticks has run.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 600 --robots 4 --seed 7
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use log::{error, info, warn};

use botforge::components::node::NodeId;
use botforge::components::robotgroup::RobotModelGroup;
use botforge::components::robotmodel::RobotModel;
use botforge::error::{EngineError, Result};
use botforge::events::command::Command;
use botforge::events::director::DirectorEvent;
use botforge::resources::battlefield::Battlefield;
use botforge::resources::catalog::ModelCatalog;
use botforge::resources::director::GameDirector;
use botforge::resources::editsession::EditSession;
use botforge::resources::gameconfig::GameConfig;
use botforge::resources::player::PlayerId;

#[derive(Parser)]
#[command(version, about = "Headless robot battle simulation")]
struct Cli {
    /// Configuration file (INI). Defaults are used if it cannot be read.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Robots spawned per player.
    #[arg(long, default_value_t = 3)]
    robots: usize,

    /// Seed for spawn positions and move orders.
    #[arg(long)]
    seed: Option<u64>,
}

fn scout(catalog: &ModelCatalog, config: &GameConfig) -> Result<RobotModel> {
    let part = |id: &str| {
        catalog
            .get(id)
            .ok_or_else(|| EngineError::Config(format!("unknown component '{}'", id)))
    };
    let mut edit = EditSession::new(RobotModel::new("scout", Vec::new()), config);
    edit.symmetric = true;
    edit.put_component(part("wheels")?, 2, 5)?;
    edit.put_component(part("armor_block")?, 3, 4)?;
    edit.symmetric = false;
    edit.put_component(part("weapon_mount")?, 3, 3)?;
    edit.put_component(part("cannon")?, 3, 3)?;
    Ok(edit.into_model())
}

fn tank(catalog: &ModelCatalog, config: &GameConfig) -> Result<RobotModel> {
    let part = |id: &str| {
        catalog
            .get(id)
            .ok_or_else(|| EngineError::Config(format!("unknown component '{}'", id)))
    };
    let mut edit = EditSession::new(RobotModel::new("tank", Vec::new()), config);
    edit.symmetric = true;
    edit.put_component(part("tracks")?, 1, 5)?;
    edit.put_component(part("armor_block")?, 2, 3)?;
    edit.put_component(part("weapon_mount")?, 3, 2)?;
    edit.put_component(part("cannon")?, 3, 2)?;
    Ok(edit.into_model())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    let mut rng = cli.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    let catalog = ModelCatalog::builtin();
    let group = RobotModelGroup::new([scout(&catalog, &config)?, tank(&catalog, &config)?], &config);
    for model in &group {
        let violations = model.verify();
        if !violations.is_empty() {
            for violation in &violations {
                error!("design '{}': {}", model.name(), violation);
            }
            return Err(EngineError::Config(format!("design '{}' is invalid", model.name())));
        }
        info!(
            "design '{}': health={} price={} max_speed={} turn_speed={}",
            model.name(),
            model.health(),
            model.price(),
            model.max_speed(),
            model.turn_speed()
        );
    }
    let designs: Vec<Arc<RobotModel>> = group.iter().cloned().map(Arc::new).collect();

    let field = Battlefield::from_config("skirmish", &config);
    let (width, height) = (field.width, field.height);
    let mut director = GameDirector::new(field, &config);

    let stop = director.stop_handle();
    let ticks = cli.ticks;
    let report_every = u64::from(config.target_tps).max(1);
    let mut rendered = 0u64;
    director.set_render(move |nodes, lag| {
        rendered += 1;
        if rendered % report_every == 0 {
            let moving = nodes
                .iter()
                .filter(|node| node.robot_state().is_some_and(|robot| robot.speed > 0.0))
                .count();
            info!(
                "frame {}: {} node(s), {} moving, lag {:?}",
                rendered,
                nodes.len(),
                moving,
                lag
            );
        }
        if rendered >= ticks {
            stop.stop();
        }
    });

    let players = [PlayerId(1), PlayerId(2)];
    let spawner = director.node_queue();
    for (side, &player) in players.iter().enumerate() {
        for i in 0..cli.robots {
            let model = designs[i % designs.len()].clone();
            let x = if side == 0 { width * 0.1 } else { width * 0.9 };
            let y = rng.f64() * height;
            spawner.spawn_robot(model, player, x, y, &config);
        }
    }

    // move orders come from the runner, not from either side
    let referee = PlayerId(0);
    let handle = director.spawn()?;
    let mut robots: Vec<NodeId> = Vec::new();
    loop {
        match handle.events().recv_timeout(Duration::from_millis(250)) {
            Ok(DirectorEvent::NodeAdded { id, parent: None }) => {
                robots.push(id);
                handle.command(Command::move_to(referee, id, rng.f64() * width, rng.f64() * height));
            }
            Ok(DirectorEvent::Stopped { frames }) => {
                info!("battle ended after {} frame(s)", frames);
                break;
            }
            Ok(DirectorEvent::UpdateFailed { node, frame, error }) => {
                warn!("node {} skipped frame {}: {}", node, frame, error);
            }
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => {
                // the Stopped event can be lost if the event channel was full
                if handle.is_finished() {
                    warn!("director stopped without a Stopped event");
                    break;
                }
                if !robots.is_empty() {
                    let id = robots[rng.usize(..robots.len())];
                    handle.command(Command::move_to(referee, id, rng.f64() * width, rng.f64() * height));
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let director = handle.join()?;
    info!(
        "final state: {} node(s) after {} frame(s)",
        director.nodes().len(),
        director.frame()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
