use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::state::app::StatesPlugin;
use clap::Parser;
use orbitrail::cli::{self, Args};
use orbitrail::plugins::simulation::SimulationPlugin;
use orbitrail::plugins::trails::TrailsPlugin;
use orbitrail::prelude::*;
use std::time::{Duration, Instant};

fn main() -> AppExit {
    let args = Args::parse();

    if args.list_integrators {
        cli::handle_list_integrators();
        return AppExit::Success;
    }

    let config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };

    if args.save_config {
        return match config.save_to_user_config() {
            Ok(path) => {
                println!("Configuration saved to {}", path.display());
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Error: failed to save configuration: {e}");
                AppExit::error()
            }
        };
    }

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let tick_rate_hz = config.runtime.tick_rate_hz;

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / tick_rate_hz,
        ))),
        StatesPlugin,
        LogPlugin {
            level: log_level,
            ..default()
        },
    ));
    app.insert_resource(Time::<Fixed>::from_hz(tick_rate_hz));

    if args.paused {
        if args.batch {
            warn!("Ignoring --paused in batch mode");
        } else {
            app.insert_state(AppState::Paused);
        }
    }

    app.add_plugins((SimulationPlugin::new(config), TrailsPlugin));

    if args.batch {
        run_batch(&mut app)
    } else {
        app.run()
    }
}

/// Drive `FixedUpdate` directly, without waiting on the wall clock
fn run_batch(app: &mut App) -> AppExit {
    app.finish();
    app.cleanup();

    let started = Instant::now();
    loop {
        if let Some(exit) = app.should_exit() {
            return exit;
        }
        if app.world().resource::<Simulation>().clock().is_finished() {
            break;
        }
        app.world_mut().run_schedule(FixedUpdate);
    }

    let simulation = app.world().resource::<Simulation>();
    info!(
        "Batch run of {} steps finished in {:.2?}",
        simulation.clock().steps(),
        started.elapsed()
    );
    AppExit::Success
}
