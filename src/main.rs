use anyhow::Result;
use std::time::Instant;
use std::fs::File;
use std::io::Write;
use log::{info, warn, error, debug, trace};

use orbit_common::{SimulationConfig, Snapshot};
use orbit_sim::scene_codec::{self, LoadedScene};
use orbit_sim::{generator, Simulation, Viewport};

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Orbit Simulation...");

    // --- Load Configuration ---
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = SimulationConfig::load(&config_path)?;
    let params = config.get_sim_params();
    debug!("Simulation Parameters: {:#?}", params);

    if params.parallel_forces {
        info!("Using {} Rayon threads for force evaluation.", rayon::current_num_threads());
    }

    // --- Load or Generate Scene ---
    let loaded = load_scene(&config)?;
    if !loaded.warnings.is_empty() {
        warn!("Scene loaded with {} warning(s).", loaded.warnings.len());
    }
    let viewport = config.viewport.map(|vp| Viewport::fit(&loaded.scene, vp.width, vp.height));
    if let Some(vp) = &viewport {
        info!("Viewport {}x{} px, scale factor {:.4e} px/unit.", vp.width, vp.height, vp.scale_factor);
    }

    let mut sim = Simulation::new(params.clone(), loaded.scene)?;
    info!("Scene initialized with {} bodies ({} engine).", sim.scene().len(), sim.engine_name());

    // --- Simulation Loop ---
    let total_steps = params.total_steps;
    let record_interval_steps = params.record_interval_steps;
    let save_positions_in_snapshot = config.output.save_positions_in_snapshot;
    info!("Recording snapshot every {} steps ({:.3} time units).", record_interval_steps, record_interval_steps as f64 * params.dt);

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // --- Initial Snapshot (time = 0) ---
    sim.record_snapshot(save_positions_in_snapshot);

    sim.start();
    for step in 0..total_steps {
        let step_start_time = Instant::now();
        if let Err(e) = sim.step() {
            error!("Error during simulation step {}: {}", step + 1, e);
            sim.stop();
            anyhow::bail!("Simulation step failed.");
        }
        let step_duration = step_start_time.elapsed();

        // Print status periodically
        let current_time = Instant::now();
        let print_interval_secs = 5.0;
        let should_print_status = current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_step = (step + 1) % record_interval_steps == 0;
        let is_last_step = step == total_steps - 1;

        if should_print_status || is_record_step || is_last_step {
            info!(
                "Step [{}/{}] (t = {:.3}) | Bodies: {} | Step Time: {:6.3} ms | Elapsed: {:.2} s",
                step + 1,
                total_steps,
                sim.physical_time(),
                sim.scene().len(),
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;

            if is_record_step || is_last_step {
                sim.record_snapshot(save_positions_in_snapshot);
            }
        } else {
            trace!(
                "Step [{}/{}] completed in {:.3} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }
    sim.stop();

    let total_duration = start_time.elapsed();
    info!("Simulation finished in {:.3} seconds (t = {:.3}).", total_duration.as_secs_f64(), sim.physical_time());

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    let base = &config.output.base_filename;
    if config.output.save_stats {
        let output_format = config.output.format.as_deref().unwrap_or("json");
        save_snapshots(base, output_format, sim.get_recorded_snapshots());
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }

    if config.output.save_positions {
        let filename = format!("{}_final_positions.csv", base);
        match save_positions_csv(&filename, &sim, viewport.as_ref()) {
            Ok(()) => info!("Final positions saved to {}", filename),
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping saving final positions as per config.");
    }

    if config.output.save_scene {
        let filename = format!("{}_final_scene.txt", base);
        match scene_codec::save_file(&filename, sim.scene()) {
            Ok(()) => info!("Final scene saved to {}", filename),
            Err(e) => error!("{}", e),
        }
    }

    info!("Simulation Complete.");
    Ok(())
}

fn load_scene(config: &SimulationConfig) -> Result<LoadedScene> {
    if let Some(path) = &config.scene.path {
        info!("Loading scene from {}...", path.display());
        return scene_codec::load_file(path);
    }
    match &config.scene.generate {
        Some(generate) => generator::generate_scene(generate, config.engine.gravitational_constant),
        None => anyhow::bail!("No scene source configured."),
    }
}

fn save_snapshots(base: &str, output_format: &str, snapshots: &[Snapshot]) {
    match output_format {
        "json" => write_json(base, snapshots),
        "bincode" => {
            // Binary format (much more compact)
            let filename = format!("{}_snapshots.bin", base);
            match File::create(&filename) {
                Ok(file) => match bincode::serialize_into(file, snapshots) {
                    Ok(_) => info!("All snapshots saved to {} (binary format)", filename),
                    Err(e) => error!("Error serializing snapshots to bincode: {}", e),
                },
                Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
            }
        }
        "messagepack" => {
            let filename = format!("{}_snapshots.msgpack", base);
            match &mut File::create(&filename) {
                Ok(file) => match rmp_serde::encode::write(file, snapshots) {
                    Ok(_) => info!("All snapshots saved to {} (MessagePack format)", filename),
                    Err(e) => error!("Error serializing snapshots to MessagePack: {}", e),
                },
                Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
            }
        }
        _ => {
            error!("Unknown output format: {}. Using JSON instead.", output_format);
            write_json(base, snapshots);
        }
    }
}

fn write_json(base: &str, snapshots: &[Snapshot]) {
    let filename = format!("{}_snapshots.json", base);
    match File::create(&filename) {
        Ok(mut file) => match serde_json::to_string(snapshots) {
            Ok(json_string) => {
                if let Err(e) = file.write_all(json_string.as_bytes()) {
                    error!("Error writing snapshot JSON to file '{}': {}", filename, e);
                } else {
                    info!("All snapshots saved to {} ({} KB)", filename, json_string.len() / 1024);
                }
            }
            Err(e) => error!("Error serializing snapshots to JSON: {}", e),
        },
        Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
    }
}

fn save_positions_csv(filename: &str, sim: &Simulation, viewport: Option<&Viewport>) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename)?;
    match viewport {
        Some(_) => writer.write_record(["kind", "x", "y", "screen_x", "screen_y"])?,
        None => writer.write_record(["kind", "x", "y"])?,
    }
    for body in sim.scene().iter() {
        let mut record = vec![
            body.kind().keyword().to_string(),
            format!("{:e}", body.position.x),
            format!("{:e}", body.position.y),
        ];
        if let Some(vp) = viewport {
            let (sx, sy) = vp.to_screen(body.position);
            record.push(sx.to_string());
            record.push(sy.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
