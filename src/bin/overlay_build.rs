use color_overlays::config::{load_config, PipelineConfig};
use color_overlays::convert::{HvcTriple, PassThrough};
use color_overlays::io::{load_samples_json, write_json_file};
use color_overlays::types::SampleRecord;
use color_overlays::OverlayPipeline;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config: PipelineConfig = load_config(Path::new(&config_path))?;

    let records: Vec<SampleRecord<HvcTriple>> =
        load_samples_json(&config.input).map_err(|e| e.to_string())?;
    println!(
        "Loaded {} samples from {}",
        records.len(),
        config.input.display()
    );

    let pipeline = OverlayPipeline::new(config.resolve_params()).map_err(|e| e.to_string())?;
    let report = pipeline.run(&records, &PassThrough);
    report.print_text_summary();

    let out = config.output.report_path();
    write_json_file(&out, &report).map_err(|e| e.to_string())?;
    println!("Wrote overlay report to {}", out.display());
    Ok(())
}

fn usage() -> String {
    "Usage: overlay_build <config.json>".to_string()
}
