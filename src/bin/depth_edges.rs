use pose_refine::config::depth_edges::DepthEdgesToolConfig;
use pose_refine::config::load_config;
use pose_refine::diagnostics::EdgeReport;
use pose_refine::edges::DepthEdgeExtractor;
use pose_refine::image::io::{
    load_depth_png, save_depth_png, save_mask_png, save_normals_png, write_json_file,
};
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
    let config: DepthEdgesToolConfig = load_config(Path::new(&config_path))?;
    if let Some(k) = &config.intrinsics {
        k.check()?;
    }
    config.edges.validate()?;

    let depth = load_depth_png(&config.input)?;
    let extractor = DepthEdgeExtractor::new(config.edges.clone());
    let result = extractor.extract_detailed(&depth, config.intrinsics.as_ref());
    let report = EdgeReport::from_edges(&result);

    save_mask_png(&result.edges, &config.output.edge_mask)?;
    if let Some(path) = &config.output.curvature_mask {
        save_mask_png(&result.curvature, path)?;
    }
    if let Some(path) = &config.output.occlusion_mask {
        save_mask_png(&result.occlusion, path)?;
    }
    if let Some(path) = &config.output.filtered_depth {
        save_depth_png(&result.filtered_depth, path)?;
    }
    if let Some(path) = &config.output.normals_image {
        save_normals_png(&result.normals, path)?;
    }
    write_json_file(&config.output.summary_json, &report)?;

    println!(
        "Depth {}x{}: {} edge pixels ({} curvature, {} occlusion) in {:.2} ms",
        report.width,
        report.height,
        report.edges,
        report.curvature_edges,
        report.occlusion_edges,
        report.timing.total_ms
    );
    println!("Saved edge mask to {}", config.output.edge_mask.display());
    println!("Saved summary to {}", config.output.summary_json.display());
    Ok(())
}

fn usage() -> String {
    "Usage: depth_edges <config.json>".to_string()
}
