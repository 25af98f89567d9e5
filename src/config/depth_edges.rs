use crate::camera::CameraIntrinsics;
use crate::edges::EdgeParams;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct DepthEdgesToolConfig {
    /// 16-bit grayscale PNG in millimetres.
    pub input: PathBuf,
    /// Missing intrinsics fall back to the default focal length.
    #[serde(default)]
    pub intrinsics: Option<CameraIntrinsics>,
    #[serde(default)]
    pub edges: EdgeParams,
    pub output: DepthEdgesOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DepthEdgesOutputConfig {
    pub edge_mask: PathBuf,
    /// Depth after the median pre-filter, 16-bit millimetres.
    #[serde(default)]
    pub filtered_depth: Option<PathBuf>,
    #[serde(default)]
    pub curvature_mask: Option<PathBuf>,
    #[serde(default)]
    pub occlusion_mask: Option<PathBuf>,
    #[serde(default)]
    pub normals_image: Option<PathBuf>,
    pub summary_json: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_default_params() {
        let cfg: DepthEdgesToolConfig = serde_json::from_str(
            r#"{
                "input": "frame.png",
                "output": { "edge_mask": "out/edges.png", "summary_json": "out/edges.json" }
            }"#,
        )
        .expect("valid config");
        assert!(cfg.intrinsics.is_none());
        assert_eq!(cfg.edges.curvature.high_threshold, 1.1);
        assert!(cfg.output.normals_image.is_none());
        assert!(cfg.output.filtered_depth.is_none());
    }

    #[test]
    fn overrides_nested_thresholds() {
        let cfg: DepthEdgesToolConfig = serde_json::from_str(
            r#"{
                "input": "frame.png",
                "intrinsics": { "fx": 572.4, "fy": 573.6, "cx": 325.3, "cy": 242.0 },
                "edges": { "curvature": { "low_threshold": 0.5 }, "occlusion": { "max_search_steps": 20 } },
                "output": { "edge_mask": "e.png", "summary_json": "e.json", "normals_image": "n.png" }
            }"#,
        )
        .expect("valid config");
        assert_eq!(cfg.intrinsics.map(|k| k.fx), Some(572.4));
        assert_eq!(cfg.edges.curvature.low_threshold, 0.5);
        assert_eq!(cfg.edges.curvature.high_threshold, 1.1);
        assert_eq!(cfg.edges.occlusion.max_search_steps, 20);
        assert_eq!(cfg.edges.normals.radius, 5);
    }
}
