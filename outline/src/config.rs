//! Host-tunable options. Both structs deserialize from partial JSON, missing
//! fields falling back to their defaults.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Derive continuity tags from control geometry on imported Beziers.
    pub guess_continuity: bool,
    /// Append layers that end up empty instead of reporting them.
    pub keep_empty_layers: bool,
    /// Name of the layer created for primitives appended outside any layer.
    pub default_layer_name: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        BuilderOptions {
            guess_continuity: false,
            keep_empty_layers: true,
            default_layer_name: "Layer 1".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Angle step (radians) for constrained node drags.
    pub node_angle_step: f64,
    /// Angle step (radians) for constrained control-point drags.
    pub handle_angle_step: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        EditorOptions { node_angle_step: PI / 4.0, handle_angle_step: PI / 12.0 }
    }
}
