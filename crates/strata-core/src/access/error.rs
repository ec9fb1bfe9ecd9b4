//! # Strata Access Control Errors
//!
//! Defines [`AccessError`], raised synchronously when a component declares a
//! dependency the layer or visibility policy forbids. These errors are fatal
//! for the construction that triggered them and are never retried.
use thiserror::Error;

use crate::access::layer::Layer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error(
        "Layer {parent_layer} is not allowed to inject {target_layer} ({parent} -> {target}). \
         Allowed parent layers for {target_layer}: {}",
        display_layers(.allowed)
    )]
    LayerViolation {
        parent: &'static str,
        parent_layer: Layer,
        target: &'static str,
        target_layer: Layer,
        allowed: Vec<Layer>,
    },

    #[error(
        "Cross-module {target_layer} dependency is not allowed. Use a Facade or Resource. \
         (Tried to inject a {target_layer} from {target_module} into {parent_module})"
    )]
    CrossModuleViolation {
        parent_module: &'static str,
        target: &'static str,
        target_module: &'static str,
        target_layer: Layer,
    },

    #[error("Unknown layer '{name}'")]
    UnknownLayer { name: String },

    #[error("Unknown visibility '{name}'")]
    UnknownVisibility { name: String },
}

fn display_layers(layers: &[Layer]) -> String {
    if layers.is_empty() {
        return "none".to_string();
    }
    layers
        .iter()
        .map(|layer| layer.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
