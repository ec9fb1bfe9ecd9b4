use crate::access::error::AccessError;
use crate::kernel::component::Descriptor;

/// Runtime check run whenever `parent` declares a dependency on `target`.
///
/// The layer rule is checked first: the layer `parent` injects as (see
/// [`Layer::injects_as`](crate::access::Layer::injects_as)) must appear in
/// `target.allowed_parents`. Then, if the two live in different modules, the
/// target must be globally visible.
pub fn check_dependency(parent: &Descriptor, target: &Descriptor) -> Result<(), AccessError> {
    let acting = parent.layer.injects_as();
    if !target.allowed_parents.contains(&acting) {
        log::debug!(
            "Rejected {} -> {}: layer {} not in {:?}",
            parent.name,
            target.name,
            acting,
            target.allowed_parents
        );
        return Err(AccessError::LayerViolation {
            parent: parent.name,
            parent_layer: acting,
            target: target.name,
            target_layer: target.layer,
            allowed: target.allowed_parents.to_vec(),
        });
    }

    if parent.module != target.module && !target.visibility.is_global() {
        log::debug!(
            "Rejected {} -> {}: {} is {} to module {}",
            parent.name,
            target.name,
            target.name,
            target.visibility,
            target.module
        );
        return Err(AccessError::CrossModuleViolation {
            parent_module: parent.module,
            target: target.name,
            target_module: target.module,
            target_layer: target.layer,
        });
    }

    Ok(())
}
