//! Side effects.

use std::rc::Rc;

use tracing::trace;

use super::existing_slot;
use crate::runtime::queue_effect;

struct EffectSlot<D> {
    deps: D,
}

/// Run `effect` after the current render pass completes, on the first
/// render and whenever `deps` differs from the previous render's.
///
/// Effects run once the host tree is patched, in the order they were
/// queued. If the pass fails they are dropped. A state update from inside
/// an effect is a fresh update, not an update during render.
pub fn use_effect<D>(effect: impl FnOnce() + 'static, deps: D)
where
    D: PartialEq + 'static,
{
    let (fiber, index, slot) = existing_slot::<EffectSlot<D>>("use_effect");

    match slot {
        Some(slot) if slot.deps == deps => {}
        Some(_) => {
            trace!(index, component = %fiber.name(), "effect dependencies changed");
            fiber.replace_hook(index, Rc::new(EffectSlot { deps }));
            queue_effect(Box::new(effect));
        }
        None => {
            fiber.push_hook(index, Rc::new(EffectSlot { deps }));
            queue_effect(Box::new(effect));
        }
    }
}
