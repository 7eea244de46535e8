use std::time::Duration;

use typed_builder::TypedBuilder;

/// Knobs a host can set when creating a [`crate::Machine`].
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct MachineConfig {
    /// Upper bound for a single `FX0A` wait. `None` waits until a key is
    /// pressed or [`crate::Keypad::cancel_wait`] is called.
    #[builder(default)]
    pub key_wait_timeout: Option<Duration>,
    /// Seed for the `CXNN` generator; entropy when unset.
    #[builder(default)]
    pub rng_seed: Option<u64>,
}
