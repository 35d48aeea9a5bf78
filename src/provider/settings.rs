//! Wait cadences handed to resource handlers.

use crate::wait::WaitSettings;

/// Explicit polling cadences for every asynchronous lifecycle step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProviderSettings {
    /// Server provisioning and power transitions.
    pub server_wait: WaitSettings,
    /// IP block assignment changes.
    pub ip_block_wait: WaitSettings,
    /// Release of private and public network memberships.
    pub network_wait: WaitSettings,
    /// Storage network and Rancher cluster provisioning.
    pub provisioning_wait: WaitSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            server_wait: WaitSettings::server(),
            ip_block_wait: WaitSettings::ip_block(),
            network_wait: WaitSettings::network_membership(),
            provisioning_wait: WaitSettings::provisioning(),
        }
    }
}

impl ProviderSettings {
    /// Uses one cadence for every wait. Mostly useful in tests.
    #[must_use]
    pub const fn uniform(settings: WaitSettings) -> Self {
        Self {
            server_wait: settings,
            ip_block_wait: settings,
            network_wait: settings,
            provisioning_wait: settings,
        }
    }
}
