use multicam_core::IceServerConfig;

/// Connectivity-assistance servers handed to every new peer connection.
#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServerConfig::default_stun(),
        }
    }
}
