use serde::{Deserialize, Serialize};
use std::fs;

use crate::session::Network;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub networks: NetworkProfiles,
}

/// One profile per supported network.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkProfiles {
    pub mainnet: NetworkProfile,
    pub testnet: NetworkProfile,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkProfile {
    /// JSON-RPC endpoint the embedding network adapter talks to.
    pub rpc_url: String,
    /// Chain identifier baked into hardware-signed transactions.
    pub chain_id: u64,
    /// Derivation-path prefix for hardware-device accounts.
    pub hd_path: String,
}

impl Default for NetworkProfiles {
    fn default() -> Self {
        Self {
            mainnet: NetworkProfile {
                rpc_url: "https://rpc.mainnet.example.net".to_string(),
                chain_id: 88,
                hd_path: "m/44'/889'/0'/0/".to_string(),
            },
            testnet: NetworkProfile {
                rpc_url: "https://rpc.testnet.example.net".to_string(),
                chain_id: 89,
                hd_path: "m/44'/889'/0'/0/".to_string(),
            },
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "sendflow.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            networks: NetworkProfiles::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Profile of the given network.
    pub fn profile(&self, network: Network) -> &NetworkProfile {
        match network {
            Network::Mainnet => &self.networks.mainnet,
            Network::Testnet => &self.networks.testnet,
        }
    }
}
