//! Contract ABI artifact loading
//!
//! Reads a Hardhat-style artifact (`{"abi": [...]}`) and checks that the
//! oracle exposes the batch update entry point the keeper calls.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Batch update function the keeper submits
pub const UPDATE_PRICES_FN: &str = "updatePrices";

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    abi: Vec<AbiEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
}

/// Functions declared by the loaded artifact
#[derive(Debug, Clone)]
pub struct ContractAbi {
    /// Contract name from the artifact, if present
    pub contract_name: Option<String>,
    functions: Vec<(String, Vec<String>)>,
}

impl ContractAbi {
    /// Whether a function named `name` is declared
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.iter().any(|(n, _)| n == name)
    }

    /// Canonical signature, e.g. `updatePrices(string[],uint256[])`
    pub fn signature(&self, name: &str) -> Option<String> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, inputs)| format!("{}({})", n, inputs.join(",")))
    }
}

/// Load and check an ABI artifact
pub fn load_abi(path: &Path) -> Result<ContractAbi, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::AbiNotFound(path.to_path_buf()));
    }

    let invalid = |reason: String| ConfigError::InvalidAbi {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let artifact: Artifact = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    let functions = artifact
        .abi
        .into_iter()
        .filter(|e| e.kind == "function")
        .filter_map(|e| {
            let inputs = e.inputs.into_iter().map(|p| p.kind).collect();
            e.name.map(|n| (n, inputs))
        })
        .collect();

    let abi = ContractAbi {
        contract_name: artifact.contract_name,
        functions,
    };

    match abi.signature(UPDATE_PRICES_FN).as_deref() {
        Some("updatePrices(string[],uint256[])") => Ok(abi),
        Some(other) => Err(invalid(format!("unexpected signature {other}"))),
        None => Err(invalid(format!("missing function {UPDATE_PRICES_FN}"))),
    }
}
