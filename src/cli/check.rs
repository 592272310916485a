//! Check command implementation

use super::setup::{build_chain, report_network};
use crate::config::Config;
use crate::gas::display_gwei;
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only validate configuration, skip the network query
    #[arg(long)]
    pub offline: bool,
}

impl CheckArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        config.validate()?;
        println!("Configuration OK");
        println!("  Mode: {:?}", config.execution.mode);
        println!(
            "  Symbols: {}",
            if config.keeper.symbols.is_empty() {
                "all published".to_string()
            } else {
                config.keeper.symbols.join(", ")
            }
        );
        println!(
            "  Threshold: {}%  Batch size: {}  Gas ceiling: {} gwei",
            config.keeper.min_price_change_pct,
            config.keeper.batch_size,
            config.gas.max_gas_price_gwei
        );

        if self.offline {
            return Ok(());
        }

        let chain = build_chain(config)?;
        let info = report_network(chain.as_ref(), config)
            .await
            .ok_or_else(|| anyhow::anyhow!("network unreachable"))?;

        println!("Network OK");
        println!("  Chain ID: {}", info.chain_id);
        println!("  Block: {}", info.block_number);
        println!("  Gas price: {}", display_gwei(info.gas_price));
        println!("  Balance: {} ETH", info.balance_eth().round_dp(6));
        if info.balance_eth() < config.chain.low_balance_eth {
            println!("  Warning: balance below {} ETH", config.chain.low_balance_eth);
        }

        Ok(())
    }
}
