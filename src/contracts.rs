//! Centralized Contract Definitions
//!
//! The on-chain surface this bot consumes: the ArbitrageBot entry point and
//! the ArbitrageResult event it emits into receipt logs.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use ethers::prelude::abigen;

abigen!(
    ArbitrageBot,
    r#"[
        function initiateArbitrage(address tokenIn, address tokenOut, uint256 amount, string buyDex, string sellDex)
        event ArbitrageResult(address tokenIn, address tokenOut, uint256 profit, uint256 gasUsed, bool success, string message)
    ]"#
);
