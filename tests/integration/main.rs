//! End-to-end flows across the public engine API.

mod market_flow;
mod rank_flow;
mod risk_flow;
