pub mod rate_sweep;
