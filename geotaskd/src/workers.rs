//! Background workers: order cleanup and order generation.
//!
//! Each worker ticks on a fixed interval until its cancellation token fires.
//! A failing tick is logged and the loop carries on.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::orders::OrderLifecycle;

// =============================================================================
// Order Cleaner
// =============================================================================

/// Prunes expired orders from the indexes.
pub struct OrderCleaner {
    orders: Arc<dyn OrderLifecycle>,
    every: Duration,
}

impl OrderCleaner {
    pub fn new(orders: Arc<dyn OrderLifecycle>, every: Duration) -> Self {
        Self { orders, every }
    }

    /// Run the cleaner loop.
    ///
    /// Returns when shutdown is signaled via cancellation token.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_ms = self.every.as_millis() as u64, "Order cleaner started");

        let mut ticker = interval(self.every);
        ticker.tick().await; // First tick is immediate

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Order cleaner shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    match self.orders.remove_old_orders().await {
                        Ok(removed) if removed > 0 => debug!(removed, "Cleaner tick"),
                        Err(e) => error!(error = %e, "Order cleanup failed (will retry)"),
                        _ => {}
                    }
                }
            }
        }

        info!("Order cleaner stopped");
    }

    /// Spawn the loop on the runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

// =============================================================================
// Order Generator
// =============================================================================

/// Creates orders until the active order cap is reached.
pub struct OrderGenerator {
    orders: Arc<dyn OrderLifecycle>,
    every: Duration,
    max_active_orders: i64,
}

impl OrderGenerator {
    pub fn new(orders: Arc<dyn OrderLifecycle>, every: Duration, max_active_orders: i64) -> Self {
        Self {
            orders,
            every,
            max_active_orders,
        }
    }

    /// Run the generator loop.
    ///
    /// Returns when shutdown is signaled via cancellation token.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.every.as_millis() as u64,
            max_active_orders = self.max_active_orders,
            "Order generator started"
        );

        let mut ticker = interval(self.every);
        ticker.tick().await; // First tick is immediate

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Order generator shutdown requested");
                    break;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }

        info!("Order generator stopped");
    }

    async fn tick(&self) {
        match self.orders.get_count().await {
            Ok(active) if active >= self.max_active_orders => {
                debug!(active, "Order cap reached, skipping tick");
                return;
            },
            Ok(_) => {},
            Err(e) => {
                error!(error = %e, "Order count failed (will retry)");
                return;
            },
        }

        if let Err(e) = self.orders.generate_order().await {
            error!(error = %e, "Order generation failed (will retry)");
        }
    }

    /// Spawn the loop on the runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

// =============================================================================
// Tests
// =============================================================================
