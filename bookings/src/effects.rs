//! Effect execution.
//!
//! Effects returned by the reducer are only run once the change they describe
//! has been persisted. A batch runs concurrently and completes when every
//! effect in it has.

use broom_fairy_core::effect::Effect;
use futures::future::join_all;

/// Run a batch of effects to completion
pub async fn run_effects<I>(effects: I)
where
    I: IntoIterator<Item = Effect>,
{
    join_all(effects.into_iter().map(run_effect)).await;
}

/// Run a single effect
pub async fn run_effect(effect: Effect) {
    match effect {
        Effect::None => {
            tracing::trace!("Executing Effect::None (no-op)");
            metrics::counter!("bookings.effects.executed", "type" => "none").increment(1);
        },
        Effect::Future(fut) => {
            tracing::trace!("Executing Effect::Future");
            metrics::counter!("bookings.effects.executed", "type" => "future").increment(1);
            fut.await;
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex, PoisonError};

    fn recording(log: &Arc<Mutex<Vec<u8>>>, value: u8) -> Effect {
        let log = Arc::clone(log);
        Effect::future(async move {
            log.lock().unwrap_or_else(PoisonError::into_inner).push(value);
        })
    }

    #[tokio::test]
    async fn none_does_nothing() {
        run_effects(vec![Effect::None]).await;
    }

    #[tokio::test]
    async fn every_future_in_a_batch_runs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        run_effects(vec![recording(&log, 1), Effect::None, recording(&log, 2)]).await;

        let mut seen = log.lock().unwrap_or_else(PoisonError::into_inner).clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }
}
