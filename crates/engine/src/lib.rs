// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tg-engine: the task-graph orchestrator's driving logic — the event bus
//! (C2), the argument resolver (C4), the DAG engine (C5), the rewind/branch
//! engine (C6), and the planner's pure sanitisation pass (the non-network
//! half of C7). Everything here is generic over the adapter traits
//! `tg-adapters` exposes, so it's exercised in tests against fakes with no
//! containers, HTTP calls, or real clock involved.

pub mod bus;
pub mod executor;
pub mod planner;
pub mod resolver;
pub mod rewind;

pub use bus::{BusMessage, EventBus};
pub use executor::{EffectOutcome, Executor, ExecutorError, KillSwitch};
pub use planner::sanitize_dag;
pub use resolver::resolve_args;
pub use rewind::{rewind, RewindError, RewindOutcome};
