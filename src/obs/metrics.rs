// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome},
};

/// Counter of attempts and terminal outcomes, labeled by `op` and `outcome`.
pub const OP_TOTAL: &str = "cost_api_op_total";
/// Histogram of completed operation latency in seconds, labeled by `op`.
pub const OP_DURATION_SECONDS: &str = "cost_api_op_duration_seconds";

/// Follows one operation from its attempt to its outcome.
///
/// Without the `metrics` feature only the clock is read.
#[derive(Debug)]
#[must_use = "an operation is only recorded once `finish` is called"]
pub struct OpTimer {
	kind: OpKind,
	started: Instant,
}
impl OpTimer {
	/// Records the attempt and starts the clock.
	pub fn start(kind: OpKind) -> Self {
		emit_outcome(kind, OpOutcome::Attempt);

		Self { kind, started: Instant::now() }
	}

	/// Records the terminal outcome of `result` and the elapsed time; returns the elapsed time.
	pub fn finish<T, E>(self, result: &Result<T, E>) -> StdDuration {
		let elapsed = self.started.elapsed();

		emit_outcome(self.kind, OpOutcome::of(result));
		emit_duration(self.kind, elapsed);

		elapsed
	}
}

#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
fn emit_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(OP_TOTAL, "op" => kind.as_str(), "outcome" => outcome.as_str()).increment(1);
}

#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
fn emit_duration(kind: OpKind, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!(OP_DURATION_SECONDS, "op" => kind.as_str()).record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn timer_reports_elapsed_time() {
		let timer = OpTimer::start(OpKind::VerifyToken);

		std::thread::sleep(StdDuration::from_millis(5));

		assert!(timer.finish(&Err::<(), _>("rejected")) >= StdDuration::from_millis(5));
	}

	#[test]
	fn outcome_follows_result() {
		assert_eq!(OpOutcome::of(&Ok::<_, ()>(1)), OpOutcome::Success);
		assert_eq!(OpOutcome::of(&Err::<(), _>("boom")), OpOutcome::Failure);
	}
}
