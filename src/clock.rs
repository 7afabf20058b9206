//! Time sources for validating time based claims.

use chrono::Utc;

/// Where claim validation reads "now" from, in seconds since the unix
/// epoch.
///
/// The clock is an explicit value carried by the parser rather than a
/// process wide mutable default, so concurrent test suites can each pin
/// their own instant without interfering.
#[derive(Clone, Copy, Debug)]
pub enum Clock {
  /// The system wall clock.
  System,
  /// A fixed instant, for deterministic verification.
  Fixed(i64),
  /// A caller supplied zero-argument source.
  Function(fn() -> i64),
}

impl Clock {
  /// The current instant according to this source.
  pub fn now(&self) -> i64 {
    match self {
      Clock::System => Utc::now().timestamp(),
      Clock::Fixed(at) => *at,
      Clock::Function(source) => source(),
    }
  }
}

impl Default for Clock {
  fn default() -> Clock {
    Clock::System
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  #[test]
  fn fixed_clock_returns_its_instant() {
    assert_eq!(Clock::Fixed(1516239022).now(), 1516239022);
  }

  #[test]
  fn function_clock_calls_through() {
    fn frozen() -> i64 {
      4102444800
    }

    assert_eq!(Clock::Function(frozen).now(), 4102444800);
  }

  #[test]
  fn system_clock_is_past_2020() {
    assert!(Clock::System.now() > 1577836800);
  }
}
