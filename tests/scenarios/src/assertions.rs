//! Assertion helpers for item scenarios.
//!
//! These are pure functions over what a scenario observed: the record store's
//! call log and the item's status. They return pass/fail with details rather
//! than panicking, so a scenario can report several checks at once.

use itemsync_client::StoreCall;
use itemsync_core::{StatusKind, SyncStatus};
use itemsync_types::RecordId;

/// Result of an assertion check.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Description of what was checked
    pub description: String,
    /// Details on failure
    pub failure_details: Option<String>,
}

impl AssertionResult {
    /// Create a passing result.
    pub fn pass(description: &str) -> Self {
        Self {
            passed: true,
            description: description.into(),
            failure_details: None,
        }
    }

    /// Create a failing result.
    pub fn fail(description: &str, details: &str) -> Self {
        Self {
            passed: false,
            description: description.into(),
            failure_details: Some(details.into()),
        }
    }

    /// Panic with the failure details if the check failed.
    pub fn expect_pass(&self) {
        if !self.passed {
            panic!(
                "{}: {}",
                self.description,
                self.failure_details.as_deref().unwrap_or("failed")
            );
        }
    }
}

/// Assert that the store never saw more than one call at a time.
pub fn assert_single_flight(max_in_flight: usize) -> AssertionResult {
    if max_in_flight <= 1 {
        AssertionResult::pass("Single-flight remote calls")
    } else {
        AssertionResult::fail(
            "Single-flight remote calls",
            &format!("{} calls were in flight at once", max_in_flight),
        )
    }
}

/// Assert how many saves the store received for `id`.
pub fn assert_save_count(calls: &[StoreCall], id: RecordId, expected: usize) -> AssertionResult {
    let saves = calls
        .iter()
        .filter(|c| matches!(c, StoreCall::Save { id: saved, .. } if *saved == id))
        .count();

    if saves == expected {
        AssertionResult::pass(&format!("{} saves for {}", expected, id))
    } else {
        AssertionResult::fail(
            &format!("{} saves for {}", expected, id),
            &format!("store received {} saves", saves),
        )
    }
}

/// Assert that the store received no call at all for `id`.
pub fn assert_untouched(calls: &[StoreCall], id: RecordId) -> AssertionResult {
    let touched = calls.iter().find(|c| match c {
        StoreCall::Save { id: other, .. } => *other == id,
        StoreCall::Fetch(other) | StoreCall::Delete(other) => *other == id,
    });

    match touched {
        None => AssertionResult::pass(&format!("No remote calls for {}", id)),
        Some(call) => AssertionResult::fail(
            &format!("No remote calls for {}", id),
            &format!("store received {:?}", call),
        ),
    }
}

/// Assert the kind of an item's status.
pub fn assert_status_kind(status: &SyncStatus, expected: StatusKind) -> AssertionResult {
    if status.kind() == expected {
        AssertionResult::pass(&format!("Status is {}", expected))
    } else {
        AssertionResult::fail(
            &format!("Status is {}", expected),
            &format!("status is {}", status),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemsync_core::OpId;
    use itemsync_types::SavePolicy;

    fn save(id: RecordId) -> StoreCall {
        StoreCall::Save {
            id,
            policy: SavePolicy::IfServerRecordUnchanged,
        }
    }

    #[test]
    fn single_flight() {
        assert!(assert_single_flight(0).passed);
        assert!(assert_single_flight(1).passed);
        assert!(!assert_single_flight(2).passed);
    }

    #[test]
    fn save_count_filters_by_id() {
        let a = RecordId::new();
        let b = RecordId::new();
        let calls = vec![save(a), save(b), save(a), StoreCall::Fetch(a)];

        assert!(assert_save_count(&calls, a, 2).passed);
        assert!(assert_save_count(&calls, b, 1).passed);
        assert!(!assert_save_count(&calls, b, 2).passed);
    }

    #[test]
    fn untouched() {
        let a = RecordId::new();
        let b = RecordId::new();
        let calls = vec![StoreCall::Delete(a)];

        assert!(!assert_untouched(&calls, a).passed);
        assert!(assert_untouched(&calls, b).passed);
    }

    #[test]
    fn status_kind() {
        let networking = SyncStatus::Networking { op: OpId::new(1) };
        assert!(assert_status_kind(&networking, StatusKind::Networking).passed);

        let result = assert_status_kind(&SyncStatus::Synced, StatusKind::Error);
        assert!(!result.passed);
        assert_eq!(result.failure_details.as_deref(), Some("status is synced"));
    }

    #[test]
    #[should_panic(expected = "Single-flight remote calls")]
    fn expect_pass_panics_on_failure() {
        assert_single_flight(3).expect_pass();
    }
}
