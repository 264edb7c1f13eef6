//! Contract Test: Idempotency
//!
//! Constraints verified:
//! - A record already holding the public address is never written
//! - A second run after a successful update is a no-op
//! - An address change between runs triggers exactly one new write
//!
//! No state is kept between runs; idempotency comes from comparing against
//! what the provider publishes.

mod common;

use common::*;
use ddns_core::RunOutcome;
use ddns_core::traits::DnsRecord;

fn zone_with_root(content: &str) -> MockDnsProvider {
    MockDnsProvider::new(
        example_zones(),
        vec![DnsRecord::a("r1", "example.com", content)],
    )
}

#[tokio::test]
async fn matching_address_does_not_trigger_dns_update() {
    let provider = zone_with_root("192.168.1.1");
    let ip_source = StaticIpSource::new("192.168.1.1");

    let (reconciler, _events_rx) =
        build_reconciler(&provider, &ip_source, minimal_config("example.com"));
    let outcome = reconciler.run().await.expect("run succeeds");

    assert!(matches!(outcome, RunOutcome::Unchanged { .. }));
    assert_eq!(
        provider.edit_call_count(),
        0,
        "Expected no edit for an up-to-date record"
    );
}

#[tokio::test]
async fn rerun_after_update_is_a_noop() {
    let provider = zone_with_root("192.168.1.1");
    let ip_source = StaticIpSource::new("10.0.0.1");

    // First run converges the record
    {
        let (reconciler, _events_rx) =
            build_reconciler(&provider, &ip_source, minimal_config("example.com"));
        let outcome = reconciler.run().await.expect("first run succeeds");
        assert!(matches!(outcome, RunOutcome::Updated { .. }));
        assert_eq!(provider.edit_call_count(), 1, "First run should update DNS once");
    }

    // Second run sees the converged record
    {
        let (reconciler, _events_rx) =
            build_reconciler(&provider, &ip_source, minimal_config("example.com"));
        let outcome = reconciler.run().await.expect("second run succeeds");
        assert!(matches!(outcome, RunOutcome::Unchanged { .. }));
        assert_eq!(
            provider.edit_call_count(),
            1,
            "Second run should skip update (record already current)"
        );
    }
}

#[tokio::test]
async fn address_change_between_runs_triggers_update() {
    let provider = zone_with_root("192.168.1.1");

    let first_source = StaticIpSource::new("192.168.1.1");
    let (reconciler, _events_rx) =
        build_reconciler(&provider, &first_source, minimal_config("example.com"));
    reconciler.run().await.expect("first run succeeds");
    assert_eq!(provider.edit_call_count(), 0);

    let second_source = StaticIpSource::new("10.0.0.1");
    let (reconciler, _events_rx) =
        build_reconciler(&provider, &second_source, minimal_config("example.com"));
    reconciler.run().await.expect("second run succeeds");

    assert_eq!(provider.edit_call_count(), 1, "New address should update DNS");
    assert_eq!(provider.content_of("r1").as_deref(), Some("10.0.0.1"));
}
