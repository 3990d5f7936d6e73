use super::*;

#[test]
fn hosted_only_variant_is_selected_without_local_config() {
    let router = PlannerRouter::hosted_only(HostedPlannerAdapter::new("https://api.openai.com/v1", "key", "gpt-4o-mini"));
    assert!(matches!(router, PlannerRouter::HostedOnly(_)));
}

#[test]
fn with_local_variant_carries_both_backends() {
    let router = PlannerRouter::with_local(
        LocalPlannerAdapter::new("http://localhost:11434", "llama3"),
        HostedPlannerAdapter::new("https://api.openai.com/v1", "key", "gpt-4o-mini"),
    );
    assert!(matches!(router, PlannerRouter::WithLocal { .. }));
}
