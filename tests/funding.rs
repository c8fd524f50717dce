use dfxdeploy::config::FundingSection;
use dfxdeploy::deploy::funding::{format_e8s, to_e8s};
use dfxdeploy::deploy::{required_icp, round2, FundingPlan};
use dfxdeploy::errors::DeployError;
use proptest::prelude::*;

fn funding(per_canister: f64) -> FundingSection {
    FundingSection {
        required_xdr_per_canister: per_canister,
        ..FundingSection::default()
    }
}

#[test]
fn three_canisters_at_five_xdr_per_icp() {
    let required = required_icp(&funding(2.0), 3, 5.0);
    assert_eq!(required, 1.33);
}

#[test]
fn rounding_happens_before_the_safety_margin() {
    // 2.6 / 3.0 = 0.8666.. -> 0.87, plus 0.01
    let required = required_icp(&funding(2.0), 1, 3.0);
    assert!((required - 0.88).abs() < 1e-9, "got {required}");
}

#[test]
fn plan_gate_compares_in_e8s() {
    let required = required_icp(&funding(2.0), 3, 5.0);

    let short = FundingPlan::new(required, 1.0);
    assert!(!short.sufficient);

    let exact = FundingPlan::new(required, 1.33);
    assert!(exact.sufficient);
}

#[test]
fn wallet_funding_leaves_the_fee_reserve() {
    let plan = FundingPlan::new(1.33, 5.0);
    let amount = plan.wallet_funding_e8s(0.0001).unwrap();
    assert_eq!(amount, 499_990_000);
    assert_eq!(format_e8s(amount), "4.99990000");
}

#[test]
fn underfunded_plan_never_yields_an_amount() {
    let plan = FundingPlan::new(1.33, 1.0);
    assert!(matches!(
        plan.wallet_funding_e8s(0.0001),
        Err(DeployError::Precondition(_))
    ));
}

#[test]
fn e8s_formatting() {
    assert_eq!(format_e8s(0), "0.00000000");
    assert_eq!(format_e8s(1), "0.00000001");
    assert_eq!(format_e8s(to_e8s(12.5)), "12.50000000");
}

proptest! {
    #[test]
    fn required_is_rounded_up_to_cents_plus_margin(
        per_canister in 0.1f64..10.0,
        count in 0usize..50,
        xdr_per_icp in 0.5f64..50.0,
    ) {
        let params = funding(per_canister);
        let required = required_icp(&params, count, xdr_per_icp);
        let base = required - params.safety_margin;
        prop_assert!((round2(base) - base).abs() < 1e-9);
        prop_assert!(required > 0.0);
    }

    #[test]
    fn required_prints_as_whole_cents(
        count in 0usize..50,
        xdr_per_icp in 0.5f64..50.0,
    ) {
        let required = required_icp(&FundingSection::default(), count, xdr_per_icp);
        let text = required.to_string();
        let decimals = text.split_once('.').map_or(0, |(_, frac)| frac.len());
        prop_assert!(decimals <= 2, "{text}");
    }

    #[test]
    fn more_canisters_never_cost_less(
        count in 0usize..50,
        xdr_per_icp in 0.5f64..50.0,
    ) {
        let params = FundingSection::default();
        let fewer = required_icp(&params, count, xdr_per_icp);
        let more = required_icp(&params, count + 1, xdr_per_icp);
        prop_assert!(more >= fewer);
    }
}
