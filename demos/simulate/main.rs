use rigflow::{RulePack, SimInput, simulate_rule_pack, validate_graph};

fn main() {
    let text = include_str!("../../packs/topdrive_rpm_low.json");

    let pack = RulePack::from_json(text).unwrap();

    let report = validate_graph(&pack).unwrap();
    println!("Pack {}@{} validated, {} warning(s)", pack.key, pack.version, report.warnings.len());
    for message in report.messages() {
        println!("  warning: {}", message);
    }

    println!("{}", pack.graph().schema());

    let success: Vec<SimInput> = vec![(1250.0, true).into(), (175.0, true).into(), (0.0, true).into()];
    let trace = simulate_rule_pack(&pack, &success).unwrap();
    println!("Success path ends at {} after {} reading(s)", trace.final_node_key, trace.consumed());
    for step in &trace.steps {
        println!("  {:<20} {:<12} {:?} expected={:?} -> {}", step.node_key, step.kind, step.input, step.expected, step.result.as_ref());
    }

    let failure: Vec<SimInput> = vec![(1100.0, false).into(), (0.0, true).into()];
    let trace = simulate_rule_pack(&pack, &failure).unwrap();
    println!("Failure path ends at {}", trace.final_node_key);

    match simulate_rule_pack(&pack, &failure[..1]) {
        Ok(trace) => println!("Unexpected success: {:#?}", trace),
        Err(e) => println!("Short path rejected: {}", e),
    }
}
