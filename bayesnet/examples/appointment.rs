//! Getting to an appointment by train.
//!
//! Run with `cargo run --example appointment`.
use bayesnet::{ask_batch, build_network, Evidence, Query};

fn main() -> bayesnet::Result<()> {
    let net = build_network(include_str!("../../networks/appointment.bn"))?;
    println!("Topological order: {}", net.topological_order().join(" -> "));

    let queries = vec![
        Query::new("Appointment", Evidence::new()),
        Query::new(
            "Appointment",
            Evidence::new().with("Rain", "light").with("Maintenance", "no"),
        ),
        Query::new("Rain", Evidence::new().with("Appointment", "no")),
        Query::new("Train", Evidence::new().with("Rain", "heavy")),
    ];
    for (query, post) in queries.iter().zip(ask_batch(&queries, &net)) {
        let post = post?;
        let (label, p) = post
            .most_likely()
            .expect("posteriors cover non-empty domains");
        if query.evidence.is_empty() {
            println!("P({}) =\n{}", query.var, post);
        } else {
            println!("P({} | {}) =\n{}", query.var, query.evidence, post);
        }
        println!("most likely: {} ({:.4})\n", label, p);
    }
    Ok(())
}
