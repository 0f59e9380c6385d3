//! Rain, sprinkler and wet grass.
//!
//! Run with `cargo run --example sprinkler`.
use bayesnet::{ask, build_network, Evidence};

fn main() -> bayesnet::Result<()> {
    let net = build_network(include_str!("../../networks/sprinkler.bn"))?;
    let queries = [
        ("Rain", Evidence::new()),
        ("Rain", Evidence::new().with("GrassWet", "true")),
        ("Sprinkler", Evidence::new().with("GrassWet", "true")),
        (
            "Sprinkler",
            Evidence::new().with("GrassWet", "true").with("Rain", "false"),
        ),
    ];
    for (query, evidence) in queries.iter() {
        let post = ask(query, evidence, &net)?;
        if evidence.is_empty() {
            println!("P({}) =\n{}", query, post);
        } else {
            println!("P({} | {}) =\n{}", query, evidence, post);
        }
    }
    Ok(())
}
