use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bayesnet::{
    ask_batch, build_network_with_config, Config, Evidence, Network, Posterior, Query,
};
use serde_json::json;

use crate::args::QueryArgs;

fn load_network(path: &Path, tolerance: f64) -> Result<Network> {
    let description = fs::read_to_string(path)
        .with_context(|| format!("Cannot read network description {}", path.display()))?;
    let net = build_network_with_config(&description, &Config::with_tolerance(tolerance))
        .with_context(|| format!("Invalid network {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        variables = net.len(),
        "network loaded"
    );
    Ok(net)
}

fn describe(query: &Query) -> String {
    if query.evidence.is_empty() {
        format!("P({})", query.var)
    } else {
        format!("P({} | {})", query.var, query.evidence)
    }
}

/// Run the queries of `args` and write the posteriors to `out`.
pub fn query(args: &QueryArgs, out: &mut impl Write) -> Result<()> {
    let net = load_network(&args.network, args.tolerance)?;
    let evidence: Evidence = args.evidence.iter().cloned().collect();
    let queries: Vec<Query> = args
        .queries
        .iter()
        .map(|var| Query::new(var.clone(), evidence.clone()))
        .collect();
    if let Some(max_worlds) = args.max_worlds {
        for q in queries.iter() {
            // Unknown variables are reported by the query itself.
            if let Ok(worlds) = net.world_count(&q.var, &q.evidence) {
                tracing::debug!(query = %describe(q), worlds, "world count");
                if worlds > u128::from(max_worlds) {
                    bail!(
                        "{} enumerates {} worlds per query value, more than --max-worlds {}",
                        describe(q),
                        worlds,
                        max_worlds
                    );
                }
            }
        }
    }
    let posteriors = queries
        .iter()
        .zip(ask_batch(&queries, &net))
        .map(|(q, res)| res.with_context(|| format!("Cannot compute {}", describe(q))))
        .collect::<Result<Vec<Posterior>>>()?;
    if args.json {
        let results: Vec<_> = queries
            .iter()
            .zip(posteriors.iter())
            .map(|(q, post)| {
                json!({
                    "query": q.var,
                    "evidence": q
                        .evidence
                        .iter()
                        .map(|(var, value)| (var.to_owned(), json!(value)))
                        .collect::<serde_json::Map<_, _>>(),
                    "posterior": post,
                })
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)?;
    } else {
        for (q, post) in queries.iter().zip(posteriors.iter()) {
            writeln!(out, "{} =\n{}", describe(q), post)?;
        }
    }
    Ok(())
}

/// Load and validate a network, then write its summary to `out`.
pub fn check(network: &Path, tolerance: f64, out: &mut impl Write) -> Result<()> {
    let net = load_network(network, tolerance)?;
    summarize(&net, out)
}

fn summarize(net: &Network, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Variables ({}):", net.len())?;
    for var in net.variables() {
        let domain = net.domain(var)?;
        let values: Vec<&str> = domain.iter().map(String::as_str).collect();
        writeln!(
            out,
            "  {} = {{{}}}  ({} CPT rows)",
            var,
            values.join(", "),
            net.cpt_len(var)?
        )?;
    }
    writeln!(out, "Edges:")?;
    for (parent, child) in net.edges() {
        writeln!(out, "  {} -> {}", parent, child)?;
    }
    writeln!(out, "Order: {}", net.topological_order().join(", "))?;
    let mut complete = true;
    for var in net.variables() {
        for row in net.missing_rows(var)? {
            if complete {
                writeln!(out, "Missing CPT rows:")?;
                complete = false;
            }
            writeln!(out, "  {} [{}]", var, row.join(", "))?;
        }
    }
    if complete {
        writeln!(out, "All CPTs are complete.")?;
    }
    Ok(())
}
