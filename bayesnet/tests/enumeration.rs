use approx::assert_abs_diff_eq;
use bayesnet::{
    ask, ask_batch, build_network, Evidence, Network, NetworkBuilder, NetworkError, Query,
    QueryError,
};

fn sprinkler() -> Network {
    build_network(include_str!("../../networks/sprinkler.bn")).unwrap()
}

fn appointment() -> Network {
    build_network(include_str!("../../networks/appointment.bn")).unwrap()
}

#[test]
fn rain_given_wet_grass() {
    let net = sprinkler();
    let post = ask("Rain", &Evidence::new().with("GrassWet", "true"), &net).unwrap();
    assert_abs_diff_eq!(post["true"], 0.3577, epsilon = 1e-3);
    assert_abs_diff_eq!(post["false"], 0.6423, epsilon = 1e-3);
    // 0.2 * (0.01 * 0.99 + 0.99 * 0.8) / (that + 0.8 * 0.4 * 0.9)
    assert_abs_diff_eq!(post["true"], 0.16038 / 0.44838, epsilon = 1e-9);
}

#[test]
fn sprinkler_forced_when_it_did_not_rain() {
    let net = sprinkler();
    let ev = Evidence::new().with("GrassWet", "true").with("Rain", "false");
    let post = ask("Sprinkler", &ev, &net).unwrap();
    assert_abs_diff_eq!(post["true"], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(post["false"], 0.0, epsilon = 1e-6);
    assert_eq!(post.most_likely(), Some(("true", post["true"])));
}

#[test]
fn root_marginal_without_evidence() {
    let net = sprinkler();
    let post = ask("Rain", &Evidence::new(), &net).unwrap();
    assert_abs_diff_eq!(post["true"], 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(post["false"], 0.8, epsilon = 1e-12);

    let net = appointment();
    let post = ask("Rain", &Evidence::new(), &net).unwrap();
    for (label, p) in post.iter() {
        let expected = net.probability("Rain", label, &[]).unwrap();
        assert_abs_diff_eq!(p, expected, epsilon = 1e-12);
    }
}

#[test]
fn appointment_given_light_rain_and_no_maintenance() {
    let net = appointment();
    let ev = Evidence::new().with("Rain", "light").with("Maintenance", "no");
    let post = ask("Appointment", &ev, &net).unwrap();
    assert_abs_diff_eq!(post["yes"], 0.7 * 0.9 + 0.3 * 0.6, epsilon = 1e-9);
    assert_abs_diff_eq!(post["no"], 0.7 * 0.1 + 0.3 * 0.4, epsilon = 1e-9);
    assert_eq!(post.labels().collect::<Vec<_>>(), vec!["yes", "no"]);
}

#[test]
fn posterior_covers_the_domain_in_order() {
    let net = appointment();
    let post = ask("Rain", &Evidence::new().with("Appointment", "no"), &net).unwrap();
    assert_eq!(post.var(), "Rain");
    assert_eq!(
        post.labels().collect::<Vec<_>>(),
        vec!["none", "light", "heavy"]
    );
    assert_abs_diff_eq!(post.value().sum(), 1.0, epsilon = 1e-9);
    assert!(post.get("snow").is_none());
}

#[test]
#[should_panic(expected = "snow is not in the domain of Rain")]
fn indexing_an_unknown_label_panics() {
    let net = sprinkler();
    let post = ask("Rain", &Evidence::new(), &net).unwrap();
    assert_eq!(post.get("snow"), None);
    let _ = post["snow"];
}

#[test]
fn deterministic_parent_forces_child() {
    let mut b = NetworkBuilder::new();
    b.variable("Switch", ["on", "off"], Vec::<String>::new())
        .unwrap()
        .variable("Light", ["lit", "dark"], ["Switch"])
        .unwrap();
    b.row("Switch", Vec::<String>::new(), &[0.5, 0.5])
        .row("Light", ["on"], &[1.0, 0.0])
        .row("Light", ["off"], &[0.0, 1.0]);
    let net = b.build().unwrap();
    let post = ask("Light", &Evidence::new().with("Switch", "on"), &net).unwrap();
    assert_abs_diff_eq!(post["lit"], 1.0, epsilon = 1e-6);
    let post = ask("Switch", &Evidence::new().with("Light", "dark"), &net).unwrap();
    assert_abs_diff_eq!(post["off"], 1.0, epsilon = 1e-6);
}

#[test]
fn zero_probability_evidence_is_degenerate() {
    let mut b = NetworkBuilder::new();
    b.variable("A", ["t", "f"], Vec::<String>::new())
        .unwrap()
        .variable("B", ["t", "f"], ["A"])
        .unwrap();
    b.row("A", Vec::<String>::new(), &[1.0, 0.0])
        .row("B", ["t"], &[0.5, 0.5])
        .row("B", ["f"], &[0.5, 0.5]);
    let net = b.build().unwrap();
    assert_eq!(
        ask("B", &Evidence::new().with("A", "f"), &net),
        Err(QueryError::Degenerate {
            query: "B".to_owned(),
            evidence: "A=f".to_owned()
        })
    );

    // Without the sprinkler, wet grass implies rain.
    let net = sprinkler();
    let ev = Evidence::new()
        .with("Sprinkler", "false")
        .with("GrassWet", "true");
    let post = ask("Rain", &ev, &net).unwrap();
    assert_abs_diff_eq!(post["true"], 1.0, epsilon = 1e-9);
}

#[test]
fn malformed_queries() {
    let net = sprinkler();
    assert_eq!(
        ask("Snow", &Evidence::new(), &net),
        Err(QueryError::UnknownQuery("Snow".to_owned()))
    );
    assert_eq!(
        ask("Rain", &Evidence::new().with("Snow", "true"), &net),
        Err(QueryError::UnknownEvidence("Snow".to_owned()))
    );
    assert_eq!(
        ask("Rain", &Evidence::new().with("GrassWet", "damp"), &net),
        Err(QueryError::EvidenceDomain {
            var: "GrassWet".to_owned(),
            value: "damp".to_owned()
        })
    );
    assert_eq!(
        ask("Rain", &Evidence::new().with("Rain", "true"), &net),
        Err(QueryError::QueryInEvidence("Rain".to_owned()))
    );
}

#[test]
fn missing_row_fails_the_query() {
    let mut b = NetworkBuilder::new();
    b.variable("A", ["t", "f"], Vec::<String>::new())
        .unwrap()
        .variable("B", ["t", "f"], ["A"])
        .unwrap();
    b.row("A", Vec::<String>::new(), &[0.5, 0.5])
        .row("B", ["t"], &[0.5, 0.5]);
    let net = b.build().unwrap();
    assert_eq!(
        ask("A", &Evidence::new(), &net),
        Err(QueryError::Network(NetworkError::Lookup {
            var: "B".to_owned(),
            parents: vec!["f".to_owned()]
        }))
    );
    // The missing row is never reached when A is observed as t.
    let post = ask("B", &Evidence::new().with("A", "t"), &net).unwrap();
    assert_abs_diff_eq!(post["t"], 0.5, epsilon = 1e-12);
}

#[test]
fn batch_matches_single_queries() {
    let net = appointment();
    let queries = vec![
        Query::new("Appointment", Evidence::new().with("Rain", "light")),
        Query::new("Rain", Evidence::new().with("Train", "delayed")),
        Query::new("Snow", Evidence::new()),
        Query::new(
            "Maintenance",
            Evidence::new().with("Appointment", "yes").with("Rain", "heavy"),
        ),
    ];
    let results = ask_batch(&queries, &net);
    assert_eq!(results.len(), queries.len());
    for (q, res) in queries.iter().zip(results) {
        assert_eq!(res, ask(&q.var, &q.evidence, &net));
    }
}

#[test]
fn posterior_output_formats() {
    let net = sprinkler();
    let post = ask("Rain", &Evidence::new().with("GrassWet", "true"), &net).unwrap();
    assert_eq!(post.to_string(), "{\n    false: 0.6423\n    true: 0.3577\n}");
    let json: serde_json::Value = serde_json::to_value(&post).unwrap();
    assert_abs_diff_eq!(json["true"].as_f64().unwrap(), post["true"]);
    let map = post.clone().into_map();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["true", "false"]);
}
