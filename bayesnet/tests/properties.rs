// Checks the enumeration against properties that hold for any network.
//
// Random networks are generated with a seeded RNG:
//   - 2 to 3 values per variable
//   - up to 2 parents per variable, chosen among the previously declared ones
//   - random CPT rows, normalized
// and posteriors are compared to a direct summation of the joint distribution.
use approx::assert_abs_diff_eq;
use bayesnet::{ask, Evidence, Network, NetworkBuilder};
use itertools::Itertools;
use ndarray::Array1;
use ndarray_rand::rand::seq::index;
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256StarStar;

fn gen_builder(rng: &mut Xoshiro256StarStar, nvars: usize) -> NetworkBuilder {
    let mut builder = NetworkBuilder::new();
    let mut domains: Vec<Vec<String>> = Vec::new();
    for v in 0..nvars {
        let nc: usize = rng.gen_range(2..4);
        let domain: Vec<String> = (0..nc).map(|x| format!("v{}", x)).collect();
        let nparents = rng.gen_range(0..=v.min(2));
        let parents = index::sample(rng, v, nparents).into_vec();
        builder
            .variable(
                &format!("X{}", v),
                domain.clone(),
                parents.iter().map(|p| format!("X{}", p)),
            )
            .unwrap();
        let rows: Vec<Vec<String>> = if parents.is_empty() {
            vec![Vec::new()]
        } else {
            parents
                .iter()
                .map(|p| domains[*p].iter().cloned())
                .multi_cartesian_product()
                .collect()
        };
        for parent_values in rows {
            let row = Array1::random_using(nc, Uniform::new(0.05, 1.0), rng);
            let row = &row / row.sum();
            builder.row(&format!("X{}", v), parent_values, row.as_slice().unwrap());
        }
        domains.push(domain);
    }
    builder
}

fn gen_network(seed: u64, nvars: usize) -> Network {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    gen_builder(&mut rng, nvars).build().unwrap()
}

/// P(query = value, evidence) for every value, by summing over all the worlds.
fn joint_sum(net: &Network, query: &str, evidence: &Evidence) -> Vec<f64> {
    let vars: Vec<&str> = net.variables().collect();
    let domain = net.domain(query).unwrap();
    let mut weights = vec![0.0; domain.len()];
    let worlds = vars
        .iter()
        .map(|v| net.domain(v).unwrap().iter().map(String::as_str))
        .multi_cartesian_product();
    for world in worlds {
        let value_of = |v: &str| world[vars.iter().position(|x| *x == v).unwrap()];
        if evidence.iter().any(|(v, x)| value_of(v) != x) {
            continue;
        }
        let p: f64 = vars
            .iter()
            .map(|v| {
                let parents: Vec<&str> = net
                    .parents(v)
                    .unwrap()
                    .into_iter()
                    .map(|p| value_of(p))
                    .collect();
                net.probability(v, value_of(v), &parents).unwrap()
            })
            .product();
        weights[domain.get_index_of(value_of(query)).unwrap()] += p;
    }
    weights
}

fn gen_evidence(rng: &mut Xoshiro256StarStar, net: &Network, query: &str) -> Evidence {
    net.variables()
        .filter(|v| *v != query)
        .filter_map(|v| {
            if !rng.gen_bool(0.4) {
                return None;
            }
            let domain = net.domain(v).unwrap();
            Some((v, domain[rng.gen_range(0..domain.len())].clone()))
        })
        .collect()
}

#[test]
fn matches_joint_summation() {
    for seed in 0..20 {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1000 + seed);
        let net = gen_network(seed, 6);
        let query = format!("X{}", rng.gen_range(0..6));
        let evidence = gen_evidence(&mut rng, &net, &query);
        let post = ask(&query, &evidence, &net).unwrap();
        let weights = joint_sum(&net, &query, &evidence);
        let total: f64 = weights.iter().sum();
        for (p, w) in post.value().iter().zip(weights.iter()) {
            assert_abs_diff_eq!(*p, w / total, epsilon = 1e-9);
        }
    }
}

#[test]
fn normalized_and_non_negative() {
    for seed in 0..20 {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2000 + seed);
        let net = gen_network(seed, 7);
        for query in net.variables() {
            let evidence = gen_evidence(&mut rng, &net, query);
            let post = ask(query, &evidence, &net).unwrap();
            assert_eq!(post.value().len(), net.domain(query).unwrap().len());
            assert_abs_diff_eq!(post.value().sum(), 1.0, epsilon = 1e-6);
            assert!(post.value().iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }
}

#[test]
fn root_marginals_are_cpt_rows() {
    for seed in 0..10 {
        let net = gen_network(seed, 5);
        for var in net.variables() {
            if !net.parents(var).unwrap().is_empty() {
                continue;
            }
            let post = ask(var, &Evidence::new(), &net).unwrap();
            for (label, p) in post.iter() {
                let expected = net.probability(var, label, &[]).unwrap();
                assert_abs_diff_eq!(p, expected, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn disconnected_variable_does_not_change_posteriors() {
    for seed in 0..10 {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut builder = gen_builder(&mut rng, 5);
        let net = builder.clone().build().unwrap();
        builder
            .variable("Noise", ["a", "b", "c"], Vec::<String>::new())
            .unwrap()
            .row("Noise", Vec::<String>::new(), &[0.2, 0.3, 0.5]);
        let noisy = builder.build().unwrap();
        assert_eq!(noisy.len(), net.len() + 1);

        let mut rng = Xoshiro256StarStar::seed_from_u64(3000 + seed);
        for query in net.variables() {
            let evidence = gen_evidence(&mut rng, &net, query);
            let post = ask(query, &evidence, &net).unwrap();
            let noisy_post = ask(query, &evidence, &noisy).unwrap();
            assert_eq!(
                noisy.world_count(query, &evidence).unwrap(),
                3 * net.world_count(query, &evidence).unwrap()
            );
            for (p, q) in post.value().iter().zip(noisy_post.value().iter()) {
                assert_abs_diff_eq!(*p, *q, epsilon = 1e-12);
            }
        }
    }
}
