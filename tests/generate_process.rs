//! Generator output read back through the parser and the answer codec.

use flexjson::answers::read_answers;
use flexjson::generate::{self, Method};
use flexjson::haversine::{pairs_from_value, EARTH_RADIUS_KM};

fn config(method: Method, pair_count: u64) -> generate::Config {
    generate::Config {
        method,
        seed: 987654321,
        pair_count,
    }
}

#[test]
fn files_are_named_by_pair_count() {
    let dir = tempfile::tempdir().unwrap();
    let output = generate::generate_files(&config(Method::Uniform, 10), dir.path()).unwrap();

    assert_eq!(output.json_path, dir.path().join("data_10_flex.json"));
    assert_eq!(output.answers_path, dir.path().join("data_10_haveranswer.json"));
    assert!(output.json_path.is_file());
    assert_eq!(std::fs::metadata(&output.answers_path).unwrap().len(), 11 * 8);
}

#[test]
fn processed_mean_matches_answers() {
    let dir = tempfile::tempdir().unwrap();
    for method in [Method::Uniform, Method::Cluster] {
        let output = generate::generate_files(&config(method, 500), dir.path()).unwrap();

        let text = std::fs::read_to_string(&output.json_path).unwrap();
        let root = flexjson::parse(&text).unwrap();
        let pairs = pairs_from_value(&root).unwrap();
        assert_eq!(pairs.len(), 500);

        let answers = read_answers(&std::fs::read(&output.answers_path).unwrap()).unwrap();
        assert_eq!(answers.distances.len(), 500);
        assert_eq!(answers.mean, output.summary.expected_mean);

        for (pair, expected) in pairs.pairs.iter().zip(&answers.distances) {
            assert!((pair.distance(EARTH_RADIUS_KM) - expected).abs() < 1e-6);
        }
        let mean = pairs.mean_distance(EARTH_RADIUS_KM);
        assert!((mean - answers.mean).abs() < 1e-6);
    }
}

#[test]
fn same_seed_same_files() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = generate::generate_files(&config(Method::Cluster, 64), a.path()).unwrap();
    let second = generate::generate_files(&config(Method::Cluster, 64), b.path()).unwrap();

    assert_eq!(
        std::fs::read(&first.json_path).unwrap(),
        std::fs::read(&second.json_path).unwrap()
    );
    assert_eq!(first.summary, second.summary);
}

#[test]
fn oversized_request_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate::generate_files(&config(Method::Uniform, generate::MAX_PAIR_COUNT), dir.path())
        .unwrap_err();
    assert!(matches!(err, generate::Error::TooManyPairs { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
