//! Activation and benchmark phase ordering
//!
//! A method's measurements must all be taken before any method that
//! overrides it is activated.

use framebench::{
    build, mtcars, BenchConfig, BenchError, Method, MethodState, OperationKind, PhaseEvent,
    Session,
};

fn config(methods: &[&str]) -> BenchConfig {
    BenchConfig {
        target_rows: 64,
        repetitions: 3,
        warmup: 1,
        methods: methods.iter().map(|m| m.to_string()).collect(),
        ..BenchConfig::default()
    }
}

fn session(methods: &[&str]) -> Session {
    Session::new(&config(methods), build(&mtcars(), 64).unwrap()).unwrap()
}

#[test]
fn test_vectorized_measured_before_optimized_activation() {
    let out = session(&["native", "vectorized", "optimized"]).run().unwrap();

    let last_vectorized = out.log.last_benchmark_of(Method::Vectorized).unwrap();
    let optimized_on = out
        .log
        .position(PhaseEvent::Activated(Method::Optimized))
        .unwrap();
    assert!(last_vectorized < optimized_on);

    // every vectorized sample is tagged vectorized and was collected
    assert_eq!(
        out.results
            .rows()
            .iter()
            .filter(|r| r.method == Method::Vectorized)
            .count(),
        5 * 3
    );
    assert_eq!(out.results.len(), 3 * 5 * 3);
}

#[test]
fn test_activating_overrider_first_is_rejected() {
    let mut s = session(&["vectorized", "optimized"]);
    let err = s.activate(Method::Optimized).unwrap_err();
    assert!(matches!(err, BenchError::Phase(_)));
    assert!(s.log().events().is_empty());
}

#[test]
fn test_activation_while_victim_active_is_rejected() {
    let mut s = session(&["vectorized", "optimized"]);
    s.activate(Method::Vectorized).unwrap();
    assert!(matches!(
        s.activate(Method::Optimized),
        Err(BenchError::Phase(_))
    ));
}

#[test]
fn test_overridden_slot_resolves_to_overrider() {
    let mut s = session(&["vectorized", "optimized"]);
    s.activate(Method::Vectorized).unwrap();
    s.benchmark_method(Method::Vectorized).unwrap();
    s.activate(Method::Optimized).unwrap();

    let registry = s.registry();
    assert_eq!(
        registry.state(Method::Vectorized),
        Some(MethodState::Overridden {
            by: Method::Optimized
        })
    );
    assert_eq!(
        registry.resolve(Method::Vectorized).unwrap().owner(),
        Method::Optimized
    );
    assert!(matches!(
        s.benchmark_method(Method::Vectorized),
        Err(BenchError::Phase(_))
    ));
}

#[test]
fn test_benchmark_before_activation_is_rejected() {
    let mut s = session(&["native"]);
    assert!(matches!(
        s.benchmark_method(Method::Native),
        Err(BenchError::Phase(_))
    ));
}

#[test]
fn test_configured_order_checked_up_front() {
    let err = Session::new(
        &config(&["optimized", "vectorized"]),
        build(&mtcars(), 64).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, BenchError::Phase(_)));
}

#[test]
fn test_unknown_method_fails_before_any_work() {
    let err = Session::new(
        &config(&["native", "Polars"]),
        build(&mtcars(), 64).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BenchError::DependencyLoad {
            method: Method::Other
        }
    ));
}

#[test]
fn test_log_records_catalog_order_per_method() {
    let out = session(&["native"]).run().unwrap();
    let expected: Vec<PhaseEvent> = std::iter::once(PhaseEvent::Activated(Method::Native))
        .chain(
            OperationKind::ALL
                .iter()
                .map(|&operation| PhaseEvent::Benchmarked {
                    operation,
                    method: Method::Native,
                    ran: Method::Native,
                }),
        )
        .collect();
    assert_eq!(out.log.events(), expected.as_slice());
}

#[test]
fn test_each_method_timed_with_its_own_implementation() {
    let out = session(&["vectorized", "optimized"]).run().unwrap();
    let timed: Vec<(Method, Method)> = out
        .log
        .events()
        .iter()
        .filter_map(|e| match *e {
            PhaseEvent::Benchmarked { method, ran, .. } => Some((method, ran)),
            PhaseEvent::Activated(_) => None,
        })
        .collect();

    assert_eq!(timed.len(), 10);
    assert!(timed[..5]
        .iter()
        .all(|&pair| pair == (Method::Vectorized, Method::Vectorized)));
    assert!(timed[5..]
        .iter()
        .all(|&pair| pair == (Method::Optimized, Method::Optimized)));
}
