use bindery::{ResolveError, ScopeKind};
use std::error::Error;
use std::sync::Arc;

#[test]
fn unresolved_display_names_the_type() {
    let err = ResolveError::Unresolved("app::Config");
    assert_eq!(err.to_string(), "No binding for: app::Config");
}

#[test]
fn unresolved_named_display_names_type_and_name() {
    let err = ResolveError::UnresolvedNamed {
        type_name: "app::Port",
        name: "admin",
    };
    assert_eq!(err.to_string(), "No binding named 'admin' for: app::Port");
}

#[test]
fn cyclic_display_joins_the_path() {
    let err = ResolveError::Cyclic(vec!["A", "B", "A"]);
    assert_eq!(err.to_string(), "Cyclic dependency: A -> B -> A");
}

#[test]
fn ambiguous_display_lists_candidates() {
    let err = ResolveError::Ambiguous {
        interface: "dyn Mailer",
        candidates: vec!["Smtp", "Sendgrid"],
    };
    let message = err.to_string();
    assert!(message.contains("dyn Mailer"));
    assert!(message.contains("Smtp"));
    assert!(message.contains("Sendgrid"));
}

#[test]
fn scope_not_active_display_mentions_scope_and_key() {
    let with_key = ResolveError::ScopeNotActive {
        scope: ScopeKind::Session,
        scope_key: Some("alice".to_string()),
    };
    assert!(with_key.to_string().contains("session"));
    assert!(with_key.to_string().contains("alice"));

    let without_key = ResolveError::ScopeNotActive {
        scope: ScopeKind::Request,
        scope_key: None,
    };
    assert!(without_key.to_string().contains("request"));
}

#[test]
fn instantiation_exposes_its_source() {
    #[derive(Debug)]
    struct IoDown;
    impl std::fmt::Display for IoDown {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "io down")
        }
    }
    impl std::error::Error for IoDown {}

    let err = ResolveError::Instantiation {
        type_name: "app::Client",
        source: Arc::new(IoDown),
    };
    assert!(err.to_string().contains("app::Client"));
    assert!(err.to_string().contains("io down"));
    assert_eq!(err.source().map(|s| s.to_string()), Some("io down".to_string()));
}

#[test]
fn errors_are_cloneable_for_caller_side_retry_policies() {
    let err = ResolveError::Cyclic(vec!["A", "A"]);
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}
