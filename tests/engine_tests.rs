//! End-to-end tests of the engine surface: master-key setup, the vault
//! round-trip, failure taxonomy and concurrent use.

use std::collections::HashSet;
use std::sync::Arc;

use nengpass::config::{BackendKind, Settings};
use nengpass::generator::ALPHABET;
use nengpass::{Engine, NengPassError, ValidationError};
use tempfile::TempDir;

fn test_settings(backend: BackendKind) -> Settings {
    Settings {
        argon2_memory_kib: 8_192,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        backend,
        ..Settings::default()
    }
}

fn engine(dir: &TempDir) -> Engine {
    Engine::open(test_settings(BackendKind::File), dir.path()).unwrap()
}

// ---------------------------------------------------------------------------
// Master key
// ---------------------------------------------------------------------------

#[test]
fn fresh_installation_setup_scenario() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    assert!(!engine.is_master_key_set().unwrap());
    engine.set_master_key("hunter2").unwrap();
    assert!(engine.is_master_key_set().unwrap());

    assert!(engine.is_master_key_correct("hunter2").unwrap());
    assert!(!engine.is_master_key_correct("wrong").unwrap());
}

#[test]
fn correctness_check_before_setup_is_false() {
    let dir = TempDir::new().unwrap();
    assert!(!engine(&dir).is_master_key_correct("anything").unwrap());
}

#[test]
fn master_key_can_only_be_set_once() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    engine.set_master_key("first").unwrap();
    assert!(matches!(
        engine.set_master_key("second"),
        Err(NengPassError::Validation(ValidationError::AlreadySet))
    ));
    assert!(engine.is_master_key_correct("first").unwrap());
    assert!(!engine.is_master_key_correct("second").unwrap());
}

#[test]
fn master_key_length_limit_is_enforced() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    assert!(matches!(
        engine.set_master_key(&"k".repeat(33)),
        Err(NengPassError::Validation(ValidationError::KeyTooLong { max: 32 }))
    ));
    assert!(!engine.is_master_key_set().unwrap());

    engine.set_master_key(&"k".repeat(32)).unwrap();
}

#[test]
fn master_key_survives_reopen() {
    let dir = TempDir::new().unwrap();
    engine(&dir).set_master_key("hunter2").unwrap();

    let reopened = engine(&dir);
    assert!(reopened.is_master_key_set().unwrap());
    assert!(reopened.is_master_key_correct("hunter2").unwrap());
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

#[test]
fn save_list_get_delete_scenario() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    engine.set_master_key("hunter2").unwrap();

    engine.save_password("hunter2", "github", "p@ss").unwrap();
    assert!(engine
        .get_password_list()
        .unwrap()
        .contains(&"github".to_string()));
    assert_eq!(engine.get_password("hunter2", "github").unwrap().as_str(), "p@ss");

    engine.delete_password("github").unwrap();
    assert!(!engine
        .get_password_list()
        .unwrap()
        .contains(&"github".to_string()));
}

#[test]
fn get_with_different_key_never_returns_a_string() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    engine.save_password("k1", "github", "p@ss").unwrap();
    assert!(matches!(
        engine.get_password("k2", "github"),
        Err(NengPassError::AuthenticationFailure)
    ));
}

#[test]
fn deleted_and_missing_names_are_not_found() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    engine.save_password("k", "a", "x").unwrap();
    engine.delete_password("a").unwrap();

    assert!(matches!(
        engine.get_password("k", "a"),
        Err(NengPassError::NotFound(_))
    ));
    assert!(matches!(
        engine.delete_password("never-existed"),
        Err(NengPassError::NotFound(_))
    ));
}

#[test]
fn overwrite_replaces_the_old_value() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    engine.save_password("k", "a", "old").unwrap();
    engine.save_password("k", "a", "new").unwrap();

    assert_eq!(engine.get_password("k", "a").unwrap().as_str(), "new");
    assert_eq!(engine.get_password_list().unwrap(), ["a"]);
}

#[test]
fn seventeen_character_password_leaves_vault_unchanged() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    engine.save_password("k", "kept", "ok").unwrap();

    let before = engine.get_password_metadata().unwrap();
    let result = engine.save_password("k", "long", "abcdefghijklmnopq");

    assert!(matches!(
        result,
        Err(NengPassError::Validation(ValidationError::ValueTooLong { max: 16 }))
    ));
    assert_eq!(engine.get_password_metadata().unwrap(), before);
    assert_eq!(engine.get_password("k", "kept").unwrap().as_str(), "ok");
}

#[test]
fn empty_fields_are_validation_errors() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    let err = engine.save_password("k", "", "x").unwrap_err();
    assert!(err.is_validation());
    let err = engine.save_password("k", "a", "").unwrap_err();
    assert!(err.is_validation());
    let err = engine.delete_password("").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn configured_limits_replace_the_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        max_password_len: 24,
        ..test_settings(BackendKind::File)
    };
    let engine = Engine::open(settings, dir.path()).unwrap();

    engine
        .save_password("k", "long", "abcdefghijklmnopqrstuvwx")
        .unwrap();
    assert!(engine
        .save_password("k", "longer", "abcdefghijklmnopqrstuvwxy")
        .is_err());
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[test]
fn generated_passwords_differ_and_follow_policy() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    let a = engine.generate_password().unwrap();
    let b = engine.generate_password().unwrap();
    assert_ne!(a.as_str(), b.as_str());

    for pw in [&a, &b] {
        assert_eq!(pw.chars().count(), engine.settings().generated_length);
        assert!(pw.bytes().all(|c| ALPHABET.contains(&c)));
    }
}

#[test]
fn generated_password_can_be_saved() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    let pw = engine.generate_password().unwrap();
    engine.save_password("k", "generated", &pw).unwrap();
    assert_eq!(
        engine.get_password("k", "generated").unwrap().as_str(),
        pw.as_str()
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_saves_lose_no_entries() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(engine(&dir));

    std::thread::scope(|s| {
        for t in 0..4 {
            let engine = Arc::clone(&engine);
            s.spawn(move || {
                for i in 0..3 {
                    let name = format!("t{t}-{i}");
                    engine.save_password("k", &name, &name).unwrap();
                }
            });
        }
    });

    let names: HashSet<_> = engine.get_password_list().unwrap().into_iter().collect();
    assert_eq!(names.len(), 12);
    for t in 0..4 {
        for i in 0..3 {
            let name = format!("t{t}-{i}");
            assert_eq!(engine.get_password("k", &name).unwrap().as_str(), name);
        }
    }
}

#[test]
fn separate_handles_share_one_vault() {
    // Two engines over one directory stand in for two processes.
    let dir = TempDir::new().unwrap();
    let first = engine(&dir);
    let second = engine(&dir);

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..3 {
                first.save_password("k", &format!("a{i}"), "x").unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..3 {
                second.save_password("k", &format!("b{i}"), "y").unwrap();
            }
        });
    });

    assert_eq!(first.get_password_list().unwrap().len(), 6);
    assert_eq!(second.get_password("k", "a0").unwrap().as_str(), "x");
}

#[test]
fn concurrent_reads_see_committed_values() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    engine.save_password("k", "shared", "v1").unwrap();

    std::thread::scope(|s| {
        s.spawn(|| engine.save_password("k", "shared", "v2").unwrap());
        for _ in 0..3 {
            s.spawn(|| {
                let value = engine.get_password("k", "shared").unwrap();
                assert!(value.as_str() == "v1" || value.as_str() == "v2");
            });
        }
    });
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_backend_runs_the_same_scenarios() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open(test_settings(BackendKind::Sqlite), dir.path()).unwrap();
    assert_eq!(engine.backend().kind(), BackendKind::Sqlite);

    engine.set_master_key("hunter2").unwrap();
    assert!(engine.is_master_key_correct("hunter2").unwrap());
    assert!(!engine.is_master_key_correct("wrong").unwrap());

    engine.save_password("hunter2", "github", "p@ss").unwrap();
    assert_eq!(engine.get_password_list().unwrap(), ["github"]);
    assert_eq!(engine.get_password("hunter2", "github").unwrap().as_str(), "p@ss");
    engine.delete_password("github").unwrap();
    assert!(engine.get_password_list().unwrap().is_empty());
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_concurrent_saves_lose_no_entries() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(Engine::open(test_settings(BackendKind::Sqlite), dir.path()).unwrap());

    std::thread::scope(|s| {
        for t in 0..3 {
            let engine = Arc::clone(&engine);
            s.spawn(move || {
                for i in 0..3 {
                    engine
                        .save_password("k", &format!("t{t}-{i}"), "x")
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(engine.get_password_list().unwrap().len(), 9);
}
