//! Readiness gate for the sr25519 primitive.
//!
//! sr25519 derivation and Substrate mini-secret seeds may only run after the
//! primitive has passed a one-time known-answer self-test. The gate is owned by
//! whoever owns the [`Sr25519Binding`] (usually a [`crate::KeyEngine`]), not by
//! global state.
//!
//! # Notes
//!
//! Initialization is memoized, including its failure: once the self-test has
//! failed every later sr25519 call fails with
//! [`DerivationError::NativeBindingNotReady`].

use std::sync::atomic::{AtomicUsize, Ordering};

use schnorrkel::{ExpansionMode, MiniSecretKey};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::DerivationError;

/// Signing context used by the self-test.
const SELF_TEST_CONTEXT: &[u8] = b"substrate";

/// Mini-secret of `food talent voyage degree siege clever account medal film remind good kind`.
const SELF_TEST_MINI_SECRET: [u8; 32] = [
    0x55, 0xa1, 0x41, 0x7b, 0xbf, 0xac, 0xd6, 0x4e, 0x06, 0x9b, 0x4d, 0x07, 0xe4, 0x7f, 0xb3, 0x4c,
    0xe9, 0xff, 0x53, 0xb1, 0x55, 0x56, 0x69, 0x80, 0x38, 0x60, 0x4f, 0x00, 0x25, 0x24, 0xae, 0xc0,
];

/// Public key expected from [`SELF_TEST_MINI_SECRET`].
const SELF_TEST_PUBLIC_KEY: [u8; 32] = [
    0x52, 0xe1, 0xd7, 0x06, 0x19, 0x67, 0x8f, 0x95, 0xa0, 0x80, 0x6f, 0xa5, 0xeb, 0x81, 0x8f, 0xc9,
    0x38, 0xcd, 0x5f, 0x88, 0x5a, 0x19, 0xc3, 0xfb, 0x24, 0x2d, 0x0b, 0x0d, 0x06, 0x20, 0xee, 0x10,
];

/// Handle on the sr25519 primitive and its one-time initialization.
#[derive(Debug)]
pub struct Sr25519Binding {
    ready: OnceCell<Result<(), String>>,
    initializations: AtomicUsize,
    self_test: fn() -> Result<(), String>,
}

impl Default for Sr25519Binding {
    fn default() -> Self {
        Self::with_self_test(known_answer_test)
    }
}

impl Sr25519Binding {
    /// Creates a binding that has not been initialized yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a binding that runs `self_test` as its initialization.
    pub fn with_self_test(self_test: fn() -> Result<(), String>) -> Self {
        Self {
            ready: OnceCell::new(),
            initializations: AtomicUsize::new(0),
            self_test,
        }
    }

    /// Runs the initialization once; concurrent and later callers share its outcome.
    pub async fn ensure_ready(&self) -> Result<(), DerivationError> {
        let outcome = self
            .ready
            .get_or_init(|| async {
                self.initializations.fetch_add(1, Ordering::SeqCst);
                let outcome = (self.self_test)();
                match &outcome {
                    Ok(()) => info!("sr25519 binding ready"),
                    Err(reason) => error!(%reason, "sr25519 binding failed to initialize"),
                }
                outcome
            })
            .await;

        outcome.clone().map_err(DerivationError::NativeBindingNotReady)
    }

    /// Fails unless [`Self::ensure_ready`] has completed successfully.
    pub fn check_ready(&self) -> Result<(), DerivationError> {
        match self.ready.get() {
            Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(DerivationError::NativeBindingNotReady(reason.clone())),
            None => Err(DerivationError::NativeBindingNotReady(
                "initialization has not completed".to_owned(),
            )),
        }
    }

    /// How many times the initialization has actually run.
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

/// Expands a fixed mini-secret, checks the public key, then signs and verifies.
fn known_answer_test() -> Result<(), String> {
    let mini = MiniSecretKey::from_bytes(&SELF_TEST_MINI_SECRET).map_err(|e| e.to_string())?;
    let keypair = mini.expand_to_keypair(ExpansionMode::Ed25519);

    if keypair.public.to_bytes() != SELF_TEST_PUBLIC_KEY {
        return Err("known-answer public key mismatch".to_owned());
    }

    let signature = keypair.sign_simple(SELF_TEST_CONTEXT, b"ready");
    keypair
        .public
        .verify_simple(SELF_TEST_CONTEXT, b"ready", &signature)
        .map_err(|e| format!("self-test signature rejected: {e}"))
}
