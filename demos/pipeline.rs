//! Release Pipeline
//!
//! This example walks a three-step release pipeline through the harness.
//! The publish step refuses the release, the cleanup state runs anyway,
//! and the recovery hook rolls the staging area back.
//!
//! Key concepts:
//! - States as closures over a shared owner object
//! - A cleanup state that runs whether the chain succeeds or fails
//! - An error hook producing a compensating state
//!
//! Run with: cargo run --example pipeline

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use relay::harness::{self, finally, on_error, Panic};
use relay::{state_fn, Transition};

#[derive(Debug, Clone, PartialEq, Error)]
enum ReleaseError {
    #[error("registry refused the artifact")]
    Refused,
    #[error(transparent)]
    Panicked(#[from] Panic),
}

#[derive(Default)]
struct Release {
    staged: Vec<&'static str>,
    published: bool,
    rolled_back: bool,
}

fn stage(release: Rc<RefCell<Release>>) -> Transition<ReleaseError> {
    println!("staging artifacts");
    release.borrow_mut().staged = vec!["app.tar.gz", "manifest.json"];
    Ok(Some(state_fn(move || verify(release))))
}

fn verify(release: Rc<RefCell<Release>>) -> Transition<ReleaseError> {
    let count = release.borrow().staged.len();
    println!("verifying {count} staged artifacts");
    Ok(Some(state_fn(move || publish(release))))
}

fn publish(_release: Rc<RefCell<Release>>) -> Transition<ReleaseError> {
    println!("publishing... refused by the registry");
    Err(ReleaseError::Refused)
}

fn main() {
    println!("=== Release Pipeline Example ===\n");

    let release = Rc::new(RefCell::new(Release::default()));

    let cleanup = {
        let release = Rc::clone(&release);
        state_fn(move || {
            println!("cleanup: dropping staged artifacts");
            release.borrow_mut().staged.clear();
            Ok(None)
        })
    };

    let rollback = {
        let release = Rc::clone(&release);
        move |err: &ReleaseError| {
            println!("recovery: rolling back after: {err}");
            let release = Rc::clone(&release);
            state_fn(move || {
                release.borrow_mut().rolled_back = true;
                Ok(None)
            })
        }
    };

    let entry = {
        let release = Rc::clone(&release);
        state_fn(move || stage(release))
    };

    let result = harness::activate(entry, [finally(cleanup), on_error(rollback)]);

    let release = release.borrow();
    println!("\nrun result:   {result:?}");
    println!("published:    {}", release.published);
    println!("staged items: {}", release.staged.len());
    println!("rolled back:  {}", release.rolled_back);

    println!("\n=== Example Complete ===");
}
