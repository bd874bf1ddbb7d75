//! Tokio runtime and Wiremock server shared by the behavioural tests.
//!
//! Step functions are synchronous, so each scenario owns a runtime stored in
//! a [`Slot`] and drives async calls through [`SharedRuntime::block_on`].

use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::rc::Rc;

use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::MockServer;

/// Runtime handle that can live in a scenario slot.
#[derive(Clone)]
pub struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    pub fn new(runtime: Runtime) -> Self {
        Self(Rc::new(RefCell::new(runtime)))
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }

    /// Runs `action` inside the runtime context, for constructors that
    /// spawn background tasks.
    pub fn enter<T>(&self, action: impl FnOnce() -> T) -> T {
        let runtime = self.0.borrow();
        let _guard = runtime.enter();
        action()
    }
}

/// Returns the scenario runtime and makes sure a mock server is listening,
/// creating either on first use.
///
/// # Errors
///
/// Returns an error when the Tokio runtime cannot be built.
pub fn runtime_with_server(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
) -> Result<SharedRuntime, io::Error> {
    let shared = match runtime.get() {
        Some(existing) => existing,
        None => {
            let created = SharedRuntime::new(Runtime::new()?);
            runtime.set(created.clone());
            created
        }
    };

    if server.with_ref(|_| ()).is_none() {
        server.set(shared.block_on(MockServer::start()));
    }

    Ok(shared)
}

/// Base URL of the scenario's mock server.
///
/// # Errors
///
/// Returns an error when no server has been started.
pub fn server_uri(server: &Slot<MockServer>) -> Result<String, io::Error> {
    server
        .with_ref(MockServer::uri)
        .ok_or_else(|| io::Error::other("mock server not started"))
}
