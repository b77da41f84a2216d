//! Per-scenario plumbing for the behaviour tests: one runtime and one fake
//! GitHub, both created by the first `Given` step.

use std::rc::Rc;

use marginalia::PublishError;
use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::MockServer;

use super::github_api::{Rejection, mount_github};

/// Runtime handle that scenario steps share through a `Slot`.
#[derive(Clone)]
pub struct ScenarioRuntime(Rc<Runtime>);

impl ScenarioRuntime {
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Starts a fake GitHub that fails the step named by `rejection`, storing
/// the runtime and server in the scenario's slots.
///
/// # Errors
///
/// Returns [`PublishError::Io`] when the runtime cannot start, and
/// [`PublishError::Configuration`] if the scenario already has a server.
pub fn start_fake_github(
    runtime: &Slot<ScenarioRuntime>,
    server: &Slot<MockServer>,
    rejection: Rejection,
) -> Result<ScenarioRuntime, PublishError> {
    if server.with_ref(|_| ()).is_some() {
        return Err(PublishError::Configuration {
            message: "a scenario seeds the fake GitHub once".to_owned(),
        });
    }

    let shared = ScenarioRuntime(Rc::new(Runtime::new().map_err(|error| {
        PublishError::Io {
            message: format!("failed to start Tokio runtime: {error}"),
        }
    })?));
    let fake = shared.block_on(async {
        let fake = MockServer::start().await;
        mount_github(&fake, rejection).await;
        fake
    });

    runtime.set(shared.clone());
    server.set(fake);
    Ok(shared)
}
