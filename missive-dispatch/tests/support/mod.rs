//! Scripted providers for exercising the dispatcher without any vendor.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use missive_common::{ConfigMap, Missive};
use missive_dispatch::{Provider, ProviderDescriptor, ProviderError, ProviderFactory};

/// What a scripted provider does when offered a missive.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Accept and stamp an external id.
    Succeed,
    /// Decline without raising.
    Decline,
    /// Raise a transport error with this text.
    Fail(String),
}

pub struct ScriptedFactory {
    descriptor: ProviderDescriptor,
    behavior: Behavior,
    sends: Arc<AtomicUsize>,
    built_configs: Arc<Mutex<Vec<ConfigMap>>>,
}

impl ScriptedFactory {
    pub fn new(descriptor: ProviderDescriptor, behavior: Behavior) -> Self {
        Self {
            descriptor,
            behavior,
            sends: Arc::new(AtomicUsize::new(0)),
            built_configs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// How many times a built instance was asked to send.
    pub fn send_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.sends)
    }

    /// Every configuration an instance was built with, in order.
    pub fn built_configs(&self) -> Arc<Mutex<Vec<ConfigMap>>> {
        Arc::clone(&self.built_configs)
    }
}

impl ProviderFactory for ScriptedFactory {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn build(&self, config: ConfigMap) -> Result<Box<dyn Provider>, ProviderError> {
        self.built_configs.lock().unwrap().push(config);

        Ok(Box::new(ScriptedProvider {
            descriptor: self.descriptor.clone(),
            behavior: self.behavior.clone(),
            sends: Arc::clone(&self.sends),
        }))
    }
}

struct ScriptedProvider {
    descriptor: ProviderDescriptor,
    behavior: Behavior,
    sends: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn send(&self, missive: &mut Missive) -> Result<bool, ProviderError> {
        self.sends.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Succeed => {
                missive.external_id = Some(format!("{}-0001", self.descriptor.name));
                Ok(true)
            }
            Behavior::Decline => Ok(false),
            Behavior::Fail(message) => Err(ProviderError::Transport(message.clone())),
        }
    }
}
