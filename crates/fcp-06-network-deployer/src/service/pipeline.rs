use fcp_03_orderer_resolver::{ConfigBlockSource, OrdererResolver, ResolverConfig};
use fcp_04_config_proposer::{ConfigUpdateProposer, ProposerConfig};
use fcp_05_signature_submitter::{ConfigUpdateSubmitter, OrdererBroadcaster, SubmitterConfig};
use shared_types::{KeyStore, RecordStore};
use std::sync::Arc;

/// Resolver, proposer and submitter wired over one set of ports.
#[derive(Clone)]
pub struct ConfigPipeline {
    pub resolver: Arc<OrdererResolver>,
    pub proposer: Arc<ConfigUpdateProposer>,
    pub submitter: Arc<ConfigUpdateSubmitter>,
}

/// Tunables of the three pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub resolver: ResolverConfig,
    pub proposer: ProposerConfig,
    pub submitter: SubmitterConfig,
}

impl PipelineConfig {
    pub fn for_testing() -> Self {
        Self {
            resolver: ResolverConfig::for_testing(),
            proposer: ProposerConfig::for_testing(),
            submitter: SubmitterConfig::for_testing(),
        }
    }
}

impl ConfigPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: Arc<dyn KeyStore>,
        source: Arc<dyn ConfigBlockSource>,
        broadcaster: Arc<dyn OrdererBroadcaster>,
        config: PipelineConfig,
    ) -> Self {
        let resolver = Arc::new(OrdererResolver::new(store.clone(), source, config.resolver));
        let proposer = Arc::new(ConfigUpdateProposer::new(resolver.clone(), config.proposer));
        let submitter = Arc::new(ConfigUpdateSubmitter::new(
            store,
            keys,
            resolver.clone(),
            broadcaster,
            config.submitter,
        ));
        Self {
            resolver,
            proposer,
            submitter,
        }
    }
}
