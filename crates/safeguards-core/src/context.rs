//! The shared, read-only execution context.
//!
//! Built once per deployment attempt and lent to every policy by reference.
//! Nothing on it is mutable after `build()` returns.

use tracing::debug;

use safeguards_contracts::{
    declaration::{FunctionDeclaration, ServiceDeclaration, ServiceMetadata},
    error::{SafeguardsError, SafeguardsResult},
    graph::{CompiledTemplate, ResourceGraph},
};

use crate::{naming::AwsNaming, traits::NamingResolver};

/// Everything a policy may inspect during one run.
pub struct SafeguardsContext {
    resources: ResourceGraph,
    functions: FunctionDeclaration,
    naming: Box<dyn NamingResolver>,
    service: ServiceMetadata,
}

impl SafeguardsContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Build a context straight from the two input documents, using the AWS
    /// naming convention derived from the declaration's service and stage.
    pub fn from_documents(
        template: CompiledTemplate,
        declaration: ServiceDeclaration,
    ) -> SafeguardsResult<Self> {
        let service = declaration.metadata();
        let mut builder = Self::builder()
            .functions(declaration.functions)
            .service(service);
        if let Some(resources) = template.resources {
            builder = builder.resources(resources);
        }
        builder.build()
    }

    pub fn resources(&self) -> &ResourceGraph {
        &self.resources
    }

    pub fn functions(&self) -> &FunctionDeclaration {
        &self.functions
    }

    pub fn naming(&self) -> &dyn NamingResolver {
        self.naming.as_ref()
    }

    pub fn service(&self) -> &ServiceMetadata {
        &self.service
    }
}

/// Assembles a `SafeguardsContext`, validating its inputs.
#[derive(Default)]
pub struct ContextBuilder {
    resources: Option<ResourceGraph>,
    functions: FunctionDeclaration,
    naming: Option<Box<dyn NamingResolver>>,
    service: Option<ServiceMetadata>,
}

impl ContextBuilder {
    /// The compiled resource graph. Required.
    pub fn resources(mut self, resources: ResourceGraph) -> Self {
        self.resources = Some(resources);
        self
    }

    /// The function declaration. Defaults to no functions.
    pub fn functions(mut self, functions: FunctionDeclaration) -> Self {
        self.functions = functions;
        self
    }

    /// Service name and stage. Required.
    pub fn service(mut self, service: ServiceMetadata) -> Self {
        self.service = Some(service);
        self
    }

    /// Override the naming resolver. Defaults to `AwsNaming` for the service.
    pub fn naming(mut self, naming: Box<dyn NamingResolver>) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Validate the inputs and produce the context.
    ///
    /// Returns `SafeguardsError::ConfigError` when the resource graph or the
    /// service metadata is missing, or when the naming resolver cannot be
    /// built from the metadata.
    pub fn build(self) -> SafeguardsResult<SafeguardsContext> {
        let resources = self.resources.ok_or_else(|| SafeguardsError::ConfigError {
            reason: "resource graph is missing; the service has not been compiled".to_string(),
        })?;
        let service = self.service.ok_or_else(|| SafeguardsError::ConfigError {
            reason: "service metadata is missing".to_string(),
        })?;
        let naming = match self.naming {
            Some(naming) => naming,
            None => Box::new(AwsNaming::from_metadata(&service)?),
        };

        debug!(
            service = %service.service,
            stage = %service.stage,
            resources = resources.len(),
            functions = self.functions.len(),
            "safeguards context built"
        );

        Ok(SafeguardsContext {
            resources,
            functions: self.functions,
            naming,
            service,
        })
    }
}
