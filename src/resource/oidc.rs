use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::aws::{ProviderKind, Session};
use crate::event::{Action, ProgressEvent};
use crate::model::OidcProviderModel;

/// Provider name IAM derives from the issuer URL
pub fn provider_name(issuer_url: &str) -> &str {
    issuer_url.strip_prefix("https://").unwrap_or(issuer_url)
}

/// How the thumbprint list changes between two states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbprintChange {
    Unchanged,
    Replace(Vec<String>),
    /// Desired state dropped its list; fetch one from the issuer
    ResolveFromIssuer,
}

/// IAM calls needed to move a provider from one state to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub thumbprints: ThumbprintChange,
    pub remove_client_ids: Vec<String>,
    pub add_client_ids: Vec<String>,
}

impl UpdatePlan {
    pub fn between(previous: &OidcProviderModel, desired: &OidcProviderModel) -> Self {
        let thumbprints = if previous.thumbprint_list == desired.thumbprint_list {
            ThumbprintChange::Unchanged
        } else {
            match &desired.thumbprint_list {
                Some(list) => ThumbprintChange::Replace(list.clone()),
                None => ThumbprintChange::ResolveFromIssuer,
            }
        };

        // A changed list is reapplied whole: every previous ID goes, every desired ID comes back
        let (remove_client_ids, add_client_ids) = if previous.client_ids() == desired.client_ids()
        {
            (Vec::new(), Vec::new())
        } else {
            (
                previous.client_ids().to_vec(),
                desired.client_ids().to_vec(),
            )
        };

        Self {
            thumbprints,
            remove_client_ids,
            add_client_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.thumbprints == ThumbprintChange::Unchanged
            && self.remove_client_ids.is_empty()
            && self.add_client_ids.is_empty()
    }
}

fn identifier(model: &OidcProviderModel) -> Result<String> {
    model
        .name
        .as_deref()
        .or_else(|| model.url.as_deref().map(provider_name))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .context("OpenID Connect provider Name is required")
}

pub async fn handle(
    session: &Session,
    action: Action,
    previous: Option<OidcProviderModel>,
    desired: OidcProviderModel,
) -> ProgressEvent<OidcProviderModel> {
    match action {
        Action::Create => create(session, desired).await,
        Action::Read => read(session, desired).await,
        Action::Update => update(session, previous.unwrap_or_default(), desired).await,
        Action::Delete => delete(session, desired).await,
        Action::List => list(desired),
    }
}

fn outcome(
    action: Action,
    model: OidcProviderModel,
    result: Result<()>,
) -> ProgressEvent<OidcProviderModel> {
    match result {
        Ok(()) => ProgressEvent::success(action, model),
        Err(e) => {
            warn!("{} of OpenID Connect provider failed: {:#}", action, e);
            ProgressEvent::failed(action, model, &e)
        }
    }
}

pub async fn create(
    session: &Session,
    mut model: OidcProviderModel,
) -> ProgressEvent<OidcProviderModel> {
    let result = create_provider(session, &mut model).await;
    outcome(Action::Create, model, result)
}

async fn create_provider(session: &Session, model: &mut OidcProviderModel) -> Result<()> {
    let url = model
        .url
        .clone()
        .context("OpenID Connect provider Url is required")?;

    let thumbprints = match &model.thumbprint_list {
        Some(list) => list.clone(),
        None => {
            info!("No thumbprint supplied, retrieving one from {}", url);
            let thumbprint = session
                .thumbprints
                .resolve(&url)
                .await
                .context("could not retrieve thumbprint")?;
            vec![thumbprint]
        }
    };

    model.name = Some(provider_name(&url).to_string());

    match session
        .iam
        .create_oidc_provider(&url, model.client_ids(), &thumbprints)
        .await
    {
        Ok(()) => info!("Created OpenID Connect provider for {}", url),
        Err(e) if e.is_already_exists() => {
            info!("OpenID Connect provider for {} already exists", url);
        }
        Err(e) => return Err(e).context("error creating OpenID Connect provider"),
    }
    Ok(())
}

pub async fn read(
    session: &Session,
    mut model: OidcProviderModel,
) -> ProgressEvent<OidcProviderModel> {
    let result = read_provider(session, &mut model).await;
    outcome(Action::Read, model, result)
}

async fn read_provider(session: &Session, model: &mut OidcProviderModel) -> Result<()> {
    let name = identifier(model)?;
    let provider = session
        .provider_identity(ProviderKind::Oidc, &name)
        .await
        .context("error retrieving OpenID Connect provider ARN")?;
    model.arn = Some(provider.arn());
    Ok(())
}

pub async fn update(
    session: &Session,
    previous: OidcProviderModel,
    mut desired: OidcProviderModel,
) -> ProgressEvent<OidcProviderModel> {
    let result = update_provider(session, &previous, &mut desired).await;
    outcome(Action::Update, desired, result)
}

async fn update_provider(
    session: &Session,
    previous: &OidcProviderModel,
    desired: &mut OidcProviderModel,
) -> Result<()> {
    let name = identifier(desired).or_else(|_| identifier(previous))?;
    desired.name = Some(name.clone());

    let arn = session
        .provider_identity(ProviderKind::Oidc, &name)
        .await
        .context("error retrieving OpenID Connect provider ARN")?
        .arn();
    desired.arn = Some(arn.clone());

    let plan = UpdatePlan::between(previous, desired);
    if plan.is_empty() {
        info!("OpenID Connect provider {} is up to date", arn);
        return Ok(());
    }
    debug!("Update plan: {:?}", plan);

    // Thumbprints can only be replaced as a whole
    let thumbprints = match plan.thumbprints {
        ThumbprintChange::Unchanged => None,
        ThumbprintChange::Replace(list) => Some(list),
        ThumbprintChange::ResolveFromIssuer => {
            let url = desired
                .url
                .as_deref()
                .context("OpenID Connect provider Url is required to retrieve a thumbprint")?;
            let thumbprint = session
                .thumbprints
                .resolve(url)
                .await
                .context("could not retrieve thumbprint")?;
            Some(vec![thumbprint])
        }
    };
    if let Some(list) = thumbprints {
        session
            .iam
            .update_oidc_thumbprints(&arn, &list)
            .await
            .context("error updating thumbprint of OpenID Connect provider")?;
    }

    // Client IDs can only be added or removed one at a time; removing first
    // keeps IAM from seeing a transient duplicate.
    for client_id in &plan.remove_client_ids {
        session
            .iam
            .remove_oidc_client_id(&arn, client_id)
            .await
            .with_context(|| {
                format!("error removing client ID {client_id} from OpenID Connect provider")
            })?;
    }
    for client_id in &plan.add_client_ids {
        session
            .iam
            .add_oidc_client_id(&arn, client_id)
            .await
            .with_context(|| {
                format!("error adding client ID {client_id} to OpenID Connect provider")
            })?;
    }

    info!("Updated OpenID Connect provider {}", arn);
    Ok(())
}

pub async fn delete(
    session: &Session,
    model: OidcProviderModel,
) -> ProgressEvent<OidcProviderModel> {
    let result = delete_provider(session, &model).await;
    outcome(Action::Delete, model, result)
}

async fn delete_provider(session: &Session, model: &OidcProviderModel) -> Result<()> {
    let name = identifier(model)?;
    let arn = session
        .provider_identity(ProviderKind::Oidc, &name)
        .await
        .context("error retrieving OpenID Connect provider ARN")?
        .arn();

    session
        .iam
        .delete_oidc_provider(&arn)
        .await
        .context("error deleting OpenID Connect provider")?;
    info!("Deleted OpenID Connect provider {}", arn);
    Ok(())
}

/// Single-resource handler: nothing to enumerate
pub fn list(model: OidcProviderModel) -> ProgressEvent<OidcProviderModel> {
    ProgressEvent::success(Action::List, model)
}
