use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{info, warn};

use crate::aws::{ProviderKind, Session};
use crate::event::{Action, ProgressEvent};
use crate::model::SamlProviderModel;

/// Local name of the root element of SAML 2.0 metadata
const METADATA_ROOT_ELEMENT: &[u8] = b"EntityDescriptor";

/// Check that a metadata document is well-formed XML rooted at `EntityDescriptor`
pub fn check_metadata_document(document: &str) -> Result<()> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut root: Option<Vec<u8>> = None;
    let mut depth = 0usize;
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => bail!(
                "SAML metadata document is not well-formed XML at position {}: {}",
                reader.buffer_position(),
                e
            ),
        };
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if depth == 0 {
                    if root.is_some() {
                        bail!("SAML metadata document has more than one root element");
                    }
                    root = Some(e.local_name().as_ref().to_vec());
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        bail!("SAML metadata document ends with {} unclosed element(s)", depth);
    }
    match root {
        Some(name) if name == METADATA_ROOT_ELEMENT => Ok(()),
        Some(name) => bail!(
            "SAML metadata document root element must be EntityDescriptor, found {}",
            String::from_utf8_lossy(&name)
        ),
        None => bail!("SAML metadata document contains no XML element"),
    }
}

fn identifier(model: &SamlProviderModel) -> Result<&str> {
    model
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .context("SAML provider Name is required")
}

fn metadata_document(model: &SamlProviderModel) -> Result<&str> {
    let document = model
        .saml_metadata_document
        .as_deref()
        .context("SAMLMetadataDocument is required")?;
    check_metadata_document(document)?;
    Ok(document)
}

pub async fn handle(
    session: &Session,
    action: Action,
    desired: SamlProviderModel,
) -> ProgressEvent<SamlProviderModel> {
    match action {
        Action::Create => create(session, desired).await,
        Action::Read => read(session, desired).await,
        Action::Update => update(session, desired).await,
        Action::Delete => delete(session, desired).await,
        Action::List => list(desired),
    }
}

fn outcome(
    action: Action,
    model: SamlProviderModel,
    result: Result<()>,
) -> ProgressEvent<SamlProviderModel> {
    match result {
        Ok(()) => ProgressEvent::success(action, model),
        Err(e) => {
            warn!("{} of SAML provider failed: {:#}", action, e);
            ProgressEvent::failed(action, model, &e)
        }
    }
}

pub async fn create(session: &Session, model: SamlProviderModel) -> ProgressEvent<SamlProviderModel> {
    let result = create_provider(session, &model).await;
    outcome(Action::Create, model, result)
}

async fn create_provider(session: &Session, model: &SamlProviderModel) -> Result<()> {
    let name = identifier(model)?;
    let document = metadata_document(model)?;

    match session.iam.create_saml_provider(name, document).await {
        Ok(()) => info!("Created SAML provider {}", name),
        Err(e) if e.is_already_exists() => info!("SAML provider {} already exists", name),
        Err(e) => return Err(e).context("error creating SAML provider"),
    }
    Ok(())
}

pub async fn read(session: &Session, mut model: SamlProviderModel) -> ProgressEvent<SamlProviderModel> {
    let result = resolve_arn(session, &model).await.map(|arn| {
        model.arn = Some(arn);
    });
    outcome(Action::Read, model, result)
}

async fn resolve_arn(session: &Session, model: &SamlProviderModel) -> Result<String> {
    let name = identifier(model)?;
    let provider = session
        .provider_identity(ProviderKind::Saml, name)
        .await
        .context("error retrieving SAML provider ARN")?;
    Ok(provider.arn())
}

pub async fn update(
    session: &Session,
    mut model: SamlProviderModel,
) -> ProgressEvent<SamlProviderModel> {
    let result = update_provider(session, &mut model).await;
    outcome(Action::Update, model, result)
}

async fn update_provider(session: &Session, model: &mut SamlProviderModel) -> Result<()> {
    let document = metadata_document(model)?.to_string();
    let arn = resolve_arn(session, model).await?;

    session
        .iam
        .update_saml_provider(&arn, &document)
        .await
        .context("error updating SAML provider")?;

    info!("Updated SAML provider {}", arn);
    model.arn = Some(arn);
    Ok(())
}

pub async fn delete(session: &Session, model: SamlProviderModel) -> ProgressEvent<SamlProviderModel> {
    let result = delete_provider(session, &model).await;
    outcome(Action::Delete, model, result)
}

async fn delete_provider(session: &Session, model: &SamlProviderModel) -> Result<()> {
    let arn = resolve_arn(session, model).await?;
    session
        .iam
        .delete_saml_provider(&arn)
        .await
        .context("error deleting SAML provider")?;
    info!("Deleted SAML provider {}", arn);
    Ok(())
}

pub fn list(model: SamlProviderModel) -> ProgressEvent<SamlProviderModel> {
    ProgressEvent::success(Action::List, model)
}
