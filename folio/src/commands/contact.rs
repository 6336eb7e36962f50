use std::{io::Write, time::Duration};

use anyhow::{bail, ensure, Context};
use clap::{Args, Subcommand};
use folio_config::Config;
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_models::{
    form::{ContactForm, FormField},
    validation::validate,
};
use tracing::{info, warn};

use crate::environment::{ConfigProvider, Provider};

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Validate, sanitize and send a contact request
    #[command(aliases(["s"]))]
    Send {
        #[command(flatten)]
        form: ContactFormArgs,
    },
    /// Validate and sanitize a contact request and print the payload
    /// without sending it
    #[command(aliases(["v"]))]
    Validate {
        #[command(flatten)]
        form: ContactFormArgs,
    },
    /// Check whether the contact API is reachable
    #[command(aliases(["h"]))]
    Health,
}

#[derive(Debug, Clone, Args)]
pub struct ContactFormArgs {
    /// Full name of the sender
    #[arg(long)]
    name: String,
    /// Email address to reply to
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl ContactFormArgs {
    fn fields(self) -> [(FormField, String); 6] {
        [
            (FormField::Name, self.name),
            (FormField::Email, self.email),
            (FormField::Subject, self.subject),
            (FormField::Message, self.message),
            (FormField::Company, self.company.unwrap_or_default()),
            (FormField::Phone, self.phone.unwrap_or_default()),
        ]
    }
}

impl ContactCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout();
        match self {
            ContactCommand::Validate { form } => validate_form(form, &mut stdout),
            ContactCommand::Send { form } => {
                let contact = make_provider(&config)?.contact_feature();
                submit_form(&contact, form, &mut stdout).await
            }
            ContactCommand::Health => {
                let contact = make_provider(&config)?.contact_feature();
                health(&contact, &mut stdout).await
            }
        }
    }
}

fn make_provider(config: &Config) -> anyhow::Result<Provider> {
    ConfigProvider::new(config)
        .and_then(Provider::new)
        .context("Failed to set up contact services")
}

/// Upper bound for delivering outstanding analytics events before exiting.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

async fn submit_form(
    contact: &impl ContactFeatureService,
    form: ContactFormArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let result = send(contact, form, out).await;
    if tokio::time::timeout(FLUSH_TIMEOUT, contact.flush()).await.is_err() {
        warn!("Timed out delivering analytics events");
    }
    result
}

async fn send(
    contact: &impl ContactFeatureService,
    form: ContactFormArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for (field, value) in form.fields() {
        contact.set_field(field, value);
    }

    match contact.submit().await {
        Ok(response) => {
            info!(success = response.success, "Contact API responded");
            writeln!(out, "{}", response.message)?;
            if let Some(data) = response.data {
                writeln!(out, "{}", serde_json::to_string_pretty(&data)?)?;
            }
            Ok(())
        }
        Err(ContactSubmitError::Validation(_)) => {
            for (field, message) in contact.view().field_errors.iter() {
                writeln!(out, "{field}: {message}")?;
            }
            bail!("The contact form is invalid")
        }
        Err(err) => Err(err).context("Failed to send contact form"),
    }
}

fn validate_form(form: ContactFormArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let mut contact_form = ContactForm::default();
    for (field, value) in form.fields() {
        contact_form.set(field, value);
    }

    match validate(&contact_form.to_raw()) {
        Ok(request) => {
            serde_json::to_writer_pretty(&mut *out, &request.sanitize())?;
            writeln!(out)?;
            Ok(())
        }
        Err(err) => {
            for error in &err.errors {
                writeln!(out, "{}: {}", FormField::from(error.field), error.message)?;
            }
            Err(err).context("The contact form is invalid")
        }
    }
}

async fn health(contact: &impl ContactFeatureService, out: &mut impl Write) -> anyhow::Result<()> {
    let healthy = contact.health_check().await;
    writeln!(
        out,
        "Contact API is {}",
        if healthy { "healthy" } else { "unreachable" }
    )?;
    ensure!(healthy, "Contact API health check failed");
    Ok(())
}
