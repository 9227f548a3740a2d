use super::ContactArgs;
use crate::output::Output;
use anyhow::Result;
use folio_client::{ContactForm, ContactMessage, EmailJsSender};
use folio_core::AppConfig;
use std::sync::Arc;

pub async fn run(args: ContactArgs, config: &AppConfig, output: &Output) -> Result<()> {
    let sender = EmailJsSender::from_config(config)?;
    let form = ContactForm::from_config(Arc::new(sender), config);

    let message = ContactMessage { name: args.name, email: args.email, subject: args.subject, message: args.message };

    match form.submit(&message).await {
        Ok(()) => {
            output.submit(form.status(), None);
            Ok(())
        }
        Err(e) => {
            output.submit(form.status(), Some(&e.to_string()));
            Err(e.into())
        }
    }
}
