//! Contact command - validate and "send" a message

use crate::cli::args::ContactArgs;
use crate::config::Config;
use crate::contact::ContactForm;
use crate::error::{ProcurementError, ProcurementResult};
use crate::ui::{self, ConsoleView, UiContext};

/// Execute the contact command
pub async fn execute(args: ContactArgs, config: &Config) -> ProcurementResult<()> {
    let ctx = UiContext::detect();
    let view = ConsoleView::new(ctx.clone());

    let form = ContactForm::new(args.name, args.email, args.message);
    if form.submit(&view).is_err() {
        return Err(ProcurementError::User("Message not sent".to_string()));
    }

    ui::remark(
        &ctx,
        &format!(
            "For urgent requests call {}",
            config.organization.contact_phone
        ),
    );
    Ok(())
}
