//! Contact form validation and submission.

use linkify::{LinkFinder, LinkKind};
use tracing::{debug, warn};

use crate::ajax::{AjaxRequest, Transport};
use crate::dom::{Document, NodeId, Selector, SelectorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactValues {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(Vec<FieldError>),
    Sent(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactFormConfig {
    pub form_selector: String,
    pub status_selector: String,
    pub submit_selector: String,
    pub endpoint: String,
    pub min_name_len: usize,
    pub min_message_len: usize,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            form_selector: "#contact-form".to_string(),
            status_selector: ".form-status".to_string(),
            submit_selector: "button[type=submit]".to_string(),
            endpoint: "/api/contact".to_string(),
            min_name_len: 2,
            min_message_len: 10,
        }
    }
}

/// A complete address and nothing else, as recognized by the link finder.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Email]);
    let mut links = finder.links(value);
    match (links.next(), links.next()) {
        (Some(link), None) => link.start() == 0 && link.end() == value.len(),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    form: Selector,
    status: Selector,
    submit: Selector,
    error_message: Selector,
    config: ContactFormConfig,
}

impl ContactForm {
    pub fn new(config: ContactFormConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            form: Selector::parse(&config.form_selector)?,
            status: Selector::parse(&config.status_selector)?,
            submit: Selector::parse(&config.submit_selector)?,
            error_message: Selector::class("error-message")?,
            config,
        })
    }

    pub fn form_selector(&self) -> &Selector {
        &self.form
    }

    pub fn form(&self, doc: &Document) -> Option<NodeId> {
        doc.query(&self.form)
    }

    fn field_node(&self, doc: &Document, form: NodeId, field: Field) -> Option<NodeId> {
        let sel = Selector::parse(&format!("[name={}]", field.name())).ok()?;
        doc.query_selector(form, &sel)
    }

    fn field_value(doc: &Document, node: NodeId) -> String {
        match doc.tag(node) {
            Some("textarea") => doc.text_content(node),
            _ => doc.attr(node, "value").unwrap_or_default().to_string(),
        }
    }

    pub fn read_values(&self, doc: &Document) -> Option<ContactValues> {
        let form = self.form(doc)?;
        let read = |field| {
            self.field_node(doc, form, field)
                .map(|n| Self::field_value(doc, n).trim().to_string())
                .unwrap_or_default()
        };
        Some(ContactValues {
            name: read(Field::Name),
            email: read(Field::Email),
            subject: read(Field::Subject),
            message: read(Field::Message),
        })
    }

    pub fn validate(&self, values: &ContactValues) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut fail = |field, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            })
        };
        if values.name.is_empty() {
            fail(Field::Name, "Please enter your name.");
        } else if values.name.chars().count() < self.config.min_name_len {
            fail(Field::Name, "Name is too short.");
        }
        if values.email.is_empty() {
            fail(Field::Email, "Please enter your email address.");
        } else if !is_valid_email(&values.email) {
            fail(Field::Email, "Please enter a valid email address.");
        }
        if values.message.is_empty() {
            fail(Field::Message, "Please enter a message.");
        } else if values.message.chars().count() < self.config.min_message_len {
            fail(Field::Message, "Message is too short.");
        }
        errors
    }

    /// Mark every field according to `errors`, clearing fields that passed.
    pub fn show_errors(&self, doc: &mut Document, errors: &[FieldError]) {
        let Some(form) = self.form(doc) else {
            return;
        };
        for field in Field::ALL {
            let Some(node) = self.field_node(doc, form, field) else {
                continue;
            };
            let error = errors.iter().find(|e| e.field == field);
            doc.toggle_class(node, "error", error.is_some());
            if error.is_some() {
                doc.set_attr(node, "aria-invalid", "true");
            } else {
                doc.remove_attr(node, "aria-invalid");
            }
            let slot = doc
                .parent(node)
                .and_then(|p| doc.query_selector(p, &self.error_message));
            if let Some(slot) = slot {
                doc.set_text(slot, error.map(|e| e.message.as_str()).unwrap_or(""));
            }
        }
    }

    fn set_status(&self, doc: &mut Document, form: NodeId, text: &str, ok: bool) {
        if let Some(status) = doc.query_selector(form, &self.status) {
            doc.set_text(status, text);
            doc.toggle_class(status, "success", ok);
            doc.toggle_class(status, "error", !ok);
        }
    }

    fn reset(&self, doc: &mut Document, form: NodeId) {
        for field in Field::ALL {
            let Some(node) = self.field_node(doc, form, field) else {
                continue;
            };
            if doc.tag(node) == Some("textarea") {
                doc.set_text(node, "");
            } else {
                doc.set_attr(node, "value", "");
            }
        }
    }

    /// Validate and, when valid, send the form through `transport`.
    pub fn submit(&self, doc: &mut Document, transport: &mut dyn Transport) -> SubmitOutcome {
        let Some(form) = self.form(doc) else {
            warn!(selector = %self.form, "contact form not found");
            return SubmitOutcome::Failed("Contact form is unavailable.".to_string());
        };
        let values = self.read_values(doc).unwrap_or_default();
        let errors = self.validate(&values);
        self.show_errors(doc, &errors);
        if !errors.is_empty() {
            debug!(count = errors.len(), "contact form invalid");
            return SubmitOutcome::Invalid(errors);
        }

        let button = doc.query_selector(form, &self.submit);
        let label = button.map(|b| doc.text_content(b));
        if let Some(b) = button {
            doc.set_attr(b, "disabled", "");
            doc.set_text(b, "Sending...");
        }

        let body = serde_json::json!({
            "name": values.name,
            "email": values.email,
            "subject": values.subject,
            "message": values.message,
        });
        let request = AjaxRequest::post(&self.config.endpoint, body);
        let outcome = match transport.send(&request) {
            Ok(resp) if resp.success => SubmitOutcome::Sent(
                resp.message
                    .unwrap_or_else(|| "Thank you! Your message has been sent.".to_string()),
            ),
            Ok(resp) => SubmitOutcome::Failed(
                resp.error
                    .unwrap_or_else(|| "Your message could not be sent.".to_string()),
            ),
            Err(err) => {
                warn!(%err, "contact form request failed");
                SubmitOutcome::Failed(err.user_message())
            }
        };

        if let (Some(b), Some(label)) = (button, label) {
            doc.remove_attr(b, "disabled");
            doc.set_text(b, &label);
        }
        match &outcome {
            SubmitOutcome::Sent(msg) => {
                self.set_status(doc, form, msg, true);
                self.reset(doc, form);
            }
            SubmitOutcome::Failed(msg) => self.set_status(doc, form, msg, false),
            SubmitOutcome::Invalid(_) => {}
        }
        debug!(?outcome, "contact form submitted");
        outcome
    }
}
