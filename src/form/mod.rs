//! Form/edit session.
//!
//! An [`EditSession`] owns the working copy of at most one record. Opening
//! it with nothing starts from the kind's blank template ("add"); opening it
//! with a record copies that record's fields ("edit"). Submitting sends the
//! buffer through the entity store as a create or an update:
//!
//! ```text
//! Closed -> Open -> Submitting -> Closed          (success)
//!                              -> Open + error    (failure, buffer kept)
//! Open -> Closed                                  (cancel)
//! ```

pub mod validator;

use std::marker::PhantomData;

use serde_json::{Map, Value};
use tracing::debug;

use crate::entity::Entity;
use crate::error::{LeadflowError, Result};
use crate::store::EntityStore;

pub use validator::{FormValidator, ValidationResult, parse_field_value};

/// Working copy of a record's fields.
pub type EditBuffer = Map<String, Value>;

/// The editing mode state machine
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditMode {
    #[default]
    Closed,
    Open {
        buffer: EditBuffer,
        /// Id of the record being edited; `None` when adding
        target: Option<String>,
        /// Message from the last failed submit
        error: Option<String>,
    },
    Submitting {
        buffer: EditBuffer,
        target: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct EditSession<E> {
    mode: EditMode,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for EditSession<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EditSession<E> {
    pub fn new() -> Self {
        Self {
            mode: EditMode::Closed,
            _kind: PhantomData,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        matches!(self.mode, EditMode::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.mode, EditMode::Closed)
    }

    /// True when the session adds a new record rather than editing one.
    pub fn is_creating_new(&self) -> bool {
        matches!(
            self.mode,
            EditMode::Open { target: None, .. } | EditMode::Submitting { target: None, .. }
        )
    }

    pub fn target(&self) -> Option<&str> {
        match &self.mode {
            EditMode::Open { target, .. } | EditMode::Submitting { target, .. } => target.as_deref(),
            EditMode::Closed => None,
        }
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.mode {
            EditMode::Open { buffer, .. } | EditMode::Submitting { buffer, .. } => Some(buffer),
            EditMode::Closed => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.mode {
            EditMode::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Open the form, blank or populated from `entity`.
    ///
    /// Any buffer from a previous session is discarded.
    pub fn open(&mut self, entity: Option<&E>) -> EditBuffer {
        let (buffer, target) = match entity {
            Some(entity) => {
                let mut fields = entity.fields();
                fields.remove("id");
                (fields, Some(entity.id().to_string()))
            }
            None => (E::template(), None),
        };

        self.mode = EditMode::Open {
            buffer: buffer.clone(),
            target,
            error: None,
        };
        buffer
    }

    /// Open an edit of record `id` with an empty buffer.
    ///
    /// Used when the record is not in the snapshot: only the fields changed
    /// afterwards are sent, as a partial update.
    pub fn open_by_id(&mut self, id: &str) {
        self.mode = EditMode::Open {
            buffer: EditBuffer::new(),
            target: Some(id.to_string()),
            error: None,
        };
    }

    /// Set one field of the buffer.
    pub fn change(&mut self, field: &str, value: Value) -> Result<()> {
        if field == "id" {
            return Err(LeadflowError::InvalidField(
                "id cannot be edited".to_string(),
            ));
        }
        match &mut self.mode {
            EditMode::Open { buffer, .. } => {
                buffer.insert(field.to_string(), value);
                Ok(())
            }
            EditMode::Submitting { .. } => Err(LeadflowError::InvalidField(format!(
                "cannot change '{field}' while the form is submitting"
            ))),
            EditMode::Closed => Err(LeadflowError::InvalidField(format!(
                "cannot change '{field}': no form is open"
            ))),
        }
    }

    /// Close the form and drop the buffer. Returns `false` if there was
    /// nothing to cancel (closed, or already submitting).
    pub fn cancel(&mut self) -> bool {
        if self.is_open() {
            self.mode = EditMode::Closed;
            true
        } else {
            false
        }
    }

    /// Validate and send the buffer.
    ///
    /// On success the session closes and the server's record is returned. On
    /// failure the session reopens with the same buffer and the error
    /// message, ready for another attempt.
    pub async fn submit(&mut self, store: &EntityStore<E>) -> Result<E> {
        let (buffer, target) = match std::mem::take(&mut self.mode) {
            EditMode::Open { buffer, target, .. } => (buffer, target),
            other => {
                self.mode = other;
                return Err(LeadflowError::Validation(
                    "no open form to submit".to_string(),
                ));
            }
        };

        let validation = match target {
            Some(_) => FormValidator::validate_present::<E>(&buffer),
            None => FormValidator::validate::<E>(&buffer),
        };
        if let Some(message) = validation.error {
            self.mode = EditMode::Open {
                buffer,
                target,
                error: Some(message.clone()),
            };
            return Err(LeadflowError::Validation(message));
        }

        self.mode = EditMode::Submitting {
            buffer: buffer.clone(),
            target: target.clone(),
        };
        debug!(kind = %E::KIND, id = ?target, "submitting form");

        let result = match &target {
            Some(id) => store.update(id, &buffer).await,
            None => store.create(&buffer).await,
        };

        match result {
            Ok(entity) => {
                self.mode = EditMode::Closed;
                Ok(entity)
            }
            Err(error) => {
                self.mode = EditMode::Open {
                    buffer,
                    target,
                    error: Some(error.user_message()),
                };
                Err(error)
            }
        }
    }
}
