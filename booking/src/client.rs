//! Client resolver: find an existing client or create one.
//!
//! Search and form modes are exclusive. Searching is debounced by the
//! reducer; this module only tracks which search generation is current so
//! that a quiet-period timer or a response for an outdated term is ignored.

use crate::environment::ClientDirectory;
use crate::error::{BookingError, ClientField, FieldError};
use crate::metrics::BookingMetrics;
use crate::types::{Client, ClientFields, ClientId};
use std::sync::Arc;

/// Minimum length of an identity-document number
pub const MIN_DOCUMENT_LEN: usize = 6;

/// Check an email address
///
/// Accepts `local@domain.tld` with a conservative character set.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

/// Validate the client form
///
/// # Errors
///
/// Returns one [`FieldError`] per invalid field.
pub fn validate_fields(fields: &ClientFields) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if fields.family_name.trim().is_empty() {
        errors.push(FieldError::new(ClientField::FamilyName, "is required"));
    }
    if fields.given_name.trim().is_empty() {
        errors.push(FieldError::new(ClientField::GivenName, "is required"));
    }
    if !is_valid_email(fields.email.trim()) {
        errors.push(FieldError::new(ClientField::Email, "not a valid email address"));
    }
    if fields.phone.trim().is_empty() {
        errors.push(FieldError::new(ClientField::Phone, "is required"));
    }
    if fields.document.trim().chars().count() < MIN_DOCUMENT_LEN {
        errors.push(FieldError::new(
            ClientField::Document,
            format!("must be at least {MIN_DOCUMENT_LEN} characters"),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Search the directory for `term`
///
/// # Errors
///
/// Returns [`BookingError::ClientSearch`] carrying the collaborator failure.
pub async fn search(
    directory: Arc<dyn ClientDirectory>,
    term: String,
) -> Result<Vec<Client>, BookingError> {
    BookingMetrics::record_client_search();
    directory.search_clients(term).await.map_err(|error| {
        tracing::warn!(error = %error, "Client search failed");
        BookingError::ClientSearch(error)
    })
}

/// Create a client in the directory
///
/// # Errors
///
/// Returns [`BookingError::ClientCreation`] carrying the collaborator failure.
pub async fn create(
    directory: Arc<dyn ClientDirectory>,
    fields: ClientFields,
) -> Result<Client, BookingError> {
    match directory.create_client(fields).await {
        Ok(client) => {
            BookingMetrics::record_client_created();
            tracing::info!(client_id = %client.id, "Client created");
            Ok(client)
        },
        Err(error) => {
            tracing::warn!(error = %error, "Client creation failed");
            Err(BookingError::ClientCreation(error))
        },
    }
}

/// Search mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSearch {
    /// Current term
    pub term: String,
    /// Candidates for `term`
    pub results: Vec<Client>,
    /// A query for `term` is in flight
    pub searching: bool,
}

/// Form mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    /// Identifier of the client being edited, `None` for a new client
    pub bound: Option<ClientId>,
    /// Field values
    pub fields: ClientFields,
    /// Errors of the last submission
    pub errors: Vec<FieldError>,
    /// A create call is in flight
    pub creating: bool,
}

/// Resolver mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMode {
    /// Looking up existing clients
    Search(ClientSearch),
    /// Editing a picked client or filling in a new one
    Form(ClientForm),
}

impl ClientMode {
    /// Candidates shown in search mode
    #[must_use]
    pub fn candidates(&self) -> &[Client] {
        match self {
            Self::Search(search) => &search.results,
            Self::Form(_) => &[],
        }
    }
}

impl Default for ClientMode {
    fn default() -> Self {
        Self::Search(ClientSearch::default())
    }
}

/// What submitting the form requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Fields are invalid; nothing to call
    Invalid(Vec<FieldError>),
    /// A bound client: reuse its identifier as is
    Reuse(Client),
    /// A new client: create it
    Create(ClientFields),
    /// Not in form mode, or a creation is already in flight
    Ignored,
}

/// Client resolution state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientResolver {
    mode: ClientMode,
    generation: u64,
    resolved: Option<Client>,
}

impl ClientResolver {
    /// Fresh resolver in search mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> &ClientMode {
        &self.mode
    }

    /// Client bound for the reservation
    #[must_use]
    pub const fn resolved(&self) -> Option<&Client> {
        self.resolved.as_ref()
    }

    /// Update the search term
    ///
    /// Switches to search mode. Every keystroke starts a new generation, which
    /// makes any pending quiet-period timer obsolete. Returns the generation
    /// to schedule a search for, or `None` when the term is too short.
    pub fn set_term(&mut self, term: String, min_chars: usize) -> Option<u64> {
        self.generation += 1;
        let long_enough = term.trim().chars().count() >= min_chars;

        if !matches!(self.mode, ClientMode::Search(_)) {
            self.mode = ClientMode::default();
        }
        if let ClientMode::Search(search) = &mut self.mode {
            search.term = term;
            search.searching = false;
            if !long_enough {
                search.results.clear();
            }
        }

        long_enough.then_some(self.generation)
    }

    /// Quiet period for `generation` elapsed
    ///
    /// Returns the term to search for if nothing was typed since and the
    /// resolver is still in search mode.
    pub fn search_due(&mut self, generation: u64, min_chars: usize) -> Option<String> {
        if generation != self.generation {
            return None;
        }
        let ClientMode::Search(search) = &mut self.mode else {
            return None;
        };
        if search.term.trim().chars().count() < min_chars {
            return None;
        }
        search.searching = true;
        Some(search.term.trim().to_string())
    }

    /// Deliver search results for `term`
    ///
    /// Returns `false` if the term changed since the query was sent.
    pub fn deliver_results(&mut self, term: &str, results: Vec<Client>) -> bool {
        match &mut self.mode {
            ClientMode::Search(search) if search.term.trim() == term => {
                search.results = results;
                search.searching = false;
                true
            },
            _ => false,
        }
    }

    /// Deliver a search failure for `term`
    ///
    /// Returns `false` if the term changed since the query was sent.
    pub fn search_failed(&mut self, term: &str) -> bool {
        match &mut self.mode {
            ClientMode::Search(search) if search.term.trim() == term => {
                search.results.clear();
                search.searching = false;
                true
            },
            _ => false,
        }
    }

    /// Pick a candidate: the form opens bound to its identifier
    pub fn select(&mut self, candidate: Client) {
        self.generation += 1;
        self.mode = ClientMode::Form(ClientForm {
            bound: Some(candidate.id),
            fields: candidate.fields,
            ..ClientForm::default()
        });
    }

    /// Open an empty form for a new client
    pub fn start_new(&mut self) {
        self.generation += 1;
        self.mode = ClientMode::Form(ClientForm::default());
    }

    /// Replace the form fields; returns `false` outside form mode
    pub fn edit(&mut self, fields: ClientFields) -> bool {
        match &mut self.mode {
            ClientMode::Form(form) if !form.creating => {
                form.fields = fields;
                true
            },
            _ => false,
        }
    }

    /// Submit the form
    pub fn submit(&mut self) -> Submission {
        let ClientMode::Form(form) = &mut self.mode else {
            return Submission::Ignored;
        };
        if form.creating {
            return Submission::Ignored;
        }

        if let Err(errors) = validate_fields(&form.fields) {
            form.errors.clone_from(&errors);
            return Submission::Invalid(errors);
        }
        form.errors.clear();

        match form.bound {
            Some(id) => {
                let client = Client {
                    id,
                    fields: form.fields.clone(),
                };
                self.resolved = Some(client.clone());
                Submission::Reuse(client)
            },
            None => {
                form.creating = true;
                Submission::Create(form.fields.clone())
            },
        }
    }

    /// The directory created the client
    ///
    /// Returns `false` if no creation was in flight.
    pub fn created(&mut self, client: Client) -> bool {
        match &mut self.mode {
            ClientMode::Form(form) if form.creating => {
                form.creating = false;
                form.bound = Some(client.id);
                form.fields = client.fields.clone();
                self.resolved = Some(client);
                true
            },
            _ => false,
        }
    }

    /// The directory refused the client; the form stays open for correction
    ///
    /// Returns `false` if no creation was in flight.
    pub fn creation_failed(&mut self) -> bool {
        match &mut self.mode {
            ClientMode::Form(form) if form.creating => {
                form.creating = false;
                true
            },
            _ => false,
        }
    }
}
