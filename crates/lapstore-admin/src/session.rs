//! One create or edit of a product, from first keystroke to saved record.
//!
//! ```text
//! Idle -> Validating -> UploadingImages -> Submitting -> Success
//!            |               |                 |
//!            +---------------+-----------------+--> Failed -> Idle
//! ```
//!
//! Cancellation is allowed in any state and is final.

use std::sync::{Arc, Mutex, PoisonError};

use lapstore_core::{
    CatalogError, FormAction, GalleryLimits, ImageFile, Product, ProductForm, UploadError,
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Validating,
    UploadingImages { done: usize, total: usize },
    Submitting,
    Success(Box<Product>),
    /// Holds the message shown to the seller. The form is kept as it was.
    Failed(String),
    Cancelled,
}

impl SessionState {
    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Validating
                | SessionState::UploadingImages { .. }
                | SessionState::Submitting
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit(Uuid),
}

/// Cancels the session it was taken from. Can be moved to another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug)]
pub struct EditSession {
    mode: EditMode,
    form: ProductForm,
    state: watch::Sender<SessionState>,
    cancel: Arc<watch::Sender<bool>>,
}

impl EditSession {
    #[must_use]
    pub fn create(limits: GalleryLimits) -> Self {
        Self::with_form(EditMode::Create, ProductForm::new(limits))
    }

    #[must_use]
    pub fn edit(product: &Product, limits: GalleryLimits) -> Self {
        Self::with_form(
            EditMode::Edit(product.id),
            ProductForm::from_product(product, limits),
        )
    }

    fn with_form(mode: EditMode, form: ProductForm) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (cancel, _) = watch::channel(false);
        Self {
            mode,
            form,
            state,
            cancel: Arc::new(cancel),
        }
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    #[must_use]
    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change, upload progress included.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel),
        }
    }

    pub fn cancel(&self) {
        self.cancel_handle().cancel();
        self.set_state(SessionState::Cancelled);
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Applies one edit to the form.
    ///
    /// Editing after a failed submission returns the session to `Idle`.
    /// Edits are ignored once the session has finished or been cancelled.
    pub fn dispatch(&mut self, action: FormAction) {
        if self.is_cancelled() {
            self.set_state(SessionState::Cancelled);
        }
        match self.state() {
            SessionState::Success(_) | SessionState::Cancelled => {
                tracing::debug!("edit ignored, session is closed");
                return;
            }
            SessionState::Failed(_) => self.set_state(SessionState::Idle),
            _ => {}
        }
        let form = std::mem::take(&mut self.form);
        self.form = form.apply(action);
    }

    /// Validates the form, uploads pending images and saves the product.
    ///
    /// Nothing is persisted unless every image uploaded. On failure the
    /// session moves to `Failed` with the form untouched, and images uploaded
    /// during this attempt are released. Once the payload is handed to the
    /// store the save runs to completion even if cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] before any network call,
    /// [`CatalogError::Upload`] or [`CatalogError::Persistence`] on backend
    /// failure, [`CatalogError::NotFound`] when the edited product is gone,
    /// and [`CatalogError::Cancelled`] when the session was cancelled.
    pub async fn submit(&mut self, catalog: &Catalog) -> Result<Product, CatalogError> {
        match self.state() {
            SessionState::Success(product) => return Ok(*product),
            SessionState::Cancelled => return Err(CatalogError::Cancelled),
            _ => {}
        }
        if self.is_cancelled() {
            return Err(self.cancelled(catalog, &[]).await);
        }

        self.set_state(SessionState::Validating);
        if let Err(e) = self.form.validate() {
            return Err(self.fail(e.into()));
        }

        let pending: Vec<ImageFile> = self
            .form
            .gallery()
            .pending_files()
            .into_iter()
            .cloned()
            .collect();
        let uploaded = self.upload(catalog, &pending).await?;

        let Some(images) = self.form.gallery().resolve(&uploaded) else {
            catalog.release_images(&uploaded).await;
            return Err(self.fail(CatalogError::Upload(UploadError::Failed {
                file_name: String::new(),
                source: "uploaded image count does not match the gallery".into(),
            })));
        };
        let fields = match self.form.assemble(images) {
            Ok(fields) => fields,
            Err(e) => {
                catalog.release_images(&uploaded).await;
                return Err(self.fail(e.into()));
            }
        };

        if self.is_cancelled() {
            return Err(self.cancelled(catalog, &uploaded).await);
        }

        self.set_state(SessionState::Submitting);
        let saved = match self.mode {
            EditMode::Create => catalog.create_product(&fields).await,
            EditMode::Edit(id) => catalog.update_product(id, &fields).await,
        };

        match saved {
            Ok(product) => {
                // A URL stored twice may lose one copy and still be referenced.
                let mut removed: Vec<String> = Vec::new();
                for url in self.form.gallery().removed_stored() {
                    if !product.fields.images.images.contains(url) && !removed.contains(url) {
                        removed.push(url.clone());
                    }
                }
                if !removed.is_empty() {
                    let released = catalog.release_images(&removed).await;
                    tracing::debug!(
                        product_id = %product.id,
                        removed = removed.len(),
                        released,
                        "released images removed during edit"
                    );
                }
                self.set_state(SessionState::Success(Box::new(product.clone())));
                Ok(product)
            }
            Err(e) => {
                catalog.release_images(&uploaded).await;
                Err(self.fail(e))
            }
        }
    }

    /// Runs the upload phase, racing it against cancellation.
    async fn upload(
        &self,
        catalog: &Catalog,
        pending: &[ImageFile],
    ) -> Result<Vec<String>, CatalogError> {
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let total = pending.len();
        self.set_state(SessionState::UploadingImages { done: 0, total });

        let completed: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let state = &self.state;
        let on_uploaded = |url: &str| {
            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            done.push(url.to_owned());
            state.send_replace(SessionState::UploadingImages {
                done: done.len(),
                total,
            });
        };

        let cancel_rx = self.cancel.subscribe();
        let outcome = tokio::select! {
            biased;
            () = wait_for_cancel(cancel_rx) => None,
            result = catalog.upload_images(pending, &on_uploaded) => Some(result),
        };

        match outcome {
            Some(Ok(urls)) => Ok(urls),
            Some(Err(e)) => Err(self.fail(e.into())),
            None => {
                let done = completed
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner);
                Err(self.cancelled(catalog, &done).await)
            }
        }
    }

    async fn cancelled(&self, catalog: &Catalog, uploaded: &[String]) -> CatalogError {
        if !uploaded.is_empty() {
            let released = catalog.release_images(uploaded).await;
            tracing::info!(
                uploaded = uploaded.len(),
                released,
                "submission cancelled, released completed uploads"
            );
        }
        self.set_state(SessionState::Cancelled);
        CatalogError::Cancelled
    }

    fn fail(&self, err: CatalogError) -> CatalogError {
        let message = err.user_message();
        tracing::warn!(error = %err, mode = ?self.mode, "submission failed");
        self.set_state(SessionState::Failed(message));
        err
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
