use thiserror::Error;

use crate::model::{AccountError, CatalogError, ProgressError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Account(#[from] AccountError),
}
