// Domain core: account model, credentials, errors

pub mod credentials;
pub mod errors;
pub mod models;
